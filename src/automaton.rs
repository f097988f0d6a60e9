use std::{collections::BTreeSet, fmt, ops::Index};

use crate::{
    executor::{Executor, Verdict},
    state::{State, StateId, StateKind},
};

/// A non-deterministic finite automaton.
///
/// The automaton owns every state it allocates. Two epsilon states, `start`
/// and `accept`, are created with it and live as long as it does. Other
/// states and transitions are added through
/// [`AutomatonBuilder`](crate::AutomatonBuilder), which never links a
/// transition into `start`. An input is accepted if some path from `start`
/// consumes all of it and ends on `accept`.
///
/// ```
/// use nfaregex::{Automaton, AutomatonBuilder, StateKind};
///
/// // (a|b)+
/// let mut builder = AutomatonBuilder::new();
/// builder
///     .begin_group()
///     .unwrap()
///     .push_state(StateKind::Symbol(b'a'))
///     .push_branch()
///     .push_state(StateKind::Symbol(b'b'));
/// builder.end_group().unwrap().push_jump().unwrap();
/// let automaton: Automaton = builder.finish().unwrap();
///
/// assert!(automaton.accepts("abbabba"));
/// assert!(!automaton.accepts("abbacba"));
/// ```
#[derive(Debug, Clone)]
pub struct Automaton {
    /// Arena of states, indexed by `StateId`. Removed states leave a `None`.
    states: Vec<Option<State>>,
    start: StateId,
    accept: StateId,
    num_live: usize,
}

impl Automaton {
    pub fn new() -> Self {
        let mut automaton = Self {
            states: Vec::new(),
            start: StateId(0),
            accept: StateId(0),
            num_live: 0,
        };
        automaton.start = automaton.new_state(StateKind::Epsilon);
        automaton.accept = automaton.new_state(StateKind::Epsilon);
        automaton
    }

    /// Allocate a new unlinked state.
    ///
    /// # Panics
    ///
    /// Panics if more than `u32::MAX` states are allocated.
    pub(crate) fn new_state(&mut self, kind: StateKind) -> StateId {
        let id = match u32::try_from(self.states.len()) {
            Ok(id) => StateId(id),
            Err(_) => panic!("automaton state limit exceeded"),
        };
        self.states.push(Some(State::new(id, kind)));
        self.num_live += 1;
        id
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn accept(&self) -> StateId {
        self.accept
    }

    /// Returns the state if it is still part of the automaton.
    pub fn get(&self, id: StateId) -> Option<&State> {
        self.states.get(id.index()).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: StateId) -> &mut State {
        match self.states.get_mut(id.index()).and_then(Option::as_mut) {
            Some(state) => state,
            None => panic!("state {id} is not part of the automaton"),
        }
    }

    /// Number of states currently in the automaton.
    pub fn num_states(&self) -> usize {
        self.num_live
    }

    /// Iterate live states in allocation order.
    pub fn states(&self) -> impl Iterator<Item = &State> + '_ {
        self.states.iter().flatten()
    }

    /// Link `from -> to`, registering `from` as a predecessor of `to`.
    /// Linking twice is a no-op. Returns `to`.
    pub(crate) fn add_next(&mut self, from: StateId, to: StateId) -> StateId {
        self.get_mut(from).next.insert(to);
        self.get_mut(to).prev.insert(from);
        to
    }

    /// Remove the transition `from -> to` if present.
    pub(crate) fn unlink(&mut self, from: StateId, to: StateId) {
        self.get_mut(from).next.remove(&to);
        self.get_mut(to).prev.remove(&from);
    }

    /// Unlink a state from all its neighbours and drop it from the arena.
    /// `start` and `accept` are never removed.
    pub(crate) fn remove_state(&mut self, id: StateId) {
        if id == self.start || id == self.accept {
            return;
        }

        let Some(state) = self.states.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        for next in state.next() {
            if next != id {
                self.get_mut(next).prev.remove(&id);
            }
        }
        for prev in state.prev() {
            if prev != id {
                self.get_mut(prev).next.remove(&id);
            }
        }
        self.num_live -= 1;
    }

    /// Returns true if the whole input is accepted.
    pub fn accepts(&self, input: &str) -> bool {
        self.accepts_bytes(input.as_bytes())
    }

    pub fn accepts_bytes(&self, input: &[u8]) -> bool {
        Executor::new(self, input).run() == Verdict::Accepted
    }
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<StateId> for Automaton {
    type Output = State;

    fn index(&self, id: StateId) -> &State {
        match self.get(id) {
            Some(state) => state,
            None => panic!("state {id} is not part of the automaton"),
        }
    }
}

/// Prints the graph depth first from the start state. Branches are drawn with
/// `|` and states reached more than once are printed once in full.
impl fmt::Display for Automaton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut visited = BTreeSet::new();
        let mut stack = vec![(self.start, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            for _ in 0..depth {
                write!(f, "| ")?;
            }

            let name = if id == self.start {
                "[Start]".to_string()
            } else if id == self.accept {
                "[Accept]".to_string()
            } else {
                self[id].to_string()
            };

            if visited.insert(id) {
                writeln!(f, "{name}")?;
                stack.extend(self[id].next().rev().map(|next| (next, depth + 1)));
            } else {
                writeln!(f, "{name} (repeated)")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new() {
        let automaton = Automaton::new();
        assert_eq!(automaton.num_states(), 2);
        assert_ne!(automaton.start(), automaton.accept());
        assert!(automaton[automaton.start()].is_epsilon());
        assert!(automaton[automaton.accept()].is_epsilon());

        // Nothing links start to accept yet.
        assert!(!automaton.accepts(""));
    }

    #[test]
    fn ids_are_monotonic() {
        let mut automaton = Automaton::new();
        let a = automaton.new_state(StateKind::Symbol(b'a'));
        let b = automaton.new_state(StateKind::Symbol(b'a'));
        assert!(automaton.accept() < a && a < b);
        assert_ne!(automaton[a], automaton[b]);
    }

    #[test]
    fn add_next() {
        let mut automaton = Automaton::new();
        let start = automaton.start();
        let a = automaton.new_state(StateKind::Symbol(b'a'));
        let accept = automaton.accept();

        let to = automaton.add_next(start, a);
        assert_eq!(to, a);
        automaton.add_next(a, accept);
        // Linking twice changes nothing.
        automaton.add_next(a, accept);

        assert_eq!(automaton[start].next().collect::<Vec<_>>(), vec![a]);
        assert_eq!(automaton[a].prev().collect::<Vec<_>>(), vec![start]);
        assert_eq!(automaton[accept].num_prev(), 1);

        assert!(automaton.accepts("a"));
        assert!(!automaton.accepts(""));
        assert!(!automaton.accepts("aa"));
        assert!(!automaton.accepts("b"));
    }

    #[test]
    fn remove_state() {
        let mut automaton = Automaton::new();
        let start = automaton.start();
        let accept = automaton.accept();
        let eps = automaton.new_state(StateKind::Epsilon);
        automaton.add_next(start, eps);
        automaton.add_next(eps, accept);
        assert!(automaton.accepts(""));

        automaton.remove_state(eps);
        assert_eq!(automaton.num_states(), 2);
        assert!(automaton.get(eps).is_none());
        assert_eq!(automaton[start].num_next(), 0);
        assert_eq!(automaton[accept].num_prev(), 0);
        assert!(!automaton.accepts(""));

        // Start and accept stay.
        automaton.remove_state(start);
        automaton.remove_state(accept);
        assert_eq!(automaton.num_states(), 2);
        assert_eq!(automaton.states().count(), 2);
    }

    #[test]
    fn display() {
        let mut automaton = Automaton::new();
        let start = automaton.start();
        let accept = automaton.accept();
        let a = automaton.new_state(StateKind::Symbol(b'a'));
        let b = automaton.new_state(StateKind::Symbol(b'b'));
        automaton.add_next(start, a);
        automaton.add_next(start, b);
        automaton.add_next(a, accept);
        automaton.add_next(b, accept);

        assert_eq!(
            automaton.to_string(),
            "[Start]\n\
             | Symbol<a>#2\n\
             | | [Accept]\n\
             | Symbol<b>#3\n\
             | | [Accept] (repeated)\n"
        );
    }
}
