use crate::{
    automaton::Automaton,
    error::CompileError,
    state::{StateId, StateKind},
};

/// Default bound on the number of open groups, the top-level one included.
pub const DEFAULT_MAX_GROUP_DEPTH: usize = 127;

/// A pair of states bracketing a scope of the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Group {
    start: StateId,
    end: StateId,
}

/// Builds an automaton incrementally.
///
/// The builder keeps a cursor, the state new states are linked from, and a
/// stack of open groups. The top-level group spans `start..accept` and is
/// closed by [`finish`](Self::finish). Quantifiers apply to the last atom or
/// group that was completed.
///
/// ```txt
/// push_state(a)   cursor -> eps -> (a)
/// push_jump()     cursor -> eps -> (a)
///                           ^\_____/
/// push_skip()     cursor -> eps -> a -> (exit)
///                            \_________/^
/// ```
#[derive(Debug)]
pub struct AutomatonBuilder {
    automaton: Automaton,
    cursor: StateId,
    open: Vec<Group>,
    /// Last completed atom or group, the target of quantifiers.
    last: Option<Group>,
    max_depth: usize,
}

impl AutomatonBuilder {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_GROUP_DEPTH)
    }

    /// Create a builder that allows at most `max_depth` open groups.
    pub fn with_max_depth(max_depth: usize) -> Self {
        let automaton = Automaton::new();
        let top = Group {
            start: automaton.start(),
            end: automaton.accept(),
        };
        Self {
            cursor: top.start,
            open: vec![top],
            last: None,
            max_depth,
            automaton,
        }
    }

    /// Number of open groups, the top-level one included.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// The automaton built so far.
    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Link a new state after the cursor, preceded by an epsilon state that
    /// the pair's quantifiers can jump back to.
    pub fn push_state(&mut self, kind: StateKind) -> &mut Self {
        let epsilon = self.automaton.new_state(StateKind::Epsilon);
        let state = self.automaton.new_state(kind);

        let epsilon = self.automaton.add_next(self.cursor, epsilon);
        self.cursor = self.automaton.add_next(epsilon, state);
        self.last = Some(Group {
            start: epsilon,
            end: state,
        });
        self
    }

    /// Open a group, i.e. `(`.
    pub fn begin_group(&mut self) -> Result<&mut Self, CompileError> {
        if self.open.len() >= self.max_depth {
            return Err(CompileError::GroupNestingTooDeep {
                limit: self.max_depth,
            });
        }

        let start = self.automaton.new_state(StateKind::Epsilon);
        let end = self.automaton.new_state(StateKind::Epsilon);

        self.cursor = self.automaton.add_next(self.cursor, start);
        self.open.push(Group { start, end });
        self.last = None;
        Ok(self)
    }

    /// Close the innermost group, i.e. `)`.
    pub fn end_group(&mut self) -> Result<&mut Self, CompileError> {
        if self.open.len() <= 1 {
            return Err(CompileError::UnbalancedGroup { at: None });
        }
        let Some(group) = self.open.pop() else {
            unreachable!("the top-level group is never popped");
        };

        self.cursor = self.automaton.add_next(self.cursor, group.end);
        self.last = Some(group);
        Ok(self)
    }

    /// Terminate the current branch of the innermost group and start a new one
    /// from the group start, i.e. `|`.
    ///
    /// ```txt
    /// before: S->1->2->(3)  E
    /// after: (S)->1->2->3->E
    /// ```
    pub fn push_branch(&mut self) -> &mut Self {
        let group = self.innermost();
        self.automaton.add_next(self.cursor, group.end);
        self.cursor = group.start;
        self.last = None;
        self
    }

    /// Jump from the end of the last atom back to its start, i.e. `+`.
    pub fn push_jump(&mut self) -> Result<&mut Self, CompileError> {
        let group = self.quantified()?;
        self.automaton.add_next(group.end, group.start);
        Ok(self)
    }

    /// Add a path that bypasses the last atom, i.e. `?`.
    ///
    /// Both the cursor and the atom start are linked to a fresh epsilon state,
    /// which becomes the cursor. Together with [`push_jump`](Self::push_jump)
    /// this is `*`.
    pub fn push_skip(&mut self) -> Result<&mut Self, CompileError> {
        let group = self.quantified()?;
        let exit = self.automaton.new_state(StateKind::Epsilon);

        self.automaton.add_next(group.start, exit);
        self.cursor = self.automaton.add_next(self.cursor, exit);
        Ok(self)
    }

    /// Close the top-level group and return the automaton.
    pub fn finish(mut self) -> Result<Automaton, CompileError> {
        if self.open.len() != 1 {
            return Err(CompileError::UnbalancedGroup { at: None });
        }

        let accept = self.automaton.accept();
        self.automaton.add_next(self.cursor, accept);
        Ok(self.automaton)
    }

    fn innermost(&self) -> Group {
        match self.open.last() {
            Some(group) => *group,
            None => unreachable!("the top-level group is never popped"),
        }
    }

    fn quantified(&self) -> Result<Group, CompileError> {
        self.last
            .ok_or(CompileError::MalformedQuantifier { at: None })
    }
}

impl Default for AutomatonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn symbol(c: u8) -> StateKind {
        StateKind::Symbol(c)
    }

    #[test]
    fn concat() {
        let mut builder = AutomatonBuilder::new();
        builder.push_state(symbol(b'a')).push_state(symbol(b'b'));
        let automaton = builder.finish().unwrap();

        // start, accept and one epsilon per pushed state.
        assert_eq!(automaton.num_states(), 6);
        assert!(automaton.accepts("ab"));
        assert!(!automaton.accepts("a"));
        assert!(!automaton.accepts("abb"));
    }

    #[test]
    fn branch() {
        // ab|c|
        let mut builder = AutomatonBuilder::new();
        builder
            .push_state(symbol(b'a'))
            .push_state(symbol(b'b'))
            .push_branch()
            .push_state(symbol(b'c'))
            .push_branch();
        let automaton = builder.finish().unwrap();

        assert!(automaton.accepts("ab"));
        assert!(automaton.accepts("c"));
        assert!(automaton.accepts(""));
        assert!(!automaton.accepts("a"));
        assert!(!automaton.accepts("abc"));
    }

    #[test]
    fn group() {
        // x(a|bc)y
        let mut builder = AutomatonBuilder::new();
        builder.push_state(symbol(b'x'));
        builder
            .begin_group()
            .unwrap()
            .push_state(symbol(b'a'))
            .push_branch()
            .push_state(symbol(b'b'))
            .push_state(symbol(b'c'));
        builder.end_group().unwrap().push_state(symbol(b'y'));
        assert_eq!(builder.depth(), 1);
        let automaton = builder.finish().unwrap();

        assert!(automaton.accepts("xay"));
        assert!(automaton.accepts("xbcy"));
        assert!(!automaton.accepts("xy"));
        assert!(!automaton.accepts("xacy"));
    }

    #[test]
    fn jump() {
        // (ab)+c+
        let mut builder = AutomatonBuilder::new();
        builder
            .begin_group()
            .unwrap()
            .push_state(symbol(b'a'))
            .push_state(symbol(b'b'));
        builder.end_group().unwrap().push_jump().unwrap();
        builder.push_state(symbol(b'c')).push_jump().unwrap();
        let automaton = builder.finish().unwrap();

        assert!(automaton.accepts("abc"));
        assert!(automaton.accepts("ababccc"));
        assert!(!automaton.accepts("c"));
        assert!(!automaton.accepts("ab"));
        assert!(!automaton.accepts("abac"));
    }

    #[test]
    fn skip() {
        // a?b*
        let mut builder = AutomatonBuilder::new();
        builder.push_state(symbol(b'a')).push_skip().unwrap();
        builder
            .push_state(symbol(b'b'))
            .push_jump()
            .unwrap()
            .push_skip()
            .unwrap();
        let automaton = builder.finish().unwrap();

        for accepted in ["", "a", "b", "ab", "abbb", "bbb"] {
            assert!(automaton.accepts(accepted), "{accepted:?}");
        }
        for rejected in ["aa", "ba", "abab", "c"] {
            assert!(!automaton.accepts(rejected), "{rejected:?}");
        }
    }

    #[test]
    fn errors() {
        let mut builder = AutomatonBuilder::new();
        assert_eq!(
            builder.end_group().unwrap_err(),
            CompileError::UnbalancedGroup { at: None }
        );
        assert_eq!(
            builder.push_jump().unwrap_err(),
            CompileError::MalformedQuantifier { at: None }
        );

        builder.push_state(symbol(b'a')).push_branch();
        assert!(builder.push_skip().is_err());

        builder.begin_group().unwrap();
        assert!(builder.push_jump().is_err());
        assert_eq!(
            builder.finish().unwrap_err(),
            CompileError::UnbalancedGroup { at: None }
        );
    }

    #[test]
    fn nesting_limit() {
        let mut builder = AutomatonBuilder::with_max_depth(3);
        builder.begin_group().unwrap();
        builder.begin_group().unwrap();
        assert_eq!(
            builder.begin_group().unwrap_err(),
            CompileError::GroupNestingTooDeep { limit: 3 }
        );
        assert_eq!(builder.depth(), 3);

        builder.end_group().unwrap();
        builder.end_group().unwrap();
        assert!(builder.finish().is_ok());
    }
}
