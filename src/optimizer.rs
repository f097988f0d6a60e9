use log::{debug, trace};

use crate::{automaton::Automaton, state::StateId};

/// Removes epsilon states that carry no branching information.
///
/// An epsilon state with a single predecessor is spliced into it: the
/// predecessor is linked to each successor directly. Otherwise, an epsilon
/// state with a single successor is spliced into that successor. States
/// with several edges on both sides are branch and merge points and stay.
/// Epsilon self-loops read nothing and lead nowhere new, so they are dropped,
/// as are epsilon states nothing reaches or that reach nothing.
///
/// Every splice preserves the set of accepted inputs.
#[derive(Debug)]
pub struct AutomatonOptimizer<'a> {
    automaton: &'a mut Automaton,
}

impl<'a> AutomatonOptimizer<'a> {
    pub fn new(automaton: &'a mut Automaton) -> Self {
        Self { automaton }
    }

    /// Run the pass. Neighbours of a removed state are checked again, so
    /// chains of epsilon states collapse completely. Returns the number of
    /// removed states.
    pub fn remove_epsilons(&mut self) -> usize {
        let before = self.automaton.num_states();

        // Popped from the back, so reverse to visit in allocation order.
        let mut pending: Vec<StateId> = self.automaton.states().map(|s| s.id()).collect();
        pending.reverse();

        while let Some(id) = pending.pop() {
            if let Some(neighbours) = self.remove_epsilon(id) {
                pending.extend(neighbours);
            }
        }

        let removed = before - self.automaton.num_states();
        debug!(
            "removed {removed} of {before} states, {} left",
            self.automaton.num_states()
        );
        removed
    }

    /// Try to remove one epsilon state. Returns the states whose edges
    /// changed if it was removed.
    fn remove_epsilon(&mut self, id: StateId) -> Option<Vec<StateId>> {
        if id == self.automaton.start() || id == self.automaton.accept() {
            return None;
        }
        let state = self.automaton.get(id)?;
        if !state.is_epsilon() {
            return None;
        }

        let self_loop = state.next.contains(&id);
        if self_loop {
            self.automaton.unlink(id, id);
        }

        let state = &self.automaton[id];
        let prev: Vec<StateId> = state.prev().collect();
        let next: Vec<StateId> = state.next().collect();

        if prev.is_empty() || next.is_empty() {
            trace!("dropping dead epsilon {id}");
        } else if let [pred] = prev[..] {
            trace!("splicing epsilon {id} into predecessor {pred}");
            for &succ in &next {
                self.automaton.add_next(pred, succ);
            }
        } else if let [succ] = next[..] {
            trace!("splicing epsilon {id} into successor {succ}");
            for &pred in &prev {
                self.automaton.add_next(pred, succ);
            }
        } else {
            // Dropping the self-loop may not be enough to remove the state,
            // but it changed nothing else.
            return None;
        }

        self.automaton.remove_state(id);
        Some(prev.into_iter().chain(next).collect())
    }
}
