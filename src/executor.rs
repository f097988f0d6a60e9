use std::collections::VecDeque;

use log::trace;

use crate::{alphabet::Alphabet, automaton::Automaton, state::StateId};

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    /// The step limit was reached before a verdict.
    Exhausted,
}

/// Outcome of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Accepted,
    Rejected,
    /// There is more work to do.
    Pending,
}

/// Order in which pending paths are explored. The verdict does not depend on
/// it, only the number of steps taken to reach it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    /// Follow the most recently found path first.
    #[default]
    DepthFirst,
    /// Follow the oldest pending path first.
    BreadthFirst,
}

/// An in-flight path through the automaton.
#[derive(Debug, Clone, Copy)]
struct Visit<'a> {
    state: StateId,
    input: &'a [u8],
    consumed: usize,
    /// States entered since the last consumed symbol.
    idle: usize,
}

/// Simulates an automaton against an input, one work item at a time.
///
/// The work list is a stack by default, so paths are explored depth first;
/// see [`Traversal`]. Nothing is
/// memoized: the same state may be visited at the same position by different
/// paths. A path that enters more states than the automaton holds without
/// consuming a symbol went around an epsilon cycle and is dropped.
///
/// ```
/// use nfaregex::{compile, Executor, Step, Verdict};
///
/// let automaton = compile("(ab)+").unwrap();
/// let mut executor = Executor::new(&automaton, b"abab");
/// while executor.step() == Step::Pending {}
///
/// assert_eq!(Executor::new(&automaton, b"aba").run(), Verdict::Rejected);
/// ```
#[derive(Debug)]
pub struct Executor<'a> {
    automaton: &'a Automaton,
    input: &'a [u8],
    work: VecDeque<Visit<'a>>,
    traversal: Traversal,
    steps: usize,
    step_limit: Option<usize>,
}

impl<'a> Executor<'a> {
    pub fn new(automaton: &'a Automaton, input: &'a [u8]) -> Self {
        let mut executor = Self {
            automaton,
            input,
            work: VecDeque::new(),
            traversal: Traversal::default(),
            steps: 0,
            step_limit: None,
        };
        executor.reset();
        executor
    }

    /// Stop `run` with [`Verdict::Exhausted`] after `limit` steps.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Explore pending paths in the given order.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Restart from the start state.
    pub fn reset(&mut self) {
        self.steps = 0;
        self.work.clear();
        self.work.push_back(Visit {
            state: self.automaton.start(),
            input: self.input,
            consumed: 0,
            idle: 0,
        });
    }

    /// Restart from the start state with another input.
    pub fn reset_with(&mut self, input: &'a [u8]) {
        self.input = input;
        self.reset();
    }

    /// Number of steps taken since the last reset.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Pop one work item and expand it.
    pub fn step(&mut self) -> Step {
        let next = match self.traversal {
            Traversal::DepthFirst => self.work.pop_back(),
            Traversal::BreadthFirst => self.work.pop_front(),
        };
        let Some(visit) = next else {
            return Step::Rejected;
        };
        self.steps += 1;

        if visit.state == self.automaton.accept() && u8::is_eof(visit.input) {
            trace!("accepted after {} steps, {} symbols", self.steps, visit.consumed);
            return Step::Accepted;
        }

        let state = &self.automaton[visit.state];
        // The symbol consumed last, for assertions.
        let prev = visit
            .consumed
            .checked_sub(1)
            .and_then(|idx| self.input.get(idx))
            .copied();
        let Some(num_read) = state.matches(visit.input, prev) else {
            return Step::Pending;
        };

        let idle = if num_read == 0 { visit.idle + 1 } else { 0 };
        if idle > self.automaton.num_states() {
            return Step::Pending;
        }

        let input = u8::advance(visit.input, num_read);
        self.work.extend(state.next().map(|next| Visit {
            state: next,
            input,
            consumed: visit.consumed + num_read,
            idle,
        }));

        if self.work.is_empty() {
            Step::Rejected
        } else {
            Step::Pending
        }
    }

    /// Step until a verdict is reached or the step limit runs out.
    pub fn run(&mut self) -> Verdict {
        loop {
            if let Some(limit) = self.step_limit {
                if self.steps >= limit {
                    trace!("step limit {limit} reached");
                    return Verdict::Exhausted;
                }
            }

            match self.step() {
                Step::Accepted => return Verdict::Accepted,
                Step::Rejected => return Verdict::Rejected,
                Step::Pending => {}
            }
        }
    }
}
