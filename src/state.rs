use std::{cmp::Ordering, collections::BTreeSet, fmt};

use crate::{alphabet::Alphabet, class::ByteSet};

/// Handle of a state inside its automaton.
///
/// Handles are assigned in allocation order and never reused, so they double
/// as the identity of the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a state reads from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateKind {
    /// Reads nothing.
    Epsilon,
    /// Reads exactly this symbol.
    Symbol(u8),
    /// Reads one symbol in `lo..=hi`.
    Range(u8, u8),
    /// Reads one symbol in the set.
    AnyOf(ByteSet),
    /// Reads one symbol not in the set.
    NoneOf(ByteSet),
    /// Reads any symbol.
    AnySymbol,
    /// Reads nothing; holds at the start of the input.
    StartOfInput,
    /// Reads nothing; holds at the end of the input.
    EndOfInput,
    /// Reads nothing; holds between a word and a non-word symbol, or before a
    /// word symbol at the start of the input.
    WordBoundary,
    /// Reads nothing; holds between two word symbols.
    NotWordBoundary,
}

impl StateKind {
    pub fn is_epsilon(&self) -> bool {
        matches!(self, StateKind::Epsilon)
    }

    /// Returns true if this kind reads nothing, whether or not it may fail.
    pub fn is_zero_width(&self) -> bool {
        matches!(
            self,
            StateKind::Epsilon
                | StateKind::StartOfInput
                | StateKind::EndOfInput
                | StateKind::WordBoundary
                | StateKind::NotWordBoundary
        )
    }

    /// Returns the number of symbols read from `input`, or `None` if this kind
    /// rejects it. `prev` is the symbol consumed just before `input`, `None`
    /// at the start. The terminal symbol is never read.
    pub fn matches(&self, input: &[u8], prev: Option<u8>) -> Option<usize> {
        let is_word = |symbol: Option<u8>| symbol.is_some_and(|c| ByteSet::word().contains(c));

        let zero_width = match self {
            StateKind::Epsilon => Some(true),
            StateKind::StartOfInput => Some(prev.is_none()),
            StateKind::EndOfInput => Some(u8::is_eof(input)),
            StateKind::WordBoundary => Some(is_word(u8::peek(input)) != is_word(prev)),
            StateKind::NotWordBoundary => Some(is_word(u8::peek(input)) && is_word(prev)),
            _ => None,
        };
        if let Some(holds) = zero_width {
            return holds.then_some(0);
        }

        let symbol = u8::peek(input)?;
        let accepted = match self {
            StateKind::Symbol(c) => symbol == *c,
            StateKind::Range(lo, hi) => (*lo..=*hi).contains(&symbol),
            StateKind::AnyOf(set) => set.contains(symbol),
            StateKind::NoneOf(set) => !set.contains(symbol),
            StateKind::AnySymbol => true,
            _ => unreachable!("zero-width kinds handled above"),
        };
        accepted.then_some(1)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKind::Epsilon => write!(f, "Epsilon"),
            StateKind::Symbol(c) => write!(f, "Symbol<{}>", c.escape_ascii()),
            StateKind::Range(lo, hi) => {
                write!(f, "Range<{}-{}>", lo.escape_ascii(), hi.escape_ascii())
            }
            StateKind::AnyOf(set) => write!(f, "AnyOf<{set}>"),
            StateKind::NoneOf(set) => write!(f, "NoneOf<{set}>"),
            StateKind::AnySymbol => write!(f, "Any"),
            StateKind::StartOfInput => write!(f, "Start"),
            StateKind::EndOfInput => write!(f, "End"),
            StateKind::WordBoundary => write!(f, "WordBoundary"),
            StateKind::NotWordBoundary => write!(f, "NotWordBoundary"),
        }
    }
}

/// A node of the automaton.
///
/// States are owned by an [`Automaton`](crate::Automaton) and compare by
/// identity only: two `Symbol(b'a')` states are distinct.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    kind: StateKind,
    pub(crate) next: BTreeSet<StateId>,
    pub(crate) prev: BTreeSet<StateId>,
}

impl State {
    pub(crate) fn new(id: StateId, kind: StateKind) -> Self {
        Self {
            id,
            kind,
            next: BTreeSet::new(),
            prev: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn kind(&self) -> &StateKind {
        &self.kind
    }

    pub fn is_epsilon(&self) -> bool {
        self.kind.is_epsilon()
    }

    /// See [`StateKind::matches`].
    pub fn matches(&self, input: &[u8], prev: Option<u8>) -> Option<usize> {
        self.kind.matches(input, prev)
    }

    /// States this state may transition into, ordered by identity.
    pub fn next(&self) -> impl DoubleEndedIterator<Item = StateId> + '_ {
        self.next.iter().copied()
    }

    /// States that may transition into this state, ordered by identity.
    pub fn prev(&self) -> impl DoubleEndedIterator<Item = StateId> + '_ {
        self.prev.iter().copied()
    }

    pub fn num_next(&self) -> usize {
        self.next.len()
    }

    pub fn num_prev(&self) -> usize {
        self.prev.len()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.id)
    }
}
