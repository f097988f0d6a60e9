use std::fmt;

use thiserror::Error;

/// Errors reported while compiling a pattern.
///
/// `at` is the byte offset in the pattern where the error was detected, when
/// known. Errors raised directly by [`AutomatonBuilder`](crate::AutomatonBuilder)
/// have no offset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("unbalanced group{}", offset(.at))]
    UnbalancedGroup { at: Option<usize> },
    #[error("malformed character class{}", offset(.at))]
    MalformedClass { at: Option<usize> },
    #[error("malformed quantifier{}", offset(.at))]
    MalformedQuantifier { at: Option<usize> },
    #[error("groups nested deeper than {limit}")]
    GroupNestingTooDeep { limit: usize },
    #[error("trailing escape{}", offset(.at))]
    TrailingEscape { at: Option<usize> },
    #[error("pattern needs more than {limit} states")]
    TooManyStates { limit: usize },
}

impl CompileError {
    /// Attach a pattern offset, unless one is already set.
    pub(crate) fn at(mut self, pos: usize) -> Self {
        match &mut self {
            CompileError::UnbalancedGroup { at }
            | CompileError::MalformedClass { at }
            | CompileError::MalformedQuantifier { at }
            | CompileError::TrailingEscape { at } => {
                at.get_or_insert(pos);
            }
            CompileError::GroupNestingTooDeep { .. } | CompileError::TooManyStates { .. } => {}
        }
        self
    }
}

struct Offset(Option<usize>);

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(at) => write!(f, " at offset {at}"),
            None => Ok(()),
        }
    }
}

fn offset(at: &Option<usize>) -> Offset {
    Offset(*at)
}
