//! A small regular expression engine built on an explicit NFA.
//!
//! A pattern is scanned into tokens, the tokens drive an
//! [`AutomatonBuilder`] that splices states into an [`Automaton`], and an
//! [`AutomatonOptimizer`] removes the epsilon states that carry no branching
//! information. An [`Executor`] then walks the graph against an input.
//!
//! Matching is against the whole input:
//!
//! ```
//! use nfaregex::Regex;
//!
//! let re = Regex::new(r"https?://\w+(\.\w+)+").unwrap();
//! assert!(re.is_match("http://sneppy.ddns.net"));
//! assert!(!re.is_match("ftp://x"));
//! ```
//!
//! ## Syntax
//!
//! ```txt
//! c          the byte c
//! .          any byte but \0
//! ^ $        start and end of input
//! \b \B      word boundary, position inside a word
//! \d \w \s   digit, word and whitespace bytes; \D \W \S negate them
//! \c         the byte c, e.g. \. or \(; \t \n \r \f \v are control bytes
//! [set]      one byte of the set, with ranges such as a-z and escapes
//! [^set]     one byte outside the set; [^] is any byte
//! (re)       group
//! re|re      alternation
//! re+ re* re?            one or more, zero or more, zero or one
//! re{n} re{n,} re{n,m}   bounded repetition
//! ```

mod alphabet;
mod automaton;
mod builder;
mod class;
mod compiler;
mod error;
mod executor;
mod optimizer;
mod parser;
mod state;

use log::debug;

pub use crate::{
    alphabet::Alphabet,
    automaton::Automaton,
    builder::{AutomatonBuilder, DEFAULT_MAX_GROUP_DEPTH},
    class::ByteSet,
    compiler::DEFAULT_STATE_LIMIT,
    error::CompileError,
    executor::{Executor, Step, Traversal, Verdict},
    optimizer::AutomatonOptimizer,
    state::{State, StateId, StateKind},
};

use crate::compiler::Compiler;

/// Compile options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Most groups open at once, the implicit top-level group included.
    pub max_group_depth: usize,
    /// Remove redundant epsilon states after building.
    pub optimize: bool,
    /// Largest count allowed in `{n,m}`.
    pub repeat_limit: u32,
    /// Most states a pattern may compile to, before optimization.
    pub state_limit: usize,
    /// Executor steps allowed per match, unlimited if `None`.
    pub step_limit: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_group_depth: DEFAULT_MAX_GROUP_DEPTH,
            optimize: true,
            repeat_limit: 1000,
            state_limit: DEFAULT_STATE_LIMIT,
            step_limit: None,
        }
    }
}

/// Compile a pattern with the default options.
pub fn compile(pattern: &str) -> Result<Automaton, CompileError> {
    compile_with(pattern, &Config::default())
}

fn compile_with(pattern: &str, config: &Config) -> Result<Automaton, CompileError> {
    let tokens = parser::parse(pattern, config.repeat_limit)?;
    let mut automaton = Compiler::new(config.max_group_depth)
        .with_state_limit(config.state_limit)
        .compile(&tokens)?;
    debug!(
        "compiled {pattern:?} into {} states",
        automaton.num_states()
    );

    if config.optimize {
        AutomatonOptimizer::new(&mut automaton).remove_epsilons();
    }
    Ok(automaton)
}

/// Builds a [`Regex`] with non-default options.
///
/// ```
/// use nfaregex::{CompileError, RegexBuilder};
///
/// let err = RegexBuilder::new().max_group_depth(2).build("((a))").unwrap_err();
/// assert_eq!(err, CompileError::GroupNestingTooDeep { limit: 2 });
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegexBuilder {
    config: Config,
}

impl RegexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_group_depth(&mut self, depth: usize) -> &mut Self {
        self.config.max_group_depth = depth;
        self
    }

    pub fn optimize(&mut self, yes: bool) -> &mut Self {
        self.config.optimize = yes;
        self
    }

    pub fn repeat_limit(&mut self, limit: u32) -> &mut Self {
        self.config.repeat_limit = limit;
        self
    }

    pub fn state_limit(&mut self, limit: usize) -> &mut Self {
        self.config.state_limit = limit;
        self
    }

    pub fn step_limit(&mut self, limit: Option<usize>) -> &mut Self {
        self.config.step_limit = limit;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn build(&self, pattern: &str) -> Result<Regex, CompileError> {
        let automaton = compile_with(pattern, &self.config)?;
        Ok(Regex {
            pattern: pattern.to_string(),
            automaton,
            step_limit: self.config.step_limit,
        })
    }
}

/// A compiled pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: String,
    automaton: Automaton,
    step_limit: Option<usize>,
}

impl Regex {
    pub fn new(pattern: &str) -> Result<Self, CompileError> {
        RegexBuilder::new().build(pattern)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    /// Returns true if the pattern matches the entire text.
    ///
    /// If a step limit is configured and runs out, the text does not match.
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_bytes(text.as_bytes())
    }

    pub fn is_match_bytes(&self, text: &[u8]) -> bool {
        let mut executor = Executor::new(&self.automaton, text);
        if let Some(limit) = self.step_limit {
            executor = executor.with_step_limit(limit);
        }
        executor.run() == Verdict::Accepted
    }
}

/// Compile `pattern` and match it against the entire text.
pub fn is_match(pattern: &str, text: &str) -> Result<bool, CompileError> {
    Ok(Regex::new(pattern)?.is_match(text))
}
