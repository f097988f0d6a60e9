use crate::{
    automaton::Automaton,
    builder::AutomatonBuilder,
    error::CompileError,
    parser::{Spanned, Token},
};

/// Default bound on the number of states a pattern may compile to.
pub const DEFAULT_STATE_LIMIT: usize = 1 << 18;

/// Drives an [`AutomatonBuilder`] from a token sequence.
#[derive(Debug)]
pub struct Compiler {
    builder: AutomatonBuilder,
    state_limit: usize,
}

impl Compiler {
    pub fn new(max_group_depth: usize) -> Self {
        Self {
            builder: AutomatonBuilder::with_max_depth(max_group_depth),
            state_limit: DEFAULT_STATE_LIMIT,
        }
    }

    /// Fail with [`CompileError::TooManyStates`] once the automaton holds
    /// more than `limit` states. Nested repetitions multiply, e.g.
    /// `(a{1000}){1000}` needs two million states.
    pub fn with_state_limit(mut self, limit: usize) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn compile(mut self, tokens: &[Spanned]) -> Result<Automaton, CompileError> {
        self.sequence(tokens)?;
        let end = tokens.last().map_or(0, |spanned| spanned.at + 1);
        self.builder.finish().map_err(|e| e.at(end))
    }

    /// Emit a sequence of tokens, left to right.
    ///
    /// An atom followed by `{n,m}` is emitted as many times as the repetition
    /// requires, so the atom is located before it is emitted.
    fn sequence(&mut self, tokens: &[Spanned]) -> Result<(), CompileError> {
        let mut idx = 0;

        while let Some(Spanned { token, at }) = tokens.get(idx) {
            let at = *at;
            match token {
                Token::Atom(_) | Token::Open => {
                    let end = atom_end(tokens, idx)?;
                    let atom = &tokens[idx..end];

                    if let Some(Spanned {
                        token: Token::Repeat { min, max },
                        at,
                    }) = tokens.get(end)
                    {
                        let at = *at;
                        self.repeat(atom, *min, *max).map_err(|e| e.at(at))?;
                        idx = end + 1;
                    } else {
                        self.atom(atom)?;
                        idx = end;
                    }
                    continue;
                }
                Token::Close => return Err(CompileError::UnbalancedGroup { at: Some(at) }),
                Token::Bar => {
                    self.builder.push_branch();
                }
                Token::Plus => {
                    self.builder.push_jump().map_err(|e| e.at(at))?;
                }
                Token::Star => {
                    self.builder
                        .push_jump()
                        .and_then(|builder| builder.push_skip())
                        .map_err(|e| e.at(at))?;
                }
                Token::Question => {
                    self.builder.push_skip().map_err(|e| e.at(at))?;
                }
                Token::Repeat { .. } => {
                    // Nothing to repeat, e.g. `a+{2}` or `|{2}`.
                    return Err(CompileError::MalformedQuantifier { at: Some(at) });
                }
            }
            idx += 1;
        }

        Ok(())
    }

    /// Emit a single atom: one state, or a parenthesized group.
    fn atom(&mut self, atom: &[Spanned]) -> Result<(), CompileError> {
        // Checked per atom, before its states are allocated.
        if self.builder.automaton().num_states() > self.state_limit {
            return Err(CompileError::TooManyStates {
                limit: self.state_limit,
            });
        }

        match atom {
            [Spanned {
                token: Token::Atom(kind),
                ..
            }] => {
                self.builder.push_state(kind.clone());
            }
            [Spanned {
                token: Token::Open,
                at,
            }, inner @ .., Spanned {
                token: Token::Close,
                ..
            }] => {
                self.builder.begin_group().map_err(|e| e.at(*at))?;
                self.sequence(inner)?;
                self.builder.end_group().map_err(|e| e.at(*at))?;
            }
            _ => unreachable!("atom_end only returns single atoms or whole groups"),
        }
        Ok(())
    }

    /// Emit `atom{min,max}` inside a group of its own, so that a quantifier
    /// following the repetition applies to all of it.
    ///
    /// ```txt
    /// a{2,4}  (aa(a)?(a)?)
    /// a{2,}   (aa+)
    /// a{0,}   (a*)
    /// ```
    fn repeat(&mut self, atom: &[Spanned], min: u32, max: Option<u32>) -> Result<(), CompileError> {
        self.builder.begin_group()?;

        match max {
            Some(max) => {
                for _ in 0..min {
                    self.atom(atom)?;
                }
                for _ in min..max {
                    self.builder.begin_group()?;
                    self.atom(atom)?;
                    self.builder.end_group()?.push_skip()?;
                }
            }
            None => {
                for _ in 1..min {
                    self.atom(atom)?;
                }
                self.atom(atom)?;
                self.builder.push_jump()?;
                if min == 0 {
                    self.builder.push_skip()?;
                }
            }
        }

        self.builder.end_group()?;
        Ok(())
    }
}

/// Returns the index just past the atom starting at `idx`.
fn atom_end(tokens: &[Spanned], idx: usize) -> Result<usize, CompileError> {
    let Some(Spanned { token, at }) = tokens.get(idx) else {
        unreachable!("atom_end called past the end of the tokens");
    };
    if *token != Token::Open {
        return Ok(idx + 1);
    }

    let mut depth = 0usize;
    for (offset, spanned) in tokens[idx..].iter().enumerate() {
        match spanned.token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return Ok(idx + offset + 1);
                }
            }
            _ => {}
        }
    }
    Err(CompileError::UnbalancedGroup { at: Some(*at) })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::parse;

    fn compile(pattern: &str) -> Result<Automaton, CompileError> {
        Compiler::new(127).compile(&parse(pattern, 1000)?)
    }

    #[test]
    fn atom_end() {
        let tokens = parse("a(b(c))d", 1000).unwrap();
        assert_eq!(super::atom_end(&tokens, 0), Ok(1));
        assert_eq!(super::atom_end(&tokens, 1), Ok(7));
        assert_eq!(super::atom_end(&tokens, 3), Ok(6));
        assert_eq!(super::atom_end(&tokens, 7), Ok(8));
    }

    #[test]
    fn quantifiers() {
        let automaton = compile("ab*c?d+").unwrap();
        for accepted in ["ad", "abbbd", "acd", "abcddd"] {
            assert!(automaton.accepts(accepted), "{accepted:?}");
        }
        for rejected in ["a", "abc", "abdc", "acc", "bd"] {
            assert!(!automaton.accepts(rejected), "{rejected:?}");
        }
    }

    #[test]
    fn repeat_group() {
        let automaton = compile("(ab){2,3}c").unwrap();
        assert!(automaton.accepts("ababc"));
        assert!(automaton.accepts("abababc"));
        assert!(!automaton.accepts("abc"));
        assert!(!automaton.accepts("ababababc"));
    }

    #[test]
    fn repeat_unbounded() {
        let automaton = compile("x{0,}").unwrap();
        assert!(automaton.accepts(""));
        assert!(automaton.accepts("xxxx"));

        let automaton = compile("x{2,}").unwrap();
        assert!(!automaton.accepts("x"));
        assert!(automaton.accepts("xx"));
        assert!(automaton.accepts("xxxxx"));
    }

    #[test]
    fn repeat_zero() {
        let automaton = compile("ab{0}c").unwrap();
        assert!(automaton.accepts("ac"));
        assert!(!automaton.accepts("abc"));
    }

    #[test]
    fn nested_repeat() {
        let automaton = compile("(a{2}b){2}").unwrap();
        assert!(automaton.accepts("aabaab"));
        assert!(!automaton.accepts("aabab"));
    }

    #[test]
    fn errors() {
        assert_eq!(
            compile("+a").unwrap_err(),
            CompileError::MalformedQuantifier { at: Some(0) }
        );
        assert_eq!(
            compile("a|*").unwrap_err(),
            CompileError::MalformedQuantifier { at: Some(2) }
        );
        assert_eq!(
            compile("(?)").unwrap_err(),
            CompileError::MalformedQuantifier { at: Some(1) }
        );
        assert_eq!(
            compile("a+{2}").unwrap_err(),
            CompileError::MalformedQuantifier { at: Some(2) }
        );
        assert_eq!(
            compile("{2}").unwrap_err(),
            CompileError::MalformedQuantifier { at: Some(0) }
        );
    }

    #[test]
    fn nesting_limit() {
        let tokens = parse("((a))", 1000).unwrap();
        assert!(Compiler::new(3).compile(&tokens).is_ok());
        assert_eq!(
            Compiler::new(2).compile(&tokens).unwrap_err(),
            CompileError::GroupNestingTooDeep { limit: 2 }
        );

        // Each bounded repetition opens a group of its own.
        let tokens = parse("a{2}", 1000).unwrap();
        assert!(Compiler::new(2).compile(&tokens).is_ok());
        let tokens = parse("a{1,2}", 1000).unwrap();
        assert!(Compiler::new(2).compile(&tokens).is_err());
    }

    #[test]
    fn state_limit() {
        let tokens = parse("(a{1000}){1000}", 1000).unwrap();
        assert_eq!(
            Compiler::new(127).compile(&tokens).unwrap_err(),
            CompileError::TooManyStates {
                limit: DEFAULT_STATE_LIMIT
            }
        );

        let tokens = parse("a{10}", 1000).unwrap();
        assert!(Compiler::new(127).with_state_limit(30).compile(&tokens).is_ok());
        assert_eq!(
            Compiler::new(127).with_state_limit(10).compile(&tokens).unwrap_err(),
            CompileError::TooManyStates { limit: 10 }
        );
    }
}
