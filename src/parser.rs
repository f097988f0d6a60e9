use crate::{class::ByteSet, error::CompileError, state::StateKind};

/// A syntactic unit of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A single state: literal, `.`, escape, character class or assertion.
    Atom(StateKind),
    /// `(`
    Open,
    /// `)`
    Close,
    /// `|`
    Bar,
    /// `+`
    Plus,
    /// `*`
    Star,
    /// `?`
    Question,
    /// `{min}`, `{min,}` or `{min,max}`
    Repeat { min: u32, max: Option<u32> },
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub at: usize,
}

/// Scan a pattern into tokens.
///
/// Parentheses must balance. Counts in `{n,m}` must not exceed `repeat_limit`.
pub fn parse(pattern: &str, repeat_limit: u32) -> Result<Vec<Spanned>, CompileError> {
    let pattern = pattern.as_bytes();
    let mut tokens = Vec::new();
    // Offsets of unclosed `(`.
    let mut stack = Vec::new();
    let mut idx = 0;

    while let Some(&c) = pattern.get(idx) {
        let at = idx;
        idx += 1;

        let token = match c {
            b'(' => {
                stack.push(at);
                Token::Open
            }
            b')' => {
                if stack.pop().is_none() {
                    return Err(CompileError::UnbalancedGroup { at: Some(at) });
                }
                Token::Close
            }
            b'|' => Token::Bar,
            b'+' => Token::Plus,
            b'*' => Token::Star,
            b'?' => Token::Question,
            b'.' => Token::Atom(StateKind::AnySymbol),
            b'^' => Token::Atom(StateKind::StartOfInput),
            b'$' => Token::Atom(StateKind::EndOfInput),
            b'\\' => {
                let Some(&escaped) = pattern.get(idx) else {
                    return Err(CompileError::TrailingEscape { at: Some(at) });
                };
                idx += 1;
                Token::Atom(escape(escaped))
            }
            b'[' => {
                let (kind, len) =
                    class(&pattern[idx..]).ok_or(CompileError::MalformedClass { at: Some(at) })?;
                idx += len;
                Token::Atom(kind)
            }
            b'{' => {
                let (min, max, len) = repeat(&pattern[idx..])
                    .filter(|(min, max, _)| match max {
                        Some(max) => min <= max && *max <= repeat_limit,
                        None => *min <= repeat_limit,
                    })
                    .ok_or(CompileError::MalformedQuantifier { at: Some(at) })?;
                idx += len;
                Token::Repeat { min, max }
            }
            _ => Token::Atom(StateKind::Symbol(c)),
        };
        tokens.push(Spanned { token, at });
    }

    // Check if there are unclosed parentheses.
    if let Some(at) = stack.pop() {
        return Err(CompileError::UnbalancedGroup { at: Some(at) });
    }

    Ok(tokens)
}

/// Escapes that stand for a set of symbols, e.g. `\d`.
fn escape_set(c: u8) -> Option<StateKind> {
    let kind = match c {
        b'd' => StateKind::AnyOf(ByteSet::digit()),
        b'D' => StateKind::NoneOf(ByteSet::digit()),
        b'w' => StateKind::AnyOf(ByteSet::word()),
        b'W' => StateKind::NoneOf(ByteSet::word()),
        b's' => StateKind::AnyOf(ByteSet::space()),
        b'S' => StateKind::NoneOf(ByteSet::space()),
        _ => return None,
    };
    Some(kind)
}

/// Escapes that stand for a single symbol, e.g. `\n` or `\.`.
fn escape_symbol(c: u8) -> u8 {
    match c {
        b't' => b'\t',
        b'n' => b'\n',
        b'r' => b'\r',
        b'f' => 0x0c,
        b'v' => 0x0b,
        _ => c,
    }
}

fn escape(c: u8) -> StateKind {
    match c {
        b'b' => StateKind::WordBoundary,
        b'B' => StateKind::NotWordBoundary,
        _ => escape_set(c).unwrap_or(StateKind::Symbol(escape_symbol(c))),
    }
}

/// Parse a character class following `[`. Returns the state kind and the
/// number of bytes read, including the closing `]`.
fn class(pattern: &[u8]) -> Option<(StateKind, usize)> {
    let mut idx = 0;
    let negated = pattern.first() == Some(&b'^');
    if negated {
        idx += 1;
    }

    let mut set = ByteSet::new();
    let mut empty = true;

    loop {
        let c = *pattern.get(idx)?;
        idx += 1;

        let lo = match c {
            b']' => break,
            b'\\' => {
                let escaped = *pattern.get(idx)?;
                idx += 1;
                match escape_set(escaped) {
                    Some(StateKind::AnyOf(other)) => {
                        set.union(&other);
                        empty = false;
                        continue;
                    }
                    Some(StateKind::NoneOf(other)) => {
                        // The terminal symbol stays out of the complement.
                        set.extend((1..=u8::MAX).filter(|byte| !other.contains(*byte)));
                        empty = false;
                        continue;
                    }
                    _ => escape_symbol(escaped),
                }
            }
            _ => c,
        };

        // A `-` that is not followed by `]` makes a range.
        let hi = match (pattern.get(idx), pattern.get(idx + 1)) {
            (Some(b'-'), Some(&hi)) if hi != b']' => {
                idx += 2;
                if hi == b'\\' {
                    let escaped = *pattern.get(idx)?;
                    idx += 1;
                    if escape_set(escaped).is_some() {
                        return None;
                    }
                    escape_symbol(escaped)
                } else {
                    hi
                }
            }
            _ => lo,
        };

        if lo > hi {
            return None;
        }
        set.insert_range(lo, hi);
        empty = false;
    }

    let kind = if empty {
        // `[^]` reads any symbol, `[]` nothing at all.
        if !negated {
            return None;
        }
        StateKind::AnySymbol
    } else if negated {
        StateKind::NoneOf(set)
    } else if set.len() == 1 {
        let (lo, _) = set.as_range()?;
        StateKind::Symbol(lo)
    } else if let Some((lo, hi)) = set.as_range() {
        StateKind::Range(lo, hi)
    } else {
        StateKind::AnyOf(set)
    };
    Some((kind, idx))
}

/// Parse a bounded repetition following `{`. Returns `(min, max, len)`,
/// where `len` includes the closing `}`.
fn repeat(pattern: &[u8]) -> Option<(u32, Option<u32>, usize)> {
    let (min, mut idx) = number(pattern)?;

    let max = match pattern.get(idx)? {
        b'}' => Some(min),
        b',' => {
            idx += 1;
            if pattern.get(idx)? == &b'}' {
                None
            } else {
                let (max, len) = number(&pattern[idx..])?;
                idx += len;
                if pattern.get(idx)? != &b'}' {
                    return None;
                }
                Some(max)
            }
        }
        _ => return None,
    };
    Some((min, max, idx + 1))
}

/// Parse a decimal number. Returns the value and the number of digits.
fn number(pattern: &[u8]) -> Option<(u32, usize)> {
    let len = pattern.iter().take_while(|c| c.is_ascii_digit()).count();
    if len == 0 {
        return None;
    }

    let mut value: u32 = 0;
    for c in &pattern[..len] {
        value = value.checked_mul(10)?.checked_add(u32::from(c - b'0'))?;
    }
    Some((value, len))
}
