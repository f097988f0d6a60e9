/// Describes the symbols an automaton reads.
///
/// An input is a slice of symbols. The end of input is either the end of the
/// slice or the first occurrence of [`Alphabet::TERMINAL`], whichever comes
/// first.
pub trait Alphabet: Copy + Eq + Ord {
    /// Terminal symbol. It is never consumed by any state.
    const TERMINAL: Self;

    /// Returns true if no symbol is left to read.
    fn is_eof(input: &[Self]) -> bool {
        match input.first() {
            Some(symbol) => *symbol == Self::TERMINAL,
            None => true,
        }
    }

    /// Returns the next symbol, or `None` at the end of input.
    fn peek(input: &[Self]) -> Option<Self> {
        if Self::is_eof(input) {
            None
        } else {
            input.first().copied()
        }
    }

    /// Advance the input by `n` symbols.
    fn advance(input: &[Self], n: usize) -> &[Self] {
        input.get(n..).unwrap_or_default()
    }
}

/// Single byte alphabet with `\0` as terminal symbol.
impl Alphabet for u8 {
    const TERMINAL: Self = b'\0';
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn eof() {
        assert!(u8::is_eof(b""));
        assert!(u8::is_eof(b"\0abc"));
        assert!(!u8::is_eof(b"a"));

        assert_eq!(u8::peek(b"ab"), Some(b'a'));
        assert_eq!(u8::peek(b"\0b"), None);
        assert_eq!(u8::peek(b""), None);
    }

    #[test]
    fn advance() {
        assert_eq!(u8::advance(b"abc", 0), b"abc");
        assert_eq!(u8::advance(b"abc", 1), b"bc");
        assert_eq!(u8::advance(b"abc", 3), b"");
        // Advancing past the end leaves an empty input.
        assert_eq!(u8::advance(b"abc", 4), b"");
    }
}
