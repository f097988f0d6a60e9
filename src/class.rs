use std::fmt;

/// A set of bytes, stored as a 256-bit map.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ByteSet([u64; 4]);

impl ByteSet {
    pub const fn new() -> Self {
        Self([0; 4])
    }

    /// `[0-9]`, i.e. `\d`.
    pub fn digit() -> Self {
        let mut set = Self::new();
        set.insert_range(b'0', b'9');
        set
    }

    /// `[a-zA-Z0-9_]`, i.e. `\w`.
    pub fn word() -> Self {
        let mut set = Self::digit();
        set.insert_range(b'a', b'z');
        set.insert_range(b'A', b'Z');
        set.insert(b'_');
        set
    }

    /// `[ \t\r\n\v\f]`, i.e. `\s`.
    pub fn space() -> Self {
        let mut set = Self::new();
        for b in [b' ', b'\t', b'\r', b'\n', 0x0b, 0x0c] {
            set.insert(b);
        }
        set
    }

    pub fn insert(&mut self, byte: u8) {
        self.0[usize::from(byte >> 6)] |= 1u64 << (byte & 63);
    }

    /// Insert every byte in `lo..=hi`.
    pub fn insert_range(&mut self, lo: u8, hi: u8) {
        for byte in lo..=hi {
            self.insert(byte);
        }
    }

    pub fn union(&mut self, other: &ByteSet) {
        for (lhs, rhs) in self.0.iter_mut().zip(other.0.iter()) {
            *lhs |= rhs;
        }
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.0[usize::from(byte >> 6)] & (1u64 << (byte & 63)) != 0
    }

    pub fn len(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(|byte| self.contains(*byte))
    }

    /// If the set is a single contiguous range, returns its bounds.
    pub fn as_range(&self) -> Option<(u8, u8)> {
        let lo = self.iter().next()?;
        let hi = self.iter().last()?;
        if usize::from(hi - lo) + 1 == self.len() {
            Some((lo, hi))
        } else {
            None
        }
    }
}

impl Extend<u8> for ByteSet {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for byte in iter {
            self.insert(byte);
        }
    }
}

impl FromIterator<u8> for ByteSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Prints the set in class syntax, collapsing runs into ranges.
impl fmt::Display for ByteSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut bytes = self.iter().peekable();
        while let Some(lo) = bytes.next() {
            let mut hi = lo;
            while bytes.peek() == Some(&hi.wrapping_add(1)) && hi != u8::MAX {
                hi += 1;
                bytes.next();
            }
            write!(f, "{}", lo.escape_ascii())?;
            if hi > lo {
                write!(f, "-{}", hi.escape_ascii())?;
            }
        }
        Ok(())
    }
}
