use std::fmt;

use crate::SyntaxKind;

const SIZE: usize = SyntaxKind::ALL.len().div_ceil(64);

/// Compact, `const`-constructible set of [`SyntaxKind`]s.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SyntaxSet {
    bits: [u64; SIZE],
}

impl SyntaxSet {
    pub const EMPTY: Self = Self { bits: [0; SIZE] };
    const BITS_PER_SLOT: u16 = u64::BITS as u16;

    const fn from_kind(kind: SyntaxKind) -> Self {
        let kind = kind as u16;

        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        let mut bits = Self::EMPTY.bits;
        bits[slot_index] = mask;

        Self { bits }
    }

    pub const fn union(mut self, other: &Self) -> Self {
        let mut i = 0;

        while i < self.bits.len() {
            self.bits[i] |= other.bits[i];
            i += 1;
        }

        self
    }

    pub const fn new<const N: usize>(kinds: [SyntaxKind; N]) -> Self {
        let mut set = Self::EMPTY;

        let mut i = 0;
        while i < kinds.len() {
            set = set.union(&Self::from_kind(kinds[i]));
            i += 1;
        }

        set
    }

    pub const fn with(self, kind: SyntaxKind) -> Self {
        self.union(&Self::from_kind(kind))
    }

    pub fn insert(&mut self, kind: SyntaxKind) {
        *self = self.with(kind);
    }

    pub const fn contains(&self, kind: SyntaxKind) -> bool {
        let kind = kind as u16;
        let slot_index = (kind / Self::BITS_PER_SLOT) as usize;
        let bit_index = kind % Self::BITS_PER_SLOT;
        let mask = 1 << bit_index;

        self.bits[slot_index] & mask != 0
    }

    pub const fn is_empty(&self) -> bool {
        let mut i = 0;
        while i < self.bits.len() {
            if self.bits[i] != 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.bits.iter().map(|slot| slot.count_ones() as usize).sum()
    }

    /// Iterates the members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = SyntaxKind> + '_ {
        SyntaxKind::ALL.iter().copied().filter(|&kind| self.contains(kind))
    }
}

impl fmt::Debug for SyntaxSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Renders as `a, b or c`.
impl fmt::Display for SyntaxSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.len();
        for (index, kind) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(if index + 1 == len { " or " } else { ", " })?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

impl FromIterator<SyntaxKind> for SyntaxSet {
    fn from_iter<I: IntoIterator<Item = SyntaxKind>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_spans_every_slot() {
        let set = SyntaxSet::new([SyntaxKind::LEFT_PAREN, SyntaxKind::EOF, SyntaxKind::ERROR]);
        assert!(set.contains(SyntaxKind::LEFT_PAREN));
        assert!(set.contains(SyntaxKind::EOF));
        assert!(set.contains(SyntaxKind::ERROR));
        assert!(!set.contains(SyntaxKind::RIGHT_PAREN));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn display_lists_alternatives() {
        let set = SyntaxSet::new([SyntaxKind::SEMICOLON, SyntaxKind::COMMA, SyntaxKind::EQ]);
        assert_eq!(set.to_string(), "`;`, `,` or `=`");
        assert_eq!(SyntaxSet::new([SyntaxKind::NAME]).to_string(), "identifier");
        assert!(SyntaxSet::EMPTY.is_empty());
    }
}
