//! Fixed-width selection bitset over the inspection registry.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign, Not};

/// A set of inspection flags. Each registered inspection owns exactly one bit.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InspectionMask(u64);

impl InspectionMask {
    /// Selects nothing.
    pub const NONE: Self = Self(0);

    /// Selects everything, including bits no inspection owns yet.
    pub const ALL: Self = Self(u64::MAX);

    /// Maximum number of distinct flags.
    pub const WIDTH: u32 = u64::BITS;

    /// The single-bit mask for `index`. Indices at or above [`Self::WIDTH`]
    /// yield an empty mask.
    pub const fn bit(index: u32) -> Self {
        match 1u64.checked_shl(index) {
            Some(bits) => Self(bits),
            None => Self::NONE,
        }
    }

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when exactly one bit is set.
    pub const fn is_single(self) -> bool {
        self.0.is_power_of_two()
    }

    /// True when every bit of `other` is set in `self`. Empty `other` never matches.
    pub const fn contains(self, other: Self) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitOr for InspectionMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOrAssign for InspectionMask {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl BitAnd for InspectionMask {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersection(rhs)
    }
}

impl Not for InspectionMask {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl fmt::Debug for InspectionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InspectionMask({:#018x})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_out_of_range_is_empty() {
        assert_eq!(InspectionMask::bit(63).bits(), 1 << 63);
        assert!(InspectionMask::bit(64).is_empty());
    }

    #[test]
    fn contains_requires_non_empty_operand() {
        let m = InspectionMask::bit(1) | InspectionMask::bit(3);
        assert!(m.contains(InspectionMask::bit(3)));
        assert!(!m.contains(InspectionMask::bit(2)));
        assert!(!m.contains(InspectionMask::NONE));
    }

    #[test]
    fn complement_of_none_is_all() {
        assert_eq!(!InspectionMask::NONE, InspectionMask::ALL);
        assert_eq!(
            InspectionMask::ALL.difference(InspectionMask::bit(0)),
            !InspectionMask::bit(0)
        );
    }

    #[test]
    fn single_bit_detection() {
        assert!(InspectionMask::bit(5).is_single());
        assert!(!(InspectionMask::bit(5) | InspectionMask::bit(6)).is_single());
        assert!(!InspectionMask::NONE.is_single());
    }
}
