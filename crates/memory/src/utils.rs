//! Utility functions and helpers for strata-memory
//!
//! This module provides the layout arithmetic shared by every allocator:
//! - Alignment helpers
//! - Power-of-two helpers for size classes
//! - Checked arithmetic operations

use crate::error::{MemoryError, MemoryResult};

/// Native word size in bytes; the default alignment of every allocator.
pub const WORD_SIZE: usize = size_of::<usize>();

/// Aligns a value up to the nearest multiple of alignment
///
/// `alignment` must be a power of two. Overflows wrap; use
/// [`checked_align_up`] when `value` comes from a caller.
///
/// # Examples
/// ```
/// use strata_memory::utils::align_up;
///
/// assert_eq!(align_up(7, 8), 8);
/// assert_eq!(align_up(8, 8), 8);
/// assert_eq!(align_up(9, 8), 16);
/// ```
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    value.wrapping_add(alignment - 1) & !(alignment - 1)
}

/// Aligns a value up, returning `None` on overflow
///
/// # Examples
/// ```
/// use strata_memory::utils::checked_align_up;
///
/// assert_eq!(checked_align_up(100, 8), Some(104));
/// assert_eq!(checked_align_up(usize::MAX, 8), None);
/// ```
#[inline]
pub const fn checked_align_up(value: usize, alignment: usize) -> Option<usize> {
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use strata_memory::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(is_aligned(32, 16));
/// assert!(!is_aligned(17, 8));
/// ```
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    value & (alignment - 1) == 0
}

/// Checks whether `value` is a non-zero power of two
#[inline]
pub const fn is_power_of_two(value: usize) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Rounds up to the next power of two
///
/// Returns `None` when the result does not fit in `usize`.
///
/// # Examples
/// ```
/// use strata_memory::utils::next_power_of_two;
///
/// assert_eq!(next_power_of_two(0), Some(1));
/// assert_eq!(next_power_of_two(7), Some(8));
/// assert_eq!(next_power_of_two(8), Some(8));
/// assert_eq!(next_power_of_two(usize::MAX), None);
/// ```
#[inline]
pub const fn next_power_of_two(value: usize) -> Option<usize> {
    value.checked_next_power_of_two()
}

/// Floor of the base-two logarithm; `log2_floor(0)` is 0
///
/// # Examples
/// ```
/// use strata_memory::utils::log2_floor;
///
/// assert_eq!(log2_floor(1), 0);
/// assert_eq!(log2_floor(32), 5);
/// assert_eq!(log2_floor(33), 5);
/// ```
#[inline]
pub const fn log2_floor(value: usize) -> u32 {
    if value == 0 {
        0
    } else {
        usize::BITS - 1 - value.leading_zeros()
    }
}

/// Validates an alignment argument
pub fn check_alignment(alignment: usize) -> MemoryResult<()> {
    if is_power_of_two(alignment) {
        Ok(())
    } else {
        Err(MemoryError::invalid_alignment(alignment))
    }
}

/// Checked arithmetic operations that return [`MemoryError::SizeOverflow`]
///
/// # Examples
/// ```
/// use strata_memory::utils::CheckedArithmetic;
///
/// let a: usize = 10;
/// let b: usize = 20;
///
/// assert_eq!(a.try_add(b).unwrap(), 30);
/// assert!(usize::MAX.try_add(1).is_err());
/// ```
pub trait CheckedArithmetic: Sized {
    /// Checked addition
    fn try_add(self, rhs: Self) -> MemoryResult<Self>;

    /// Checked subtraction
    fn try_sub(self, rhs: Self) -> MemoryResult<Self>;

    /// Checked multiplication
    fn try_mul(self, rhs: Self) -> MemoryResult<Self>;

    /// Checked alignment round-up
    fn try_align_up(self, alignment: usize) -> MemoryResult<Self>;
}

impl CheckedArithmetic for usize {
    #[inline]
    fn try_add(self, rhs: Self) -> MemoryResult<Self> {
        self.checked_add(rhs)
            .ok_or_else(|| MemoryError::size_overflow("add"))
    }

    #[inline]
    fn try_sub(self, rhs: Self) -> MemoryResult<Self> {
        self.checked_sub(rhs)
            .ok_or_else(|| MemoryError::size_overflow("sub"))
    }

    #[inline]
    fn try_mul(self, rhs: Self) -> MemoryResult<Self> {
        self.checked_mul(rhs)
            .ok_or_else(|| MemoryError::size_overflow("mul"))
    }

    #[inline]
    fn try_align_up(self, alignment: usize) -> MemoryResult<Self> {
        checked_align_up(self, alignment).ok_or_else(|| MemoryError::size_overflow("align_up"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(100, 8), 104);
        assert_eq!(align_up(13, 4), 16);
    }

    #[test]
    fn test_checked_align_up_overflow() {
        assert_eq!(checked_align_up(usize::MAX - 3, 8), None);
        assert_eq!(checked_align_up(usize::MAX - 7, 8), Some(usize::MAX - 7));
    }

    #[test]
    fn test_power_of_two() {
        assert!(is_power_of_two(1));
        assert!(is_power_of_two(1024));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(96));
        assert_eq!(next_power_of_two(40), Some(64));
        assert_eq!(next_power_of_two(1024), Some(1024));
    }

    #[test]
    fn test_log2_floor() {
        assert_eq!(log2_floor(0), 0);
        assert_eq!(log2_floor(2), 1);
        assert_eq!(log2_floor(1024 / 32), 5);
    }

    #[test]
    fn test_check_alignment() {
        assert!(check_alignment(16).is_ok());
        assert_eq!(
            check_alignment(12),
            Err(MemoryError::InvalidAlignment { alignment: 12 })
        );
        assert!(check_alignment(0).is_err());
    }

    #[test]
    fn test_checked_arithmetic() {
        assert_eq!(7usize.try_mul(8), Ok(56));
        assert!(usize::MAX.try_mul(2).is_err());
        assert!(0usize.try_sub(1).is_err());
        assert_eq!(100usize.try_align_up(WORD_SIZE), Ok(align_up(100, WORD_SIZE)));
    }
}
