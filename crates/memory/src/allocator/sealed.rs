//! Sealed trait pattern for internal allocator contracts
//!
//! [`Inspect`] is only implementable within `strata-memory`. External crates
//! can use it as a bound and call its methods, but cannot implement it.
//!
//! # Example
//!
//! ```rust
//! use strata_memory::allocator::sealed::Inspect;
//! use strata_memory::allocator::FreeListAllocator;
//!
//! fn report<A: Inspect>(alloc: &A) {
//!     assert!(alloc.validate().is_ok());
//!     println!("{}: {}", alloc.type_name(), alloc.fragmentation());
//! }
//!
//! let alloc = FreeListAllocator::new(1024).expect("region");
//! report(&alloc);
//! ```

use core::fmt;

use crate::error::MemoryResult;

// ============================================================================
// Sealing Mechanism
// ============================================================================

mod private {
    /// Private sealing trait
    pub trait Sealed {}

    impl Sealed for crate::allocator::arena::ArenaAllocator {}
    impl Sealed for crate::allocator::pool::PoolAllocator {}
    impl Sealed for crate::allocator::stack::StackAllocator {}
    impl Sealed for crate::allocator::free_list::FreeListAllocator {}
    impl Sealed for crate::allocator::buddy::BuddyAllocator {}

    // References to sealed types are also sealed
    impl<T: ?Sized + Sealed> Sealed for &T {}
    impl<T: ?Sized + Sealed> Sealed for &mut T {}
}

// ============================================================================
// Fragmentation Statistics
// ============================================================================

/// Fragmentation statistics for memory analysis
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentationStats {
    /// Total free memory across all fragments (bytes)
    pub total_free: usize,

    /// Size of the largest contiguous free block (bytes)
    pub largest_block: usize,

    /// Number of distinct free fragments
    pub fragment_count: usize,

    /// External fragmentation ratio (0-100)
    ///
    /// Calculated as: `100 * (1 - largest_block / total_free)`
    pub fragmentation_percent: u8,
}

impl FragmentationStats {
    /// Calculate fragmentation percentage from free space metrics
    pub fn calculate(total_free: usize, largest_block: usize, fragment_count: usize) -> Self {
        let fragmentation_percent = if total_free > 0 {
            let ratio = 1.0 - (largest_block as f64 / total_free as f64);
            (ratio * 100.0).clamp(0.0, 100.0) as u8
        } else {
            0
        };

        Self {
            total_free,
            largest_block,
            fragment_count,
            fragmentation_percent,
        }
    }

    /// Statistics for a single contiguous free range
    pub fn contiguous(free: usize) -> Self {
        Self::calculate(free, free, usize::from(free > 0))
    }

    /// Check if fragmentation is concerning (>50%)
    #[inline]
    pub fn is_fragmented(&self) -> bool {
        self.fragmentation_percent > 50
    }
}

impl fmt::Display for FragmentationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FragmentationStats {{ total_free: {} bytes, largest_block: {} bytes, \
             fragments: {}, fragmentation: {}% }}",
            self.total_free, self.largest_block, self.fragment_count, self.fragmentation_percent
        )
    }
}

// ============================================================================
// Sealed Inspection Trait
// ============================================================================

/// Internal allocator contract with checkable invariants
///
/// Sealed: implemented by the five allocators of this crate only.
pub trait Inspect: private::Sealed {
    /// Analyze the free space layout
    fn fragmentation(&self) -> FragmentationStats;

    /// Check the allocator's data-model invariant
    ///
    /// Returns [`MemoryError::Corruption`](crate::error::MemoryError::Corruption)
    /// naming the first violated invariant.
    fn validate(&self) -> MemoryResult<()>;

    /// Get allocator type name for debugging
    fn type_name(&self) -> &'static str {
        let full = core::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn fragmentation(&self) -> FragmentationStats {
        (**self).fragmentation()
    }

    fn validate(&self) -> MemoryResult<()> {
        (**self).validate()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<T: Inspect + ?Sized> Inspect for &mut T {
    fn fragmentation(&self) -> FragmentationStats {
        (**self).fragmentation()
    }

    fn validate(&self) -> MemoryResult<()> {
        (**self).validate()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

// ============================================================================
// Tests
// ============================================================================
