//! # strata-memory
//!
//! Five classic allocation strategies over a single owned backing region:
//!
//! - **Arena** - bump allocation with bulk reset
//! - **Pool** - fixed-size blocks with O(1) allocate and release
//! - **Stack** - LIFO release with markers and scoped frames
//! - **Free-list** - first-fit with block splitting
//! - **Buddy** - power-of-two blocks split on demand
//!
//! Every allocator acquires its region once at construction and hands out
//! [`Allocation`](crate::core::Allocation) handles: offsets into that region,
//! stamped with the region's id. Bytes are reached through
//! [`RegionAccess`](crate::core::RegionAccess), which rejects handles that do not
//! belong to the allocator. The crate contains no `unsafe` code.
//!
//! ## Quick Start
//!
//! ```rust
//! use strata_memory::prelude::*;
//!
//! fn main() -> MemoryResult<()> {
//!     let mut arena = ArenaAllocator::new(1024)?;
//!     let a = arena.allocate(100)?;
//!     let b = arena.allocate(50)?;
//!     assert_eq!(b.offset() - a.offset(), 104);
//!
//!     arena.bytes_mut(&a)?.copy_from_slice(&[7; 100]);
//!     arena.reset();
//!     assert_eq!(arena.allocate(10)?.offset(), a.offset());
//!
//!     let mut pool = PoolAllocator::new(16, 4)?;
//!     let block = pool.allocate()?;
//!     pool.release(&block)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured events through `tracing`
//!
//! ## Threading
//!
//! Allocators are single-threaded: every mutating operation takes
//! `&mut self`. They are `Send`, so one can be moved to another thread or
//! wrapped in a lock by the caller.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

// Error types
pub mod error;

// Core modules
pub mod allocator;
pub mod core;
pub mod utils;

// Re-export core types for convenience
pub use crate::allocator::{
    ArenaAllocator, BuddyAllocator, FreeListAllocator, PoolAllocator, StackAllocator,
};
pub use crate::core::{Allocation, Region, RegionId};
pub use crate::error::{MemoryError, MemoryResult, Result};

// Public API exports
pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    // Core types
    pub use crate::core::traits::{MemoryUsage, RegionAccess, Resettable, StatisticsProvider};
    pub use crate::core::{Allocation, Region, RegionId};

    // Error types
    pub use crate::error::{MemoryError, MemoryResult, Result};

    // Allocator types
    pub use crate::allocator::sealed::{FragmentationStats, Inspect};
    pub use crate::allocator::{
        AllocatorStats, ArenaAllocator, ArenaConfig, BuddyAllocator, BuddyConfig,
        FreeListAllocator, FreeListConfig, PoolAllocator, PoolConfig, StackAllocator, StackConfig,
        StackFrame, StackMarker,
    };

    // Utility traits for safe arithmetic
    pub use crate::utils::CheckedArithmetic;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    fn assert_send<T: Send>() {}

    #[test]
    fn allocators_are_send() {
        assert_send::<ArenaAllocator>();
        assert_send::<PoolAllocator>();
        assert_send::<StackAllocator>();
        assert_send::<FreeListAllocator>();
        assert_send::<BuddyAllocator>();
    }

    #[test]
    fn handles_do_not_cross_allocators() {
        let mut arena = ArenaAllocator::new(64).expect("Failed to create arena");
        let mut stack = StackAllocator::new(64).expect("Failed to create stack");
        let from_arena = arena.allocate(8).expect("allocation");

        assert!(!stack.owns(&from_arena));
        assert!(stack.bytes_mut(&from_arena).is_err());
        assert!(stack.release(&from_arena).is_err());
    }
}
