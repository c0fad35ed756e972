//! Region-backed allocators
//!
//! Five independent strategies, each owning one [`Region`](crate::core::Region):
//!
//! | Allocator | Release | Cost |
//! |-----------|---------|------|
//! | [`ArenaAllocator`] | bulk `reset` only | O(1) |
//! | [`PoolAllocator`] | any block | O(1) |
//! | [`StackAllocator`] | most recent first, or `restore` to a marker | O(1) |
//! | [`FreeListAllocator`] | any block | O(free blocks) |
//! | [`BuddyAllocator`] | any block, caller supplies the size | O(levels) |

mod stats;

pub mod sealed;

// Allocator implementations
pub mod arena;
pub mod buddy;
pub mod free_list;
pub mod pool;
pub mod stack;

// Re-exports for convenience
pub use arena::{ArenaAllocator, ArenaConfig};
pub use buddy::{BuddyAllocator, BuddyConfig};
pub use free_list::{FreeBlock, FreeListAllocator, FreeListConfig};
pub use pool::{PoolAllocator, PoolConfig};
pub use sealed::{FragmentationStats, Inspect};
pub use stack::{StackAllocator, StackConfig, StackFrame, StackMarker};
pub use stats::AllocatorStats;

pub use crate::core::traits::{
    BasicMemoryUsage, MemoryUsage, RegionAccess, Resettable, StatisticsProvider,
};
