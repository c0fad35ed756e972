//! General-purpose free-list allocator
//!
//! First-fit search over a chain of free blocks, splitting a block when the
//! remainder is worth keeping. Released blocks go back to the head of the
//! chain; neighbours are only merged when coalescing is enabled.
//!
//! ## Modules
//! - `allocator` - Main `FreeListAllocator` implementation
//! - `config` - Configuration variants (production, debug, performance)

pub mod allocator;
pub mod config;

pub use allocator::{FreeBlock, FreeListAllocator, HEADER_SIZE};
pub use config::FreeListConfig;
