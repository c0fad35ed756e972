//! Binary buddy allocator
//!
//! Power-of-two blocks with one free list per size class ("level"). Level
//! `k` holds blocks of `min_block_size << k`; larger blocks are split on
//! demand and, unless coalescing is enabled, never merged back.
//!
//! ## Modules
//! - `allocator` - Main `BuddyAllocator` implementation
//! - `config` - Configuration variants (production, debug, performance)

pub mod allocator;
pub mod config;

pub use allocator::BuddyAllocator;
pub use config::{BuddyConfig, DEFAULT_MIN_BLOCK_SIZE};
