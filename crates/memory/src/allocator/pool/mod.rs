//! Fixed-size block pool
//!
//! ## Modules
//! - `allocator` - Main `PoolAllocator` implementation with an index-based free chain
//! - `config` - Configuration variants (production, debug, performance)

pub mod allocator;
pub mod config;

pub use allocator::PoolAllocator;
pub use config::PoolConfig;
