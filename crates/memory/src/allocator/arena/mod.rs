//! Arena (bump) allocator
//!
//! Linear allocation by advancing an offset through one region. There is no
//! per-allocation release; [`ArenaAllocator::reset`] releases everything at
//! once.
//!
//! ## Modules
//! - `allocator` - Main `ArenaAllocator` implementation
//! - `config` - Configuration variants (production, debug, performance)

pub mod allocator;
pub mod config;

pub use allocator::ArenaAllocator;
pub use config::ArenaConfig;
