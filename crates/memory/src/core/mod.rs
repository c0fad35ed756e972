//! Core functionality for strata-memory
//!
//! This module contains the building blocks shared by every allocator:
//! - The owned backing [`Region`] and its tagged [`Allocation`] handles
//! - Base traits for usage reporting, reset and statistics
//! - Common types and constants

pub mod region;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use crate::error::{MemoryError, MemoryResult};
pub use region::Region;
pub use traits::{BasicMemoryUsage, MemoryUsage, RegionAccess, Resettable, StatisticsProvider};
pub use types::*;

/// Core prelude for convenient imports
pub mod prelude {
    pub use super::region::Region;
    pub use super::traits::{MemoryUsage, RegionAccess, Resettable};
    pub use super::types::*;
    pub use crate::error::{MemoryError, MemoryResult};
}
