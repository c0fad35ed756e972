//! Buddy allocator configuration

use crate::error::{MemoryError, MemoryResult};
use crate::utils::is_power_of_two;

/// Smallest block size handed out by default
pub const DEFAULT_MIN_BLOCK_SIZE: usize = 32;

/// Configuration for buddy allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuddyConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated blocks (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for released blocks (for debugging)
    pub dealloc_pattern: Option<u8>,

    /// Size of a level-0 block; must be a power of two
    pub min_block_size: usize,

    /// Merge a released block with its free buddy, repeatedly
    pub coalesce: bool,
}

impl Default for BuddyConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: None,
            dealloc_pattern: if cfg!(debug_assertions) { Some(0xDD) } else { None },
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            coalesce: false,
        }
    }
}

impl BuddyConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            coalesce: false,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xBD),
            dealloc_pattern: Some(0xDD),
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            coalesce: false,
        }
    }

    /// Performance configuration - minimal overhead
    #[must_use]
    pub fn performance() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            min_block_size: DEFAULT_MIN_BLOCK_SIZE,
            coalesce: false,
        }
    }

    /// Override the level-0 block size
    #[must_use]
    pub fn with_min_block_size(mut self, min_block_size: usize) -> Self {
        self.min_block_size = min_block_size;
        self
    }

    /// Enable buddy merging on release
    #[must_use]
    pub fn with_coalescing(mut self) -> Self {
        self.coalesce = true;
        self
    }

    pub(crate) fn validate(&self) -> MemoryResult<()> {
        if is_power_of_two(self.min_block_size) {
            Ok(())
        } else {
            Err(MemoryError::invalid_config(format!(
                "buddy min_block_size {} is not a power of two",
                self.min_block_size
            )))
        }
    }
}
