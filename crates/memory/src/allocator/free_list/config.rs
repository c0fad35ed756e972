//! Free-list allocator configuration

use super::allocator::HEADER_SIZE;

/// Configuration for free-list allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeListConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated payloads (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for released payloads (for debugging)
    pub dealloc_pattern: Option<u8>,

    /// A free block is split only when more than this many bytes would remain
    pub min_split_remainder: usize,

    /// Merge a released block with physically adjacent free blocks
    pub coalesce: bool,
}

impl Default for FreeListConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: if cfg!(debug_assertions) { Some(0xEE) } else { None },
            dealloc_pattern: if cfg!(debug_assertions) { Some(0xDD) } else { None },
            min_split_remainder: HEADER_SIZE + 16,
            coalesce: false,
        }
    }
}

impl FreeListConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            min_split_remainder: HEADER_SIZE + 16,
            coalesce: false,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xEE),
            dealloc_pattern: Some(0xDD),
            min_split_remainder: HEADER_SIZE + 16,
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
            min_split_remainder: HEADER_SIZE + 16,
            coalesce: false,
        }
    }

    /// Enable neighbour merging on release
    #[must_use]
    pub fn with_coalescing(mut self) -> Self {
        self.coalesce = true;
        self
    }
}
