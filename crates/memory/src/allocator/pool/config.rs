//! Pool allocator configuration

/// Configuration for pool allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated blocks; `Some(0)` (the default)
    /// zeroes them
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte for released blocks (for debugging)
    pub dealloc_pattern: Option<u8>,

    /// Keep an occupancy map so releasing a free block is rejected
    pub detect_double_release: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: Some(0),
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
            detect_double_release: false,
        }
    }
}

impl PoolConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            detect_double_release: false,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xBB),
            dealloc_pattern: Some(0xDD),
            detect_double_release: true,
        }
    }

    /// Performance configuration - minimal overhead
    #[must_use]
    pub fn performance() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            detect_double_release: false,
        }
    }

    /// Hand out zero-filled blocks
    #[must_use]
    pub fn zeroed(mut self) -> Self {
        self.alloc_pattern = Some(0);
        self
    }
}
