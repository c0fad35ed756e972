//! Arena allocator configuration

use crate::error::MemoryResult;
use crate::utils::{WORD_SIZE, check_alignment};

/// Configuration for arena allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Enable statistics tracking
    pub track_stats: bool,

    /// Fill pattern byte for newly allocated memory (for debugging)
    pub alloc_pattern: Option<u8>,
    /// Fill pattern byte applied to the used prefix on reset (for debugging)
    pub dealloc_pattern: Option<u8>,

    /// Alignment of every `allocate` offset and size; must be a power of two
    pub alignment: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            track_stats: cfg!(debug_assertions),
            alloc_pattern: None,
            dealloc_pattern: if cfg!(debug_assertions) {
                Some(0xDD)
            } else {
                None
            },
            alignment: WORD_SIZE,
        }
    }
}

impl ArenaConfig {
    /// Production configuration - optimized for performance
    #[must_use]
    pub fn production() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            alignment: WORD_SIZE,
        }
    }

    /// Debug configuration - optimized for debugging
    #[must_use]
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            alloc_pattern: Some(0xAA),
            dealloc_pattern: Some(0xDD),
            alignment: WORD_SIZE,
        }
    }

    /// Performance configuration - minimal overhead
    #[must_use]
    pub fn performance() -> Self {
        Self {
            track_stats: false,
            alloc_pattern: None,
            dealloc_pattern: None,
            alignment: WORD_SIZE,
        }
    }

    /// Override the default alignment
    #[must_use]
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub(crate) fn validate(&self) -> MemoryResult<()> {
        check_alignment(self.alignment)
    }
}
