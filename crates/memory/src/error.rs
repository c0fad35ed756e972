//! Standalone error types for strata-memory
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory management errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    // --- Construction Errors ---
    /// The backing region could not be acquired from the system allocator
    #[error("Backing region allocation failed: {size} bytes")]
    BackingAllocationFailed {
        /// Requested region size in bytes
        size: usize,
    },

    /// A configuration value was rejected at construction time
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration
        reason: String,
    },

    /// An alignment was zero or not a power of two
    #[error("Invalid alignment: {alignment}")]
    InvalidAlignment {
        /// The rejected alignment
        alignment: usize,
    },

    /// A size computation overflowed `usize`
    #[error("Size overflow during operation: {operation}")]
    SizeOverflow {
        /// Operation during which the overflow happened
        operation: &'static str,
    },

    // --- Allocation Errors ---
    /// The remaining space cannot satisfy the request
    #[error("{allocator} capacity exceeded: requested {requested} bytes, available {available}")]
    CapacityExceeded {
        /// Allocator that rejected the request
        allocator: &'static str,
        /// Bytes the request needed (after rounding and headers)
        requested: usize,
        /// Bytes that were available to satisfy it
        available: usize,
    },

    /// The request is larger than the largest block the allocator can represent
    #[error("Unsupported size: {size} bytes (max: {max_size})")]
    UnsupportedSize {
        /// Requested size
        size: usize,
        /// Largest representable block
        max_size: usize,
    },

    // --- Release Errors ---
    /// The release does not belong to the allocator or breaks its ordering contract
    #[error("{allocator} rejected release at offset {offset}: {reason}")]
    InvalidRelease {
        /// Allocator that rejected the release
        allocator: &'static str,
        /// Offset of the rejected allocation within the region
        offset: usize,
        /// Why the release was rejected
        reason: &'static str,
    },

    /// A handle could not be resolved against the region
    #[error("Invalid handle: {reason}")]
    InvalidHandle {
        /// Why the handle was rejected
        reason: &'static str,
    },

    // --- Integrity Errors ---
    /// An internal invariant check failed
    #[error("Memory corruption detected in {component}: {details}")]
    Corruption {
        /// Allocator whose invariant failed
        component: &'static str,
        /// Description of the failed invariant
        details: String,
    },
}

impl MemoryError {
    /// Check if error is retryable
    ///
    /// Only exhausted capacity is recoverable by releasing memory and trying again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }

    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::BackingAllocationFailed { .. } => "MEM:REGION:BACKING",
            Self::InvalidConfig { .. } => "MEM:CONFIG:INVALID",
            Self::InvalidAlignment { .. } => "MEM:ALLOC:ALIGN",
            Self::SizeOverflow { .. } => "MEM:ALLOC:OVERFLOW",
            Self::CapacityExceeded { .. } => "MEM:ALLOC:CAPACITY",
            Self::UnsupportedSize { .. } => "MEM:ALLOC:UNSUPPORTED",
            Self::InvalidRelease { .. } => "MEM:RELEASE:INVALID",
            Self::InvalidHandle { .. } => "MEM:HANDLE:INVALID",
            Self::Corruption { .. } => "MEM:SYSTEM:CORRUPTION",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create backing allocation failed error
    pub fn backing_allocation_failed(size: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, "Backing region allocation failed");

        Self::BackingAllocationFailed { size }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Create invalid alignment error
    pub fn invalid_alignment(alignment: usize) -> Self {
        Self::InvalidAlignment { alignment }
    }

    /// Create size overflow error
    pub fn size_overflow(operation: &'static str) -> Self {
        Self::SizeOverflow { operation }
    }

    /// Create capacity exceeded error
    pub fn capacity_exceeded(allocator: &'static str, requested: usize, available: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(allocator, requested, available, "Allocator capacity exceeded");

        Self::CapacityExceeded {
            allocator,
            requested,
            available,
        }
    }

    /// Create unsupported size error
    pub fn unsupported_size(size: usize, max_size: usize) -> Self {
        Self::UnsupportedSize { size, max_size }
    }

    /// Create invalid release error
    pub fn invalid_release(allocator: &'static str, offset: usize, reason: &'static str) -> Self {
        #[cfg(feature = "logging")]
        warn!(allocator, offset, reason, "Release rejected");

        Self::InvalidRelease {
            allocator,
            offset,
            reason,
        }
    }

    /// Create invalid handle error
    pub fn invalid_handle(reason: &'static str) -> Self {
        Self::InvalidHandle { reason }
    }

    /// Create memory corruption error
    pub fn corruption(component: &'static str, details: impl Into<String>) -> Self {
        let details = details.into();

        #[cfg(feature = "logging")]
        error!(component, details = %details, "Memory corruption detected");

        Self::Corruption { component, details }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_error_message() {
        let error = MemoryError::capacity_exceeded("arena", 1024, 512);
        let message = error.to_string();
        assert!(message.contains("arena"));
        assert!(message.contains("1024"));
        assert!(message.contains("512"));
    }

    #[test]
    fn test_release_error_message() {
        let error = MemoryError::invalid_release("stack", 40, "not the most recent allocation");
        assert!(error.to_string().contains("offset 40"));
        assert!(error.to_string().contains("most recent"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            MemoryError::backing_allocation_failed(64).code(),
            "MEM:REGION:BACKING"
        );
        assert_eq!(
            MemoryError::capacity_exceeded("pool", 16, 0).code(),
            "MEM:ALLOC:CAPACITY"
        );
        assert_eq!(
            MemoryError::invalid_release("pool", 0, "outside region").code(),
            "MEM:RELEASE:INVALID"
        );
        assert_eq!(
            MemoryError::unsupported_size(4096, 1024).code(),
            "MEM:ALLOC:UNSUPPORTED"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(MemoryError::capacity_exceeded("arena", 8, 0).is_retryable());
        assert!(!MemoryError::invalid_release("stack", 0, "lifo").is_retryable());
        assert!(!MemoryError::unsupported_size(1, 0).is_retryable());
        assert!(!MemoryError::invalid_alignment(3).is_retryable());
    }

    #[test]
    fn test_corruption_details_preserved() {
        let error = MemoryError::corruption("free-list", format!("{} bytes leaked", 48));
        assert_eq!(
            error,
            MemoryError::Corruption {
                component: "free-list",
                details: "48 bytes leaked".to_string(),
            }
        );
    }
}
