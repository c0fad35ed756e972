//! Core traits for memory management
//!
//! This module defines the fundamental traits shared by every allocator in
//! strata-memory.

use super::region::Region;
use super::types::Allocation;
use crate::allocator::AllocatorStats;
use crate::error::MemoryResult;

/// Memory usage tracking trait
///
/// Implemented by every allocator. Provides both basic capacity information
/// and convenience methods for monitoring.
pub trait MemoryUsage {
    /// Get currently used memory in bytes
    fn used_memory(&self) -> usize;

    /// Get available memory in bytes (if known)
    fn available_memory(&self) -> Option<usize>;

    /// Get total memory capacity in bytes (if known)
    fn total_memory(&self) -> Option<usize> {
        self.available_memory()
            .map(|available| self.used_memory() + available)
    }

    /// Returns memory usage as a percentage (0.0 to 100.0)
    ///
    /// Returns `None` if total memory is unknown.
    fn memory_usage_percent(&self) -> Option<f32> {
        self.total_memory().map(|total| {
            if total == 0 {
                0.0
            } else {
                (self.used_memory() as f32 / total as f32) * 100.0
            }
        })
    }

    /// Checks if memory usage is above the specified percentage threshold
    fn is_memory_pressure(&self, threshold_percent: f32) -> Option<bool> {
        self.memory_usage_percent()
            .map(|usage| usage >= threshold_percent)
    }

    /// Returns a snapshot of memory usage
    fn memory_usage(&self) -> BasicMemoryUsage {
        BasicMemoryUsage {
            used: self.used_memory(),
            available: self.available_memory(),
            total: self.total_memory(),
            usage_percent: self.memory_usage_percent(),
        }
    }
}

/// Basic memory usage information
///
/// For allocation counters, see [`AllocatorStats`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicMemoryUsage {
    /// Currently used memory in bytes
    pub used: usize,
    /// Available memory in bytes
    pub available: Option<usize>,
    /// Total memory capacity in bytes
    pub total: Option<usize>,
    /// Memory usage as percentage
    pub usage_percent: Option<f32>,
}

impl core::fmt::Display for BasicMemoryUsage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "used: {} bytes", self.used)?;

        if let Some(available) = self.available {
            write!(f, ", free: {available} bytes")?;
        }

        if let Some(total) = self.total {
            write!(f, ", total: {total} bytes")?;
        }

        if let Some(percent) = self.usage_percent {
            write!(f, " ({percent:.1}%)")?;
        }

        Ok(())
    }
}

/// Allocators that support bulk release back to the initial state
///
/// Resetting advances the region generation, so every handle produced
/// before the reset is rejected by later byte access or release.
pub trait Resettable {
    /// Reset allocator to initial state
    fn reset(&mut self);

    /// Check if this allocator can be reset
    fn can_reset(&self) -> bool {
        true
    }

    /// Resets the allocator only if [`can_reset`](Self::can_reset) allows it
    ///
    /// Returns `true` if reset was performed.
    fn try_reset(&mut self) -> bool {
        if self.can_reset() {
            self.reset();
            true
        } else {
            false
        }
    }
}

/// Statistics provider trait
pub trait StatisticsProvider {
    /// Get current statistics
    fn statistics(&self) -> AllocatorStats;

    /// Reset statistics
    fn reset_statistics(&mut self);

    /// Check if statistics collection is enabled
    fn statistics_enabled(&self) -> bool {
        true
    }
}

/// Byte access to handles produced by an allocator
pub trait RegionAccess {
    /// The backing region
    fn region(&self) -> &Region;

    /// Resolve a handle to its bytes, mutably
    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]>;

    /// Resolve a handle to its bytes
    fn bytes(&self, allocation: &Allocation) -> MemoryResult<&[u8]> {
        self.region().bytes(allocation)
    }

    /// Whether `allocation` resolves against this allocator's region
    fn owns(&self, allocation: &Allocation) -> bool {
        self.region().owns(allocation)
    }
}
