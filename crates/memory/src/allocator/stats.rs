//! Allocator statistics tracking
//!
//! Every allocator owns one [`AllocatorStats`] and updates it through
//! `&mut self`, so plain counters suffice.

/// Statistics for memory allocators
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Total bytes currently allocated
    pub allocated_bytes: usize,
    /// Peak bytes allocated
    pub peak_allocated_bytes: usize,
    /// Total number of allocations
    pub allocation_count: usize,
    /// Total number of deallocations
    pub deallocation_count: usize,
    /// Number of failed allocations
    pub failed_allocations: usize,
    /// Number of rejected releases
    pub rejected_releases: usize,
    /// Number of bulk resets and restores
    pub reset_count: usize,
    /// Total bytes ever allocated (cumulative)
    pub total_bytes_allocated: usize,
    /// Total bytes ever deallocated (cumulative)
    pub total_bytes_deallocated: usize,
}

impl AllocatorStats {
    /// Creates a new empty stats object
    pub const fn new() -> Self {
        Self {
            allocated_bytes: 0,
            peak_allocated_bytes: 0,
            allocation_count: 0,
            deallocation_count: 0,
            failed_allocations: 0,
            rejected_releases: 0,
            reset_count: 0,
            total_bytes_allocated: 0,
            total_bytes_deallocated: 0,
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Record a successful allocation of `size` bytes
    pub fn record_allocation(&mut self, size: usize) {
        self.allocation_count += 1;
        self.total_bytes_allocated = self.total_bytes_allocated.saturating_add(size);
        self.allocated_bytes = self.allocated_bytes.saturating_add(size);
        self.peak_allocated_bytes = self.peak_allocated_bytes.max(self.allocated_bytes);
    }

    /// Record a successful release of `size` bytes
    pub fn record_deallocation(&mut self, size: usize) {
        self.deallocation_count += 1;
        self.total_bytes_deallocated = self.total_bytes_deallocated.saturating_add(size);
        self.allocated_bytes = self.allocated_bytes.saturating_sub(size);
    }

    /// Record a bulk release of `size` bytes (reset or restore)
    pub fn record_bulk_release(&mut self, size: usize) {
        self.reset_count += 1;
        self.total_bytes_deallocated = self.total_bytes_deallocated.saturating_add(size);
        self.allocated_bytes = self.allocated_bytes.saturating_sub(size);
    }

    /// Record a failed allocation
    pub fn record_failure(&mut self) {
        self.failed_allocations += 1;
    }

    /// Record a rejected release
    pub fn record_rejected_release(&mut self) {
        self.rejected_releases += 1;
    }

    /// Calculate the average allocation size
    pub fn average_allocation_size(&self) -> Option<f64> {
        if self.allocation_count > 0 {
            Some(self.total_bytes_allocated as f64 / self.allocation_count as f64)
        } else {
            None
        }
    }

    /// Calculate current allocation efficiency (0.0 to 1.0)
    /// Higher values indicate fewer failed allocations
    pub fn allocation_efficiency(&self) -> f64 {
        let total_attempts = self.allocation_count + self.failed_allocations;
        if total_attempts > 0 {
            self.allocation_count as f64 / total_attempts as f64
        } else {
            1.0
        }
    }

    /// Check if there are any active allocations
    pub fn has_active_allocations(&self) -> bool {
        self.allocated_bytes > 0
    }
}

impl core::fmt::Display for AllocatorStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Allocator Statistics:")?;
        writeln!(f, "  Current allocated: {} bytes", self.allocated_bytes)?;
        writeln!(f, "  Peak allocated: {} bytes", self.peak_allocated_bytes)?;
        writeln!(f, "  Allocations: {}", self.allocation_count)?;
        writeln!(f, "  Deallocations: {}", self.deallocation_count)?;
        writeln!(f, "  Resets: {}", self.reset_count)?;
        writeln!(f, "  Failed allocations: {}", self.failed_allocations)?;
        writeln!(f, "  Rejected releases: {}", self.rejected_releases)?;

        if let Some(avg) = self.average_allocation_size() {
            writeln!(f, "  Average allocation size: {avg:.2} bytes")?;
        }

        writeln!(
            f,
            "  Allocation efficiency: {:.2}%",
            self.allocation_efficiency() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_tracks_high_water_mark() {
        let mut stats = AllocatorStats::new();
        stats.record_allocation(100);
        stats.record_allocation(50);
        stats.record_deallocation(50);
        stats.record_allocation(10);

        assert_eq!(stats.allocated_bytes, 110);
        assert_eq!(stats.peak_allocated_bytes, 150);
        assert_eq!(stats.allocation_count, 3);
        assert_eq!(stats.deallocation_count, 1);
    }

    #[test]
    fn test_bulk_release_counts_as_reset() {
        let mut stats = AllocatorStats::new();
        stats.record_allocation(64);
        stats.record_bulk_release(64);

        assert_eq!(stats.allocated_bytes, 0);
        assert_eq!(stats.reset_count, 1);
        assert_eq!(stats.deallocation_count, 0);
        assert!(!stats.has_active_allocations());
    }

    #[test]
    fn test_efficiency() {
        let mut stats = AllocatorStats::new();
        assert_eq!(stats.allocation_efficiency(), 1.0);

        stats.record_allocation(8);
        stats.record_failure();
        assert_eq!(stats.allocation_efficiency(), 0.5);
        assert_eq!(stats.average_allocation_size(), Some(8.0));
    }

    #[test]
    fn test_display_lists_counters() {
        let mut stats = AllocatorStats::new();
        stats.record_allocation(32);
        stats.record_rejected_release();

        let text = stats.to_string();
        assert!(text.contains("Current allocated: 32 bytes"));
        assert!(text.contains("Rejected releases: 1"));
    }
}
