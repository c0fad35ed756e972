//! Main arena allocator implementation
//!
//! ## Invariants
//!
//! - `0 <= offset <= capacity`
//! - `peak >= offset`; `offset` only grows until [`ArenaAllocator::reset`]
//! - Every handle issued before a reset carries a stale generation and is
//!   rejected by byte access afterwards

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::ArenaConfig;
use crate::allocator::sealed::{FragmentationStats, Inspect};
use crate::allocator::{AllocatorStats, StatisticsProvider};
use crate::core::{Allocation, MemoryUsage, Region, RegionAccess, Resettable};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{CheckedArithmetic, check_alignment};

const NAME: &str = "arena";

/// Bump allocator over a single owned region
///
/// # Memory Layout
/// ```text
/// [0]----[alloc1]----[alloc2]----[offset]----[free]----[capacity]
///        <------ allocated ------>         <-- available -->
/// ```
#[derive(Debug)]
pub struct ArenaAllocator {
    region: Region,
    config: ArenaConfig,
    offset: usize,
    peak: usize,
    stats: AllocatorStats,
}

impl ArenaAllocator {
    /// Creates a new arena allocator with custom configuration
    pub fn with_config(capacity: usize, config: ArenaConfig) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::invalid_config("arena capacity cannot be zero"));
        }
        config.validate()?;

        let region = Region::new(capacity)?;

        #[cfg(feature = "logging")]
        debug!(capacity, alignment = config.alignment, region = %region.id(), "Arena created");

        Ok(Self {
            region,
            config,
            offset: 0,
            peak: 0,
            stats: AllocatorStats::new(),
        })
    }

    /// Creates a new arena allocator with default configuration
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, ArenaConfig::default())
    }

    /// Creates a production-optimized arena allocator
    pub fn production(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, ArenaConfig::production())
    }

    /// Creates a debug-optimized arena allocator
    pub fn debug(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, ArenaConfig::debug())
    }

    /// Creates a performance-optimized arena allocator
    pub fn performance(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, ArenaConfig::performance())
    }

    /// Returns the total capacity of the arena
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Bytes consumed since creation or the last reset, padding included
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Bytes left before the arena is exhausted
    pub fn available(&self) -> usize {
        self.capacity() - self.offset
    }

    /// Highest offset ever reached, across resets
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Active configuration
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Allocate `size` bytes
    ///
    /// Both the start offset and the consumed size are rounded up to the
    /// configured alignment (the native word by default), so consecutive
    /// `allocate(100)` and `allocate(50)` land 104 bytes apart. A zero-byte
    /// request consumes nothing, so it shares its offset with the next one.
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        let alignment = self.config.alignment;
        let rounded = size.try_align_up(alignment)?;
        self.bump(size, rounded, alignment)
    }

    /// Allocate `size` bytes starting at an offset aligned to `alignment`
    ///
    /// Alignment is relative to the region start. Only the start is padded;
    /// the arena advances by exactly `size` after it.
    pub fn allocate_aligned(&mut self, size: usize, alignment: usize) -> MemoryResult<Allocation> {
        check_alignment(alignment)?;
        self.bump(size, size, alignment)
    }

    fn bump(&mut self, size: usize, consumed: usize, alignment: usize) -> MemoryResult<Allocation> {
        let start = self.offset.try_align_up(alignment)?;
        let end = start.try_add(consumed)?;

        if end > self.capacity() {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::capacity_exceeded(
                NAME,
                end - self.offset,
                self.available(),
            ));
        }

        if let Some(pattern) = self.config.alloc_pattern {
            self.region.fill(start, size, pattern);
        }

        let used_before = self.offset;
        self.offset = end;
        self.peak = self.peak.max(end);

        if self.config.track_stats {
            self.stats.record_allocation(end - used_before);
        }

        #[cfg(feature = "logging")]
        trace!(size, offset = start, used = self.offset, "Arena allocation");

        Ok(self.region.handle(start, size))
    }

    /// Release every allocation at once
    ///
    /// The offset returns to zero and every earlier handle becomes stale.
    /// Memory is only overwritten when a `dealloc_pattern` is configured.
    pub fn reset(&mut self) {
        let released = self.offset;

        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(0, released, pattern);
        }

        self.offset = 0;
        self.region.advance_generation();

        if self.config.track_stats {
            self.stats.record_bulk_release(released);
        }

        #[cfg(feature = "logging")]
        debug!(released, peak = self.peak, "Arena reset");
    }

    /// Tear the arena down, releasing its region
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        debug!(
            capacity = self.capacity(),
            used = self.offset,
            peak = self.peak,
            "Arena destroyed"
        );
    }
}

impl MemoryUsage for ArenaAllocator {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }
}

impl Resettable for ArenaAllocator {
    fn reset(&mut self) {
        ArenaAllocator::reset(self);
    }
}

impl StatisticsProvider for ArenaAllocator {
    fn statistics(&self) -> AllocatorStats {
        self.stats
    }

    fn reset_statistics(&mut self) {
        self.stats.reset();
    }

    fn statistics_enabled(&self) -> bool {
        self.config.track_stats
    }
}

impl RegionAccess for ArenaAllocator {
    fn region(&self) -> &Region {
        &self.region
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.region.bytes_mut(allocation)
    }
}

impl Inspect for ArenaAllocator {
    fn fragmentation(&self) -> FragmentationStats {
        FragmentationStats::contiguous(self.available())
    }

    fn validate(&self) -> MemoryResult<()> {
        if self.offset > self.capacity() {
            return Err(MemoryError::corruption(
                NAME,
                format!("offset {} beyond capacity {}", self.offset, self.capacity()),
            ));
        }
        if self.peak < self.offset {
            return Err(MemoryError::corruption(
                NAME,
                format!("peak {} below offset {}", self.peak, self.offset),
            ));
        }
        if !self.config.alignment.is_power_of_two() {
            return Err(MemoryError::corruption(NAME, "alignment is not a power of two"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::WORD_SIZE;

    #[test]
    fn test_rejects_zero_capacity() {
        assert!(matches!(
            ArenaAllocator::new(0),
            Err(MemoryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_alignment() {
        let config = ArenaConfig::default().with_alignment(12);
        assert_eq!(
            ArenaAllocator::with_config(64, config).map(|a| a.capacity()),
            Err(MemoryError::InvalidAlignment { alignment: 12 })
        );
    }

    #[test]
    fn test_allocations_are_word_rounded() {
        let mut arena = ArenaAllocator::new(1024).expect("Failed to create arena");
        let a = arena.allocate(100).expect("first allocation");
        let b = arena.allocate(50).expect("second allocation");

        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 100usize.next_multiple_of(WORD_SIZE));
        assert_eq!(a.len(), 100);
        assert_eq!(arena.used(), b.offset() + 50usize.next_multiple_of(WORD_SIZE));
    }

    #[test]
    fn test_capacity_exceeded_leaves_offset() {
        let mut arena = ArenaAllocator::new(64).expect("Failed to create arena");
        arena.allocate(40).expect("fits");
        let used = arena.used();

        let err = arena.allocate(64).expect_err("should not fit");
        assert!(err.is_retryable());
        assert_eq!(arena.used(), used);
    }

    #[test]
    fn test_exact_fit() {
        let mut arena = ArenaAllocator::new(64).expect("Failed to create arena");
        arena.allocate(64).expect("exact fit");
        assert_eq!(arena.available(), 0);
        assert!(arena.allocate(1).is_err());
        assert!(arena.allocate(0).is_ok());
    }

    #[test]
    fn test_zero_size_shares_next_offset() {
        let mut arena = ArenaAllocator::new(64).expect("Failed to create arena");
        let empty = arena.allocate(0).expect("zero-size allocation");
        let next = arena.allocate(1).expect("allocation");

        assert!(empty.is_empty());
        assert_eq!(empty.offset(), next.offset());
        let third = arena.allocate(1).expect("allocation");
        assert!(third.offset() > next.offset());
    }

    #[test]
    fn test_aligned_allocation_pads_start_only() {
        let mut arena = ArenaAllocator::new(256).expect("Failed to create arena");
        arena.allocate_aligned(3, 1).expect("byte aligned");
        let b = arena.allocate_aligned(8, 64).expect("64 aligned");

        assert_eq!(b.offset(), 64);
        assert_eq!(arena.used(), 72);
        assert!(matches!(
            arena.allocate_aligned(8, 3),
            Err(MemoryError::InvalidAlignment { alignment: 3 })
        ));
    }

    #[test]
    fn test_reset_reuses_start_and_keeps_peak() {
        let mut arena = ArenaAllocator::new(1024).expect("Failed to create arena");
        let first = arena.allocate(100).expect("allocation");
        arena.allocate(200).expect("allocation");
        let peak = arena.peak();

        arena.reset();
        let again = arena.allocate(10).expect("allocation after reset");

        assert_eq!(again.offset(), first.offset());
        assert_eq!(arena.peak(), peak);
        assert!(arena.used() < peak);
    }

    #[test]
    fn test_reset_invalidates_handles() {
        let mut arena = ArenaAllocator::new(128).expect("Failed to create arena");
        let handle = arena.allocate(16).expect("allocation");
        arena.bytes_mut(&handle).expect("live handle").fill(7);

        arena.reset();
        assert!(matches!(
            arena.bytes(&handle),
            Err(MemoryError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn test_debug_patterns() {
        let mut arena = ArenaAllocator::debug(64).expect("Failed to create arena");
        let handle = arena.allocate(8).expect("allocation");
        assert_eq!(arena.bytes(&handle).expect("live handle"), &[0xAA; 8]);

        arena.reset();
        let again = arena.allocate(8).expect("allocation");
        assert_eq!(arena.bytes(&again).expect("live handle"), &[0xAA; 8]);
    }

    #[test]
    fn test_statistics() {
        let mut arena = ArenaAllocator::debug(64).expect("Failed to create arena");
        arena.allocate(10).expect("allocation");
        let _ = arena.allocate(100);
        arena.reset();

        let stats = arena.statistics();
        assert_eq!(stats.allocation_count, 1);
        assert_eq!(stats.failed_allocations, 1);
        assert_eq!(stats.reset_count, 1);
        assert_eq!(stats.allocated_bytes, 0);
        assert!(arena.statistics_enabled());
    }

    #[test]
    fn test_inspect() {
        let mut arena = ArenaAllocator::new(256).expect("Failed to create arena");
        arena.allocate(56).expect("allocation");

        assert!(arena.validate().is_ok());
        let frag = arena.fragmentation();
        assert_eq!(frag.total_free, 200);
        assert_eq!(frag.fragment_count, 1);
        assert_eq!(arena.type_name(), "ArenaAllocator");
    }
}
