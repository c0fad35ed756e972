//! Main free-list allocator implementation
//!
//! The free chain is kept beside the region as an ordered list of
//! `(offset, size)` blocks, head first. Allocated blocks carry a two-word
//! header in the region itself: the block size and a liveness tag.
//!
//! ## Invariants
//!
//! - Every byte belongs to exactly one block, free or allocated
//! - `free bytes + allocated bytes == capacity`
//! - Free blocks never overlap

use std::collections::VecDeque;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::FreeListConfig;
use crate::allocator::sealed::{FragmentationStats, Inspect};
use crate::allocator::{AllocatorStats, StatisticsProvider};
use crate::core::{Allocation, MemoryUsage, Region, RegionAccess};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{CheckedArithmetic, WORD_SIZE};

const NAME: &str = "free-list";

/// Size of the header preceding every allocated payload
pub const HEADER_SIZE: usize = 2 * WORD_SIZE;

const LIVE_TAG: usize = 0xA110_C8ED;
const FREE_TAG: usize = 0;

/// A free range of the region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    /// Offset of the first byte of the block
    pub offset: usize,
    /// Size of the block in bytes
    pub size: usize,
}

impl FreeBlock {
    const fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// First-fit allocator with block splitting
#[derive(Debug)]
pub struct FreeListAllocator {
    region: Region,
    config: FreeListConfig,
    free: VecDeque<FreeBlock>,
    allocated: usize,
    stats: AllocatorStats,
}

impl FreeListAllocator {
    /// Creates a new free-list allocator with custom configuration
    ///
    /// The whole region starts as one free block.
    pub fn with_config(capacity: usize, config: FreeListConfig) -> MemoryResult<Self> {
        if capacity < HEADER_SIZE {
            return Err(MemoryError::invalid_config(format!(
                "free-list capacity must hold at least one {HEADER_SIZE}-byte header"
            )));
        }

        let region = Region::new(capacity)?;
        let mut free = VecDeque::new();
        free.push_back(FreeBlock {
            offset: 0,
            size: capacity,
        });

        #[cfg(feature = "logging")]
        debug!(capacity, coalesce = config.coalesce, region = %region.id(), "Free-list created");

        Ok(Self {
            region,
            config,
            free,
            allocated: 0,
            stats: AllocatorStats::new(),
        })
    }

    /// Creates a new free-list allocator with default configuration
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, FreeListConfig::default())
    }

    /// Creates a production-optimized free-list allocator
    pub fn production(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, FreeListConfig::production())
    }

    /// Creates a debug-optimized free-list allocator
    pub fn debug(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, FreeListConfig::debug())
    }

    /// Creates a performance-optimized free-list allocator
    pub fn performance(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, FreeListConfig::performance())
    }

    /// Returns the total capacity of the allocator
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Bytes held by allocated blocks, headers included
    pub fn used(&self) -> usize {
        self.allocated
    }

    /// Bytes held by free blocks
    pub fn available(&self) -> usize {
        self.capacity() - self.allocated
    }

    /// Number of blocks on the free chain
    pub fn free_block_count(&self) -> usize {
        self.free.len()
    }

    /// Size of the largest free block
    pub fn largest_free_block(&self) -> usize {
        self.free.iter().map(|block| block.size).max().unwrap_or(0)
    }

    /// Free chain, head first
    pub fn free_blocks(&self) -> impl Iterator<Item = FreeBlock> + '_ {
        self.free.iter().copied()
    }

    /// Active configuration
    pub fn config(&self) -> &FreeListConfig {
        &self.config
    }

    /// Allocate `size` bytes from the first free block that fits
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        let needed = size.try_add(HEADER_SIZE)?.try_align_up(WORD_SIZE)?;

        let Some(index) = self.free.iter().position(|block| block.size >= needed) else {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::capacity_exceeded(
                NAME,
                needed,
                self.largest_free_block(),
            ));
        };

        let block = self.free[index];
        let remainder = block.size - needed;

        let taken = if remainder > self.config.min_split_remainder {
            self.free[index] = FreeBlock {
                offset: block.offset + needed,
                size: remainder,
            };
            needed
        } else {
            self.free.remove(index);
            block.size
        };

        self.region.write_word(block.offset, taken)?;
        self.region.write_word(block.offset + WORD_SIZE, LIVE_TAG)?;

        let payload = block.offset + HEADER_SIZE;
        if let Some(pattern) = self.config.alloc_pattern {
            self.region.fill(payload, size, pattern);
        }

        self.allocated += taken;

        if self.config.track_stats {
            self.stats.record_allocation(taken);
        }

        #[cfg(feature = "logging")]
        trace!(size, taken, offset = payload, "Free-list allocation");

        Ok(self.region.handle(payload, size))
    }

    /// Return a block to the head of the free chain
    ///
    /// Neighbouring free blocks are left alone unless `coalesce` is set.
    /// The handle is not invalidated; it keeps resolving through
    /// `bytes_mut` and may alias whatever later reuses the block.
    pub fn release(&mut self, allocation: &Allocation) -> MemoryResult<()> {
        let block = match self.live_block(allocation) {
            Ok(block) => block,
            Err(error) => {
                if self.config.track_stats {
                    self.stats.record_rejected_release();
                }
                return Err(error);
            }
        };

        self.region.write_word(block.offset + WORD_SIZE, FREE_TAG)?;
        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(
                block.offset + HEADER_SIZE,
                block.size - HEADER_SIZE,
                pattern,
            );
        }

        self.allocated -= block.size;

        if self.config.coalesce {
            self.push_coalesced(block);
        } else {
            self.free.push_front(block);
        }

        if self.config.track_stats {
            self.stats.record_deallocation(block.size);
        }

        #[cfg(feature = "logging")]
        trace!(
            offset = block.offset,
            size = block.size,
            free_blocks = self.free.len(),
            "Free-list release"
        );

        Ok(())
    }

    /// Recover the allocated block behind `allocation` from its header
    fn live_block(&self, allocation: &Allocation) -> MemoryResult<FreeBlock> {
        let offset = allocation.offset();

        if allocation.region() != self.region.id() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "allocation belongs to another region",
            ));
        }
        if offset < HEADER_SIZE || offset > self.capacity() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "outside region bounds",
            ));
        }

        let header = offset - HEADER_SIZE;
        let size = self.region.read_word(header)?;
        let tag = self.region.read_word(header + WORD_SIZE)?;

        if tag != LIVE_TAG {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "no live allocation at this offset",
            ));
        }
        let fits = header
            .checked_add(size)
            .is_some_and(|end| size >= HEADER_SIZE && end <= self.capacity());
        if !fits || size > self.allocated {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "block header is corrupted",
            ));
        }

        Ok(FreeBlock {
            offset: header,
            size,
        })
    }

    fn push_coalesced(&mut self, mut block: FreeBlock) {
        if let Some(index) = self.free.iter().position(|b| b.end() == block.offset) {
            if let Some(before) = self.free.remove(index) {
                block = FreeBlock {
                    offset: before.offset,
                    size: before.size + block.size,
                };
            }
        }
        if let Some(index) = self.free.iter().position(|b| b.offset == block.end()) {
            if let Some(after) = self.free.remove(index) {
                block.size += after.size;
            }
        }
        self.free.push_front(block);
    }

    /// Tear the allocator down, releasing its region
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        debug!(
            capacity = self.capacity(),
            allocated = self.allocated,
            free_blocks = self.free.len(),
            "Free-list destroyed"
        );
    }
}

impl MemoryUsage for FreeListAllocator {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }
}

impl StatisticsProvider for FreeListAllocator {
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

impl RegionAccess for FreeListAllocator {
    fn region(&self) -> &Region {
        &self.region
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.region.bytes_mut(allocation)
    }
}

impl Inspect for FreeListAllocator {
    fn fragmentation(&self) -> FragmentationStats {
        FragmentationStats::calculate(
            self.available(),
            self.largest_free_block(),
            self.free.len(),
        )
    }

    fn validate(&self) -> MemoryResult<()> {
        let mut blocks: Vec<FreeBlock> = self.free.iter().copied().collect();
        blocks.sort_unstable_by_key(|block| block.offset);

        let mut free_bytes = 0usize;
        let mut previous_end = 0usize;
        for block in &blocks {
            if block.size == 0 {
                return Err(MemoryError::corruption(
                    NAME,
                    format!("empty free block at {}", block.offset),
                ));
            }
            if block.offset < previous_end {
                return Err(MemoryError::corruption(
                    NAME,
                    format!("free block at {} overlaps its predecessor", block.offset),
                ));
            }
            previous_end = block
                .offset
                .checked_add(block.size)
                .filter(|&end| end <= self.capacity())
                .ok_or_else(|| {
                    MemoryError::corruption(
                        NAME,
                        format!("free block at {} runs past the region", block.offset),
                    )
                })?;
            free_bytes += block.size;
        }

        if free_bytes + self.allocated != self.capacity() {
            return Err(MemoryError::corruption(
                NAME,
                format!(
                    "{free_bytes} free + {} allocated bytes != capacity {}",
                    self.allocated,
                    self.capacity()
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn needed(size: usize) -> usize {
        (size + HEADER_SIZE).next_multiple_of(WORD_SIZE)
    }

    #[test]
    fn test_whole_region_starts_free() {
        let alloc = FreeListAllocator::new(1024).expect("Failed to create free-list");
        assert_eq!(alloc.free_block_count(), 1);
        assert_eq!(alloc.largest_free_block(), 1024);
        assert!(alloc.validate().is_ok());
    }

    #[test]
    fn test_rejects_tiny_capacity() {
        assert!(matches!(
            FreeListAllocator::new(HEADER_SIZE - 1),
            Err(MemoryError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_split_keeps_remainder_in_place() {
        let mut alloc = FreeListAllocator::new(1024).expect("Failed to create free-list");
        let a = alloc.allocate(4).expect("allocation");

        assert_eq!(a.offset(), HEADER_SIZE);
        assert_eq!(
            alloc.free_blocks().collect::<Vec<_>>(),
            vec![FreeBlock {
                offset: needed(4),
                size: 1024 - needed(4),
            }]
        );
    }

    #[test]
    fn test_small_remainder_consumes_block() {
        let capacity = needed(64) + HEADER_SIZE + 16;
        let mut alloc = FreeListAllocator::new(capacity).expect("Failed to create free-list");
        alloc.allocate(64).expect("allocation");

        assert_eq!(alloc.free_block_count(), 0);
        assert_eq!(alloc.used(), capacity);
        assert!(alloc.validate().is_ok());
    }

    #[test]
    fn test_released_block_goes_to_head() {
        let mut alloc = FreeListAllocator::new(1024).expect("Failed to create free-list");
        let a = alloc.allocate(32).expect("allocation");
        let _b = alloc.allocate(32).expect("allocation");

        alloc.release(&a).expect("release");
        assert_eq!(alloc.free_blocks().next().map(|b| b.offset), Some(0));
        assert_eq!(alloc.allocate(32).expect("reuse").offset(), a.offset());
    }

    #[test]
    fn test_no_coalescing_by_default() {
        let mut alloc = FreeListAllocator::new(256).expect("Failed to create free-list");
        let a = alloc.allocate(40).expect("allocation");
        let b = alloc.allocate(40).expect("allocation");
        alloc.release(&a).expect("release");
        alloc.release(&b).expect("release");

        assert_eq!(alloc.free_block_count(), 3);
        assert!(alloc.validate().is_ok());
    }

    #[test]
    fn test_coalescing_merges_neighbours() {
        let config = FreeListConfig::default().with_coalescing();
        let mut alloc = FreeListAllocator::with_config(256, config).expect("free-list");
        let a = alloc.allocate(40).expect("allocation");
        let b = alloc.allocate(40).expect("allocation");
        alloc.release(&a).expect("release");
        alloc.release(&b).expect("release");

        assert_eq!(alloc.free_block_count(), 1);
        assert_eq!(alloc.largest_free_block(), 256);
        assert!(alloc.validate().is_ok());
    }

    #[test]
    fn test_double_release_rejected() {
        let mut alloc = FreeListAllocator::new(256).expect("Failed to create free-list");
        let a = alloc.allocate(16).expect("allocation");
        alloc.release(&a).expect("release");

        assert!(matches!(
            alloc.release(&a),
            Err(MemoryError::InvalidRelease { .. })
        ));
        assert!(alloc.validate().is_ok());
    }

    #[test]
    fn test_released_handle_aliases_reused_block() {
        let mut alloc = FreeListAllocator::production(256).expect("Failed to create free-list");
        let a = alloc.allocate(32).expect("allocation");
        alloc.release(&a).expect("release");
        let b = alloc.allocate(32).expect("reuse");

        alloc.bytes_mut(&a).expect("stale but in bounds").fill(0x7E);
        assert_eq!(alloc.bytes(&b).expect("live"), &[0x7E; 32]);
    }

    #[test]
    fn test_forged_offset_rejected() {
        let mut alloc = FreeListAllocator::new(256).expect("Failed to create free-list");
        let a = alloc.allocate(64).expect("allocation");
        let inside = alloc.region.handle(a.offset() + 8, 8);

        assert!(alloc.release(&inside).is_err());
        assert!(alloc.release(&a).is_ok());
    }

    #[test]
    fn test_exhaustion_reports_largest_block() {
        let mut alloc = FreeListAllocator::new(128).expect("Failed to create free-list");
        let err = alloc.allocate(512).expect_err("too large");
        assert_eq!(
            err,
            MemoryError::CapacityExceeded {
                allocator: "free-list",
                requested: needed(512),
                available: 128,
            }
        );
    }

    #[test]
    fn test_fragmentation_report() {
        let mut alloc = FreeListAllocator::new(512).expect("Failed to create free-list");
        let handles: Vec<_> = (0..4).map(|_| alloc.allocate(48).expect("allocation")).collect();
        alloc.release(&handles[0]).expect("release");
        alloc.release(&handles[2]).expect("release");

        let frag = alloc.fragmentation();
        assert_eq!(frag.fragment_count, 3);
        assert_eq!(frag.total_free, alloc.available());
        assert!(frag.largest_block < frag.total_free);
    }
}
