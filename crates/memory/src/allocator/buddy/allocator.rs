//! Main buddy allocator implementation
//!
//! ## Invariants
//!
//! - Every block has size `min_block_size << k` for some level `k`
//! - Every block starts at an offset that is a multiple of its own size
//! - `free bytes + allocated bytes == capacity`

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::BuddyConfig;
use crate::allocator::sealed::{FragmentationStats, Inspect};
use crate::allocator::{AllocatorStats, StatisticsProvider};
use crate::core::{Allocation, MemoryUsage, Region, RegionAccess};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{is_aligned, log2_floor, next_power_of_two};

const NAME: &str = "buddy";

/// Power-of-two block allocator with per-level free lists
///
/// The caller hands the original request size back on release; no header is
/// stored in the region.
#[derive(Debug)]
pub struct BuddyAllocator {
    region: Region,
    config: BuddyConfig,
    min_block: usize,
    max_level: usize,
    /// Offsets of free blocks, indexed by level
    free_lists: Vec<Vec<usize>>,
    allocated: usize,
    stats: AllocatorStats,
}

impl BuddyAllocator {
    /// Creates a new buddy allocator with custom configuration
    ///
    /// `capacity` is rounded up to the next power of two (and to at least
    /// one minimum block); the whole region starts as a single free block at
    /// the top level.
    pub fn with_config(capacity: usize, config: BuddyConfig) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::invalid_config("buddy capacity cannot be zero"));
        }
        config.validate()?;

        let min_block = config.min_block_size;
        let rounded = next_power_of_two(capacity.max(min_block))
            .ok_or_else(|| MemoryError::size_overflow("buddy capacity rounding"))?;
        let max_level = log2_floor(rounded / min_block) as usize;

        let region = Region::new(rounded)?;

        let mut free_lists = vec![Vec::new(); max_level + 1];
        free_lists[max_level].push(0);

        #[cfg(feature = "logging")]
        debug!(
            requested = capacity,
            capacity = rounded,
            min_block,
            levels = max_level + 1,
            region = %region.id(),
            "Buddy allocator created"
        );

        Ok(Self {
            region,
            config,
            min_block,
            max_level,
            free_lists,
            allocated: 0,
            stats: AllocatorStats::new(),
        })
    }

    /// Creates a new buddy allocator with default configuration
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, BuddyConfig::default())
    }

    /// Creates a production-optimized buddy allocator
    pub fn production(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, BuddyConfig::production())
    }

    /// Creates a debug-optimized buddy allocator
    pub fn debug(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, BuddyConfig::debug())
    }

    /// Creates a performance-optimized buddy allocator
    pub fn performance(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, BuddyConfig::performance())
    }

    /// Returns the rounded capacity of the allocator
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Size of a level-0 block
    pub fn min_block_size(&self) -> usize {
        self.min_block
    }

    /// Number of size classes, level 0 through the top level
    pub fn levels(&self) -> usize {
        self.max_level + 1
    }

    /// Bytes held by allocated blocks, rounding included
    pub fn used(&self) -> usize {
        self.allocated
    }

    /// Bytes held by free blocks
    pub fn available(&self) -> usize {
        self.capacity() - self.allocated
    }

    /// Number of free blocks at `level`; zero for levels that do not exist
    pub fn free_blocks_at(&self, level: usize) -> usize {
        self.free_lists.get(level).map_or(0, Vec::len)
    }

    /// Size of the largest free block
    pub fn largest_free_block(&self) -> usize {
        (0..=self.max_level)
            .rev()
            .find(|&level| !self.free_lists[level].is_empty())
            .map_or(0, |level| self.min_block << level)
    }

    /// Active configuration
    pub fn config(&self) -> &BuddyConfig {
        &self.config
    }

    /// Level serving a request of `size` bytes
    pub fn level_for(&self, size: usize) -> MemoryResult<usize> {
        let block = next_power_of_two(size.max(self.min_block))
            .filter(|&block| block <= self.capacity())
            .ok_or_else(|| MemoryError::unsupported_size(size, self.capacity()))?;
        Ok(log2_floor(block / self.min_block) as usize)
    }

    /// Block size a request of `size` bytes occupies
    pub fn block_size_for(&self, size: usize) -> MemoryResult<usize> {
        self.level_for(size).map(|level| self.min_block << level)
    }

    /// Allocate the smallest block that holds `size` bytes
    ///
    /// Larger free blocks are split in halves down to the requested level;
    /// each upper half goes onto the free list one level below.
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        let level = match self.level_for(size) {
            Ok(level) => level,
            Err(error) => {
                if self.config.track_stats {
                    self.stats.record_failure();
                }
                return Err(error);
            }
        };

        let Some(mut current) = (level..=self.max_level).find(|&l| !self.free_lists[l].is_empty())
        else {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::capacity_exceeded(
                NAME,
                self.min_block << level,
                self.largest_free_block(),
            ));
        };

        let Some(offset) = self.free_lists[current].pop() else {
            return Err(MemoryError::corruption(NAME, "non-empty free list yielded no block"));
        };

        while current > level {
            current -= 1;
            self.free_lists[current].push(offset + (self.min_block << current));
        }

        let block_size = self.min_block << level;
        if let Some(pattern) = self.config.alloc_pattern {
            self.region.fill(offset, block_size, pattern);
        }

        self.allocated += block_size;

        if self.config.track_stats {
            self.stats.record_allocation(block_size);
        }

        #[cfg(feature = "logging")]
        trace!(size, level, block_size, offset, "Buddy allocation");

        Ok(self.region.handle(offset, size))
    }

    /// Return a block to the free list of its level
    ///
    /// `size` must be the size originally requested; the level is recomputed
    /// from it. Double release is not detected.
    pub fn release(&mut self, allocation: &Allocation, size: usize) -> MemoryResult<()> {
        let level = match self.released_level(allocation, size) {
            Ok(level) => level,
            Err(error) => {
                if self.config.track_stats {
                    self.stats.record_rejected_release();
                }
                return Err(error);
            }
        };

        let offset = allocation.offset();
        let block_size = self.min_block << level;

        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(offset, block_size, pattern);
        }

        self.allocated -= block_size;

        if self.config.coalesce {
            self.push_coalesced(offset, level);
        } else {
            self.free_lists[level].push(offset);
        }

        if self.config.track_stats {
            self.stats.record_deallocation(block_size);
        }

        #[cfg(feature = "logging")]
        trace!(level, block_size, offset, "Buddy release");

        Ok(())
    }

    fn released_level(&self, allocation: &Allocation, size: usize) -> MemoryResult<usize> {
        let offset = allocation.offset();

        if allocation.region() != self.region.id() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "allocation belongs to another region",
            ));
        }

        let level = self.level_for(size).map_err(|_| {
            MemoryError::invalid_release(NAME, offset, "size does not map to a block level")
        })?;
        if self.level_for(allocation.len()).ok() != Some(level) {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "size does not match the allocation",
            ));
        }

        let block_size = self.min_block << level;
        if !is_aligned(offset, block_size) || offset >= self.capacity() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "offset is not a block of that level",
            ));
        }
        if block_size > self.allocated {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "more bytes released than allocated",
            ));
        }

        Ok(level)
    }

    fn push_coalesced(&mut self, mut offset: usize, mut level: usize) {
        while level < self.max_level {
            let buddy = offset ^ (self.min_block << level);
            let Some(index) = self.free_lists[level].iter().position(|&o| o == buddy) else {
                break;
            };
            self.free_lists[level].swap_remove(index);
            offset = offset.min(buddy);
            level += 1;
        }
        self.free_lists[level].push(offset);
    }

    /// Tear the allocator down, releasing its region
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        debug!(
            capacity = self.capacity(),
            allocated = self.allocated,
            "Buddy allocator destroyed"
        );
    }
}

impl MemoryUsage for BuddyAllocator {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }
}

impl StatisticsProvider for BuddyAllocator {
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

impl RegionAccess for BuddyAllocator {
    fn region(&self) -> &Region {
        &self.region
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.region.bytes_mut(allocation)
    }
}

impl Inspect for BuddyAllocator {
    fn fragmentation(&self) -> FragmentationStats {
        let count = self.free_lists.iter().map(Vec::len).sum();
        FragmentationStats::calculate(self.available(), self.largest_free_block(), count)
    }

    fn validate(&self) -> MemoryResult<()> {
        let mut blocks = Vec::new();
        for (level, list) in self.free_lists.iter().enumerate() {
            let size = self.min_block << level;
            for &offset in list {
                if !is_aligned(offset, size) || offset + size > self.capacity() {
                    return Err(MemoryError::corruption(
                        NAME,
                        format!("free block at {offset} is not a valid level-{level} block"),
                    ));
                }
                blocks.push((offset, size));
            }
        }

        blocks.sort_unstable();
        let mut previous_end = 0;
        let mut free_bytes = 0;
        for &(offset, size) in &blocks {
            if offset < previous_end {
                return Err(MemoryError::corruption(
                    NAME,
                    format!("free block at {offset} overlaps another free block"),
                ));
            }
            previous_end = offset + size;
            free_bytes += size;
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
