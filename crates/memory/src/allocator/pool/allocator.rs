//! Main pool allocator implementation
//!
//! Fixed-size blocks are threaded onto a free chain of slot indices kept
//! beside the region rather than inside it. Allocation pops the head and
//! release pushes onto it, both in O(1).
//!
//! ## Invariants
//!
//! - Every block is either on the free chain or handed out, never both
//! - `allocated_blocks() + free_blocks() == block_count()`
//! - Block offsets are multiples of `block_size`, which is word-aligned

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::PoolConfig;
use crate::allocator::sealed::{FragmentationStats, Inspect};
use crate::allocator::{AllocatorStats, StatisticsProvider};
use crate::core::{Allocation, MemoryUsage, Region, RegionAccess, Resettable};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{CheckedArithmetic, WORD_SIZE};

const NAME: &str = "pool";

/// Pool allocator for fixed-size blocks
///
/// Blocks are handed out lowest offset first on a fresh pool; a released
/// block is the next one handed out.
#[derive(Debug)]
pub struct PoolAllocator {
    region: Region,
    config: PoolConfig,
    block_size: usize,
    block_count: usize,
    /// Free chain; the head is the last element
    free: Vec<usize>,
    /// Occupancy per block, only kept with `detect_double_release`
    occupied: Option<Vec<bool>>,
    stats: AllocatorStats,
}

impl PoolAllocator {
    /// Creates a new pool allocator with custom configuration
    ///
    /// `block_size` is rounded up to at least the native word and to word
    /// alignment.
    pub fn with_config(
        block_size: usize,
        block_count: usize,
        config: PoolConfig,
    ) -> MemoryResult<Self> {
        if block_count == 0 {
            return Err(MemoryError::invalid_config("pool block count cannot be zero"));
        }

        let block_size = block_size.max(WORD_SIZE).try_align_up(WORD_SIZE)?;
        let capacity = block_size.try_mul(block_count)?;
        let region = Region::new(capacity)?;

        let mut free = Vec::new();
        free.try_reserve_exact(block_count)
            .map_err(|_| MemoryError::backing_allocation_failed(capacity))?;
        free.extend((0..block_count).rev());

        let occupied = config
            .detect_double_release
            .then(|| vec![false; block_count]);

        #[cfg(feature = "logging")]
        debug!(block_size, block_count, region = %region.id(), "Pool created");

        Ok(Self {
            region,
            config,
            block_size,
            block_count,
            free,
            occupied,
            stats: AllocatorStats::new(),
        })
    }

    /// Creates a new pool allocator with default configuration
    pub fn new(block_size: usize, block_count: usize) -> MemoryResult<Self> {
        Self::with_config(block_size, block_count, PoolConfig::default())
    }

    /// Creates a production-optimized pool allocator
    pub fn production(block_size: usize, block_count: usize) -> MemoryResult<Self> {
        Self::with_config(block_size, block_count, PoolConfig::production())
    }

    /// Creates a debug-optimized pool allocator
    pub fn debug(block_size: usize, block_count: usize) -> MemoryResult<Self> {
        Self::with_config(block_size, block_count, PoolConfig::debug())
    }

    /// Creates a performance-optimized pool allocator
    pub fn performance(block_size: usize, block_count: usize) -> MemoryResult<Self> {
        Self::with_config(block_size, block_count, PoolConfig::performance())
    }

    /// Returns the size of each block after rounding
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the total number of blocks in the pool
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Returns the number of allocated blocks
    pub fn allocated_blocks(&self) -> usize {
        self.block_count.saturating_sub(self.free.len())
    }

    /// Alias of [`allocated_blocks`](Self::allocated_blocks)
    pub fn used_blocks(&self) -> usize {
        self.allocated_blocks()
    }

    /// Returns the number of free blocks
    pub fn free_blocks(&self) -> usize {
        self.free.len()
    }

    /// Checks if the pool is full (no free blocks)
    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    /// Checks if the pool is empty (all blocks free)
    pub fn is_empty(&self) -> bool {
        self.free.len() == self.block_count
    }

    /// Checks if a handle points at a block boundary of this pool
    pub fn contains(&self, allocation: &Allocation) -> bool {
        allocation.region() == self.region.id()
            && allocation.offset() < self.capacity()
            && allocation.offset() % self.block_size == 0
    }

    /// Active configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Take one block off the free chain
    pub fn allocate(&mut self) -> MemoryResult<Allocation> {
        let Some(index) = self.free.pop() else {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::capacity_exceeded(NAME, self.block_size, 0));
        };

        let offset = index * self.block_size;

        if let Some(pattern) = self.config.alloc_pattern {
            self.region.fill(offset, self.block_size, pattern);
        }
        if let Some(occupied) = self.occupied.as_mut() {
            occupied[index] = true;
        }
        if self.config.track_stats {
            self.stats.record_allocation(self.block_size);
        }

        #[cfg(feature = "logging")]
        trace!(index, offset, free = self.free.len(), "Pool allocation");

        Ok(self.region.handle(offset, self.block_size))
    }

    /// Return a block to the head of the free chain
    ///
    /// Handles from another region, from before the last reset, outside the
    /// region, or off a block boundary are rejected and the pool is left
    /// untouched. Releasing an already free block is only caught when
    /// `detect_double_release` is enabled.
    pub fn release(&mut self, allocation: &Allocation) -> MemoryResult<()> {
        let index = match self.block_index(allocation) {
            Ok(index) => index,
            Err(error) => {
                if self.config.track_stats {
                    self.stats.record_rejected_release();
                }
                return Err(error);
            }
        };

        if let Some(occupied) = self.occupied.as_mut() {
            if !occupied[index] {
                if self.config.track_stats {
                    self.stats.record_rejected_release();
                }
                return Err(MemoryError::invalid_release(
                    NAME,
                    allocation.offset(),
                    "block is already free",
                ));
            }
            occupied[index] = false;
        }

        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(allocation.offset(), self.block_size, pattern);
        }

        self.free.push(index);

        if self.config.track_stats {
            self.stats.record_deallocation(self.block_size);
        }

        #[cfg(feature = "logging")]
        trace!(index, free = self.free.len(), "Pool release");

        Ok(())
    }

    fn block_index(&self, allocation: &Allocation) -> MemoryResult<usize> {
        let offset = allocation.offset();

        if allocation.region() != self.region.id() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "allocation belongs to another region",
            ));
        }
        if allocation.generation != self.region.generation() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "allocation predates the last reset",
            ));
        }
        if offset >= self.capacity() {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "outside region bounds",
            ));
        }
        if offset % self.block_size != 0 {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "not on a block boundary",
            ));
        }

        Ok(offset / self.block_size)
    }

    /// Relink every block, releasing all allocations at once
    pub fn reset(&mut self) {
        let released = self.allocated_blocks() * self.block_size;

        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(0, self.capacity(), pattern);
        }

        self.free.clear();
        self.free.extend((0..self.block_count).rev());
        if let Some(occupied) = self.occupied.as_mut() {
            occupied.fill(false);
        }
        self.region.advance_generation();

        if self.config.track_stats {
            self.stats.record_bulk_release(released);
        }

        #[cfg(feature = "logging")]
        debug!(released, block_count = self.block_count, "Pool reset");
    }

    /// Tear the pool down, releasing its region
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        debug!(
            block_size = self.block_size,
            block_count = self.block_count,
            outstanding = self.allocated_blocks(),
            "Pool destroyed"
        );
    }
}

impl MemoryUsage for PoolAllocator {
    fn used_memory(&self) -> usize {
        self.allocated_blocks() * self.block_size
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.free_blocks() * self.block_size)
    }

    fn total_memory(&self) -> Option<usize> {
        Some(self.capacity())
    }
}

impl Resettable for PoolAllocator {
    fn reset(&mut self) {
        PoolAllocator::reset(self);
    }
}

impl StatisticsProvider for PoolAllocator {
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

impl RegionAccess for PoolAllocator {
    fn region(&self) -> &Region {
        &self.region
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.region.bytes_mut(allocation)
    }
}

impl Inspect for PoolAllocator {
    fn fragmentation(&self) -> FragmentationStats {
        // Any free block satisfies any request, so free space is never split.
        let total_free = self.free_blocks() * self.block_size;
        FragmentationStats::calculate(total_free, total_free, self.free_blocks())
    }

    fn validate(&self) -> MemoryResult<()> {
        if self.free.len() > self.block_count {
            return Err(MemoryError::corruption(
                NAME,
                format!(
                    "{} free blocks in a pool of {}",
                    self.free.len(),
                    self.block_count
                ),
            ));
        }

        let mut seen = vec![false; self.block_count];
        for &index in &self.free {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(MemoryError::corruption(
                        NAME,
                        format!("block {index} linked twice into the free chain"),
                    ));
                }
                None => {
                    return Err(MemoryError::corruption(
                        NAME,
                        format!("free chain names block {index} outside the pool"),
                    ));
                }
            }
        }

        if let Some(occupied) = &self.occupied {
            let in_use = occupied.iter().filter(|&&used| used).count();
            if in_use != self.allocated_blocks() {
                return Err(MemoryError::corruption(
                    NAME,
                    format!(
                        "occupancy map reports {in_use} blocks in use, free chain implies {}",
                        self.allocated_blocks()
                    ),
                ));
            }
        }

        Ok(())
    }
}
