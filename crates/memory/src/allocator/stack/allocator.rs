//! Main stack allocator implementation
//!
//! Every allocation is preceded by a one-word header holding the total size
//! of the block (header, payload and padding). Release reads that header and
//! only succeeds when the block ends exactly at the current top.
//!
//! Aligned blocks may start with padding. Their first word repeats the block
//! size and the header before the payload is flagged, so the chain stays
//! walkable from offset 0.
//!
//! ## Invariants
//!
//! - Headers form a gapless chain from offset 0 up to `top`
//! - Every block size is a non-zero multiple of the native word
//! - Markers only move `top` downward; a marker above `top` is rejected

#[cfg(feature = "logging")]
use tracing::{debug, trace};

use super::{StackConfig, StackFrame, StackMarker};
use crate::allocator::sealed::{FragmentationStats, Inspect};
use crate::allocator::{AllocatorStats, StatisticsProvider};
use crate::core::{Allocation, MemoryUsage, Region, RegionAccess, Resettable};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::{CheckedArithmetic, WORD_SIZE, check_alignment, is_aligned};

const NAME: &str = "stack";

/// Size of the per-allocation header
pub const HEADER_SIZE: usize = WORD_SIZE;

/// Set in the header of a block that starts with alignment padding
const PADDED_FLAG: usize = 1;

/// Stack allocator that supports LIFO allocation and deallocation
///
/// # Memory Layout
/// ```text
/// [0]--[hdr|alloc1]--[hdr|alloc2]--[hdr|alloc3]--[top]----[free]----[capacity]
///      <-------------- allocated -------------->       <-- available -->
/// ```
///
/// Deallocations must happen in reverse order: alloc3, then alloc2, then alloc1.
#[derive(Debug)]
pub struct StackAllocator {
    region: Region,
    config: StackConfig,
    top: usize,
    stats: AllocatorStats,
}

impl StackAllocator {
    /// Creates a new stack allocator with custom configuration
    pub fn with_config(capacity: usize, config: StackConfig) -> MemoryResult<Self> {
        if capacity == 0 {
            return Err(MemoryError::invalid_config("stack capacity cannot be zero"));
        }

        let region = Region::new(capacity)?;

        #[cfg(feature = "logging")]
        debug!(capacity, region = %region.id(), "Stack created");

        Ok(Self {
            region,
            config,
            top: 0,
            stats: AllocatorStats::new(),
        })
    }

    /// Creates a new stack allocator with default configuration
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, StackConfig::default())
    }

    /// Creates a production-optimized stack allocator
    pub fn production(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, StackConfig::production())
    }

    /// Creates a debug-optimized stack allocator
    pub fn debug(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, StackConfig::debug())
    }

    /// Creates a performance-optimized stack allocator
    pub fn performance(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(capacity, StackConfig::performance())
    }

    /// Returns the total capacity of the allocator
    pub fn capacity(&self) -> usize {
        self.region.capacity()
    }

    /// Returns the amount of memory currently allocated, headers included
    pub fn used(&self) -> usize {
        self.top
    }

    /// Returns the amount of memory available for allocation
    pub fn available(&self) -> usize {
        self.capacity() - self.top
    }

    /// Active configuration
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Push a block with room for `size` bytes
    pub fn allocate(&mut self, size: usize) -> MemoryResult<Allocation> {
        self.push(size, WORD_SIZE)
    }

    /// Push a block whose payload offset is a multiple of `alignment`
    ///
    /// Alignment is relative to the region start. Padding in front of the
    /// header is counted in the block size, so the block is released (or
    /// restored past) like any other.
    pub fn allocate_aligned(&mut self, size: usize, alignment: usize) -> MemoryResult<Allocation> {
        check_alignment(alignment)?;
        self.push(size, alignment.max(WORD_SIZE))
    }

    fn push(&mut self, size: usize, alignment: usize) -> MemoryResult<Allocation> {
        let start = self.top;
        let payload = start.try_add(HEADER_SIZE)?.try_align_up(alignment)?;
        let header = payload - HEADER_SIZE;
        let padding = header - start;
        let end = payload.try_add(size)?.try_align_up(WORD_SIZE)?;
        let total = end - start;

        if end > self.capacity() {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::capacity_exceeded(
                NAME,
                total,
                self.available(),
            ));
        }

        if padding == 0 {
            self.region.write_word(header, total)?;
        } else {
            // Leading word keeps the chain walkable; the rest of the padding
            // is zeroed so it never reads as a block size.
            self.region.write_word(start, total)?;
            self.region.fill(start + WORD_SIZE, padding - WORD_SIZE, 0);
            self.region.write_word(header, total | PADDED_FLAG)?;
        }

        if let Some(pattern) = self.config.alloc_pattern {
            self.region.fill(payload, size, pattern);
        }

        self.top = end;

        if self.config.track_stats {
            self.stats.record_allocation(total);
        }

        #[cfg(feature = "logging")]
        trace!(size, padding, total, offset = payload, top = self.top, "Stack allocation");

        Ok(self.region.handle(payload, size))
    }

    /// Pop the most recent allocation
    ///
    /// Anything but the topmost live allocation is rejected with
    /// [`MemoryError::InvalidRelease`] and the stack is left unchanged.
    /// The released handle itself is not invalidated; writing through it
    /// may clobber headers of later blocks.
    pub fn release(&mut self, allocation: &Allocation) -> MemoryResult<()> {
        let start = match self.topmost_block(allocation) {
            Ok(start) => start,
            Err(error) => {
                if self.config.track_stats {
                    self.stats.record_rejected_release();
                }
                return Err(error);
            }
        };

        let total = self.top - start;
        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(start, total, pattern);
        }

        self.top = start;

        if self.config.track_stats {
            self.stats.record_deallocation(total);
        }

        #[cfg(feature = "logging")]
        trace!(total, top = self.top, "Stack release");

        Ok(())
    }

    /// Start of the block behind `allocation` if it is the topmost block
    fn topmost_block(&self, allocation: &Allocation) -> MemoryResult<usize> {
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
        if offset < HEADER_SIZE || offset > self.top {
            return Err(MemoryError::invalid_release(
                NAME,
                offset,
                "not a live allocation",
            ));
        }

        let header = offset - HEADER_SIZE;
        let word = self.region.read_word(header)?;
        let total = word & !PADDED_FLAG;

        let start = if word & PADDED_FLAG == 0 {
            Some(header).filter(|&start| start.checked_add(total) == Some(self.top))
        } else {
            self.top.checked_sub(total).filter(|&start| {
                start < header && self.region.read_word(start).ok() == Some(total)
            })
        };

        start.ok_or_else(|| {
            MemoryError::invalid_release(NAME, offset, "not the most recent allocation")
        })
    }

    /// Creates a marker at the current stack position
    pub fn mark(&self) -> StackMarker {
        StackMarker {
            position: self.top,
            region: self.region.id(),
            generation: self.region.generation(),
        }
    }

    /// Restores the stack to a previous marker position
    ///
    /// Releases everything allocated since the marker in O(1), bypassing the
    /// per-allocation LIFO check. Markers from another stack, from before the
    /// last reset, or above the current top are rejected.
    pub fn restore(&mut self, marker: StackMarker) -> MemoryResult<()> {
        if marker.region != self.region.id() {
            return Err(MemoryError::invalid_handle(
                "marker belongs to another stack",
            ));
        }
        if marker.generation != self.region.generation() {
            return Err(MemoryError::invalid_handle(
                "marker predates the last reset",
            ));
        }
        if marker.position > self.top {
            return Err(MemoryError::invalid_release(
                NAME,
                marker.position,
                "marker is above the current top",
            ));
        }

        let released = self.top - marker.position;
        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(marker.position, released, pattern);
        }

        self.top = marker.position;

        if self.config.track_stats {
            self.stats.record_bulk_release(released);
        }

        #[cfg(feature = "logging")]
        debug!(released, top = self.top, "Stack restored to marker");

        Ok(())
    }

    /// Open a scope that restores the current position when dropped
    pub fn frame(&mut self) -> StackFrame<'_> {
        StackFrame::new(self)
    }

    /// Release every allocation at once and invalidate all handles and markers
    pub fn reset(&mut self) {
        let released = self.top;

        if let Some(pattern) = self.config.dealloc_pattern {
            self.region.fill(0, released, pattern);
        }

        self.top = 0;
        self.region.advance_generation();

        if self.config.track_stats {
            self.stats.record_bulk_release(released);
        }

        #[cfg(feature = "logging")]
        debug!(released, "Stack reset");
    }

    /// Tear the stack down, releasing its region
    pub fn destroy(self) {
        #[cfg(feature = "logging")]
        debug!(capacity = self.capacity(), used = self.top, "Stack destroyed");
    }
}

impl MemoryUsage for StackAllocator {
    fn used_memory(&self) -> usize {
        self.used()
    }

    fn available_memory(&self) -> Option<usize> {
        Some(self.available())
    }
}

impl Resettable for StackAllocator {
    fn reset(&mut self) {
        StackAllocator::reset(self);
    }
}

impl StatisticsProvider for StackAllocator {
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

impl RegionAccess for StackAllocator {
    fn region(&self) -> &Region {
        &self.region
    }

    fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.region.bytes_mut(allocation)
    }
}

impl Inspect for StackAllocator {
    fn fragmentation(&self) -> FragmentationStats {
        FragmentationStats::contiguous(self.available())
    }

    fn validate(&self) -> MemoryResult<()> {
        if self.top > self.capacity() {
            return Err(MemoryError::corruption(
                NAME,
                format!("top {} beyond capacity {}", self.top, self.capacity()),
            ));
        }

        let mut position = 0;
        while position < self.top {
            let total = self.region.read_word(position).map_err(|_| {
                MemoryError::corruption(NAME, format!("header at {position} is unreadable"))
            })?;

            if total < HEADER_SIZE || !is_aligned(total, WORD_SIZE) {
                return Err(MemoryError::corruption(
                    NAME,
                    format!("header at {position} records invalid size {total}"),
                ));
            }
            position = match position.checked_add(total) {
                Some(next) if next <= self.top => next,
                _ => {
                    return Err(MemoryError::corruption(
                        NAME,
                        format!("block at {position} runs past the top {}", self.top),
                    ));
                }
            };
        }

        Ok(())
    }
}
