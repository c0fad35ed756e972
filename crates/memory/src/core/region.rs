//! Owned backing region
//!
//! Every allocator owns exactly one [`Region`]: a contiguous byte buffer of
//! fixed capacity acquired once from the system allocator. Allocators only
//! ever hand out [`Allocation`] handles (offsets) into it; bytes are reached
//! through [`Region::bytes`] and [`Region::bytes_mut`], which resolve a handle
//! back against the buffer and reject anything that does not belong to it.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use super::types::{Allocation, RegionId};
use crate::error::{MemoryError, MemoryResult};
use crate::utils::WORD_SIZE;

static NEXT_REGION_ID: AtomicU64 = AtomicU64::new(1);

/// Contiguous fixed-capacity byte buffer owned by one allocator
pub struct Region {
    id: RegionId,
    buf: Box<[u8]>,
    generation: u32,
}

impl Region {
    /// Acquire a zero-filled region of `size` bytes
    ///
    /// Fails with [`MemoryError::BackingAllocationFailed`] when the system
    /// allocator cannot provide the buffer. Never aborts on OOM.
    pub fn new(size: usize) -> MemoryResult<Self> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(size)
            .map_err(|_| MemoryError::backing_allocation_failed(size))?;
        buf.resize(size, 0);

        Ok(Self {
            id: RegionId(NEXT_REGION_ID.fetch_add(1, Ordering::Relaxed)),
            buf: buf.into_boxed_slice(),
            generation: 0,
        })
    }

    /// Identifier stamped on every handle carved from this region
    #[inline]
    pub fn id(&self) -> RegionId {
        self.id
    }

    /// Capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Current generation; bumped by every bulk reset
    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Invalidate every outstanding handle
    pub(crate) fn advance_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn handle(&self, offset: usize, len: usize) -> Allocation {
        Allocation::new(self.id, offset, len, self.generation)
    }

    /// Check that `allocation` was produced by this region in its current generation
    pub fn owns(&self, allocation: &Allocation) -> bool {
        self.check(allocation).is_ok()
    }

    fn check(&self, allocation: &Allocation) -> MemoryResult<()> {
        if allocation.region != self.id {
            return Err(MemoryError::invalid_handle(
                "handle belongs to another region",
            ));
        }
        if allocation.generation != self.generation {
            return Err(MemoryError::invalid_handle(
                "handle predates the last reset",
            ));
        }
        match allocation.offset.checked_add(allocation.len) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(MemoryError::invalid_handle("handle exceeds region bounds")),
        }
    }

    /// Resolve a handle to its bytes
    pub fn bytes(&self, allocation: &Allocation) -> MemoryResult<&[u8]> {
        self.check(allocation)?;
        Ok(&self.buf[allocation.offset..allocation.end()])
    }

    /// Resolve a handle to its bytes, mutably
    pub fn bytes_mut(&mut self, allocation: &Allocation) -> MemoryResult<&mut [u8]> {
        self.check(allocation)?;
        Ok(&mut self.buf[allocation.offset..allocation.end()])
    }

    /// Fill `len` bytes at `offset` with `pattern`; out-of-range parts are ignored
    pub(crate) fn fill(&mut self, offset: usize, len: usize, pattern: u8) {
        let end = offset.saturating_add(len).min(self.buf.len());
        if offset < end {
            self.buf[offset..end].fill(pattern);
        }
    }

    /// Read a native-endian word stored at `offset`
    pub(crate) fn read_word(&self, offset: usize) -> MemoryResult<usize> {
        let bytes = offset
            .checked_add(WORD_SIZE)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or_else(|| MemoryError::invalid_handle("header outside region bounds"))?;

        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(bytes);
        Ok(usize::from_ne_bytes(word))
    }

    /// Write a native-endian word at `offset`
    pub(crate) fn write_word(&mut self, offset: usize, value: usize) -> MemoryResult<()> {
        let bytes = offset
            .checked_add(WORD_SIZE)
            .and_then(|end| self.buf.get_mut(offset..end))
            .ok_or_else(|| MemoryError::invalid_handle("header outside region bounds"))?;

        bytes.copy_from_slice(&value.to_ne_bytes());
        Ok(())
    }
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("id", &self.id)
            .field("capacity", &self.buf.len())
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_get_distinct_ids() {
        let a = Region::new(64).expect("Failed to create region");
        let b = Region::new(64).expect("Failed to create region");
        assert_ne!(a.id(), b.id());
        assert_eq!(a.capacity(), 64);
    }

    #[test]
    fn test_region_starts_zeroed() {
        let region = Region::new(32).expect("Failed to create region");
        let all = region.handle(0, 32);
        assert!(region.bytes(&all).expect("in bounds").iter().all(|&b| b == 0));
    }

    #[test]
    fn test_oversized_region_fails_without_abort() {
        let result = Region::new(usize::MAX);
        assert_eq!(
            result.map(|r| r.capacity()),
            Err(MemoryError::BackingAllocationFailed { size: usize::MAX })
        );
    }

    #[test]
    fn test_foreign_handle_rejected() {
        let a = Region::new(64).expect("Failed to create region");
        let b = Region::new(64).expect("Failed to create region");
        let handle = a.handle(0, 8);

        assert!(a.bytes(&handle).is_ok());
        assert!(matches!(
            b.bytes(&handle),
            Err(MemoryError::InvalidHandle { .. })
        ));
    }

    #[test]
    fn test_stale_generation_rejected() {
        let mut region = Region::new(64).expect("Failed to create region");
        let handle = region.handle(8, 8);
        region.advance_generation();

        assert!(!region.owns(&handle));
        assert!(region.bytes_mut(&handle).is_err());
    }

    #[test]
    fn test_out_of_bounds_handle_rejected() {
        let region = Region::new(16).expect("Failed to create region");
        let handle = region.handle(12, 8);
        assert!(region.bytes(&handle).is_err());
    }

    #[test]
    fn test_word_round_trip_and_bounds() {
        let mut region = Region::new(32).expect("Failed to create region");
        region.write_word(8, 0xDEAD_BEEF).expect("in bounds");
        assert_eq!(region.read_word(8), Ok(0xDEAD_BEEF));
        assert!(region.write_word(30, 1).is_err());
        assert!(region.read_word(usize::MAX).is_err());
    }

    #[test]
    fn test_fill_clamps_to_capacity() {
        let mut region = Region::new(16).expect("Failed to create region");
        region.fill(12, 100, 0xAB);
        let tail = region.handle(12, 4);
        assert_eq!(region.bytes(&tail).expect("in bounds"), &[0xAB; 4]);
    }
}
