//! Common types and constants for memory management

use core::fmt;

/// Memory size constants
pub mod size {
    /// 1 Kilobyte
    pub const KB: usize = 1024;

    /// 1 Megabyte
    pub const MB: usize = 1024 * KB;

    /// Typical small region
    pub const SMALL: usize = 64 * KB;
}

/// Process-unique identifier of a backing region
///
/// Every [`Region`](super::Region) draws a fresh id at construction, so a handle
/// can never be resolved against a region it was not carved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub(crate) u64);

impl RegionId {
    /// Raw numeric value
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Handle to bytes handed out by an allocator
///
/// A handle is a non-owning view: an offset and length inside one region,
/// stamped with the region's id and the generation that was current when it
/// was produced. It is `Copy` and carries no lifetime; every access goes back
/// through the owning allocator, which rejects handles from another region,
/// from before the last reset, or outside its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation {
    pub(crate) region: RegionId,
    pub(crate) offset: usize,
    pub(crate) len: usize,
    pub(crate) generation: u32,
}

impl Allocation {
    #[inline]
    pub(crate) const fn new(region: RegionId, offset: usize, len: usize, generation: u32) -> Self {
        Self {
            region,
            offset,
            len,
            generation,
        }
    }

    /// Offset of the first byte relative to the start of the region
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of usable bytes (the size that was requested)
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the allocation has no usable bytes
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last usable byte
    #[inline]
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Region this allocation was carved from
    #[inline]
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Whether the two allocations share any byte
    pub fn overlaps(&self, other: &Self) -> bool {
        self.region == other.region && self.offset < other.end() && other.offset < self.end()
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}..{}] gen {}",
            self.region,
            self.offset,
            self.end(),
            self.generation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_detection() {
        let region = RegionId(7);
        let a = Allocation::new(region, 0, 16, 0);
        let b = Allocation::new(region, 16, 8, 0);
        let c = Allocation::new(region, 8, 16, 0);

        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn test_overlap_requires_same_region() {
        let a = Allocation::new(RegionId(1), 0, 16, 0);
        let b = Allocation::new(RegionId(2), 0, 16, 0);
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn test_display() {
        let a = Allocation::new(RegionId(3), 24, 8, 1);
        assert_eq!(a.to_string(), "region#3[24..32] gen 1");
        assert_eq!(a.end(), 32);
        assert!(!a.is_empty());
    }
}
