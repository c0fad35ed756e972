//! Stack marker for position tracking

use crate::core::RegionId;

/// Marker representing a position in the stack allocator
///
/// Can be used to reset the allocator to this position, deallocating
/// all allocations made after the marker was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackMarker {
    pub(super) position: usize,
    pub(super) region: RegionId,
    pub(super) generation: u32,
}

impl StackMarker {
    /// Stack top captured by this marker
    pub fn position(&self) -> usize {
        self.position
    }
}
