//! RAII-based stack frame for automatic restoration

use core::ops::{Deref, DerefMut};

use super::{StackAllocator, StackMarker};

/// RAII helper for stack-based scoped allocation
///
/// Restores the stack to the position it had when the frame was opened once
/// the frame goes out of scope. The frame dereferences to the allocator, so
/// allocations are made through it directly.
///
/// ```rust
/// use strata_memory::allocator::StackAllocator;
///
/// let mut stack = StackAllocator::new(1024).expect("region");
/// {
///     let mut frame = stack.frame();
///     frame.allocate(64).expect("scratch");
///     frame.allocate(32).expect("scratch");
/// }
/// assert_eq!(stack.used(), 0);
/// ```
pub struct StackFrame<'a> {
    allocator: &'a mut StackAllocator,
    marker: StackMarker,
}

impl<'a> StackFrame<'a> {
    /// Creates a new stack frame that will restore to the current position
    /// when dropped
    pub fn new(allocator: &'a mut StackAllocator) -> Self {
        let marker = allocator.mark();
        Self { allocator, marker }
    }

    /// Marker the frame restores to
    pub fn marker(&self) -> StackMarker {
        self.marker
    }

    /// Manually restore and consume this frame
    pub fn restore(self) {
        drop(self);
    }
}

impl Deref for StackFrame<'_> {
    type Target = StackAllocator;

    fn deref(&self) -> &Self::Target {
        &*self.allocator
    }
}

impl DerefMut for StackFrame<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.allocator
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        // A reset inside the frame already released everything.
        let _ = self.allocator.restore(self.marker);
    }
}
