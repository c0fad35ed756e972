//! Integration tests for Arena allocator

use pretty_assertions::assert_eq;
use strata_memory::prelude::*;
use strata_memory::utils::WORD_SIZE;

#[test]
fn test_arena_bump_and_reset() {
    let mut arena = ArenaAllocator::new(1024).expect("Failed to create arena");

    let a = arena.allocate(100).expect("Allocation A failed");
    let b = arena.allocate(50).expect("Allocation B failed");
    assert_eq!(b.offset(), a.offset() + 100usize.next_multiple_of(WORD_SIZE));
    assert!(!a.overlaps(&b));

    arena.reset();
    let c = arena.allocate(10).expect("Allocation after reset failed");
    assert_eq!(c.offset(), a.offset());
}

#[test]
fn test_arena_bytes_round_trip() {
    let mut arena = ArenaAllocator::new(256).expect("Failed to create arena");
    let a = arena.allocate(4).expect("Allocation failed");
    let b = arena.allocate(4).expect("Allocation failed");

    arena.bytes_mut(&a).expect("live").copy_from_slice(b"left");
    arena.bytes_mut(&b).expect("live").copy_from_slice(b"rite");

    assert_eq!(arena.bytes(&a).expect("live"), b"left");
    assert_eq!(arena.bytes(&b).expect("live"), b"rite");
}

#[test]
fn test_arena_exhaustion_is_recoverable() {
    let mut arena = ArenaAllocator::production(128).expect("Failed to create arena");
    arena.allocate(120).expect("Allocation failed");

    let err = arena.allocate(16).expect_err("arena should be full");
    assert_eq!(err.code(), "MEM:ALLOC:CAPACITY");
    assert!(err.is_retryable());

    arena.reset();
    arena.allocate(16).expect("Allocation after reset failed");
}

#[test]
fn test_arena_memory_usage() {
    let mut arena = ArenaAllocator::new(1000).expect("Failed to create arena");
    arena.allocate(96).expect("Allocation failed");

    let usage = arena.memory_usage();
    assert_eq!(usage.used, 96);
    assert_eq!(usage.total, Some(1000));
    assert_eq!(arena.available_memory(), Some(904));
}

#[test]
fn test_arena_through_resettable() {
    fn clear(allocator: &mut impl Resettable) {
        allocator.reset();
    }

    let mut arena = ArenaAllocator::new(64).expect("Failed to create arena");
    arena.allocate(32).expect("Allocation failed");
    clear(&mut arena);
    assert_eq!(arena.used(), 0);
    arena.destroy();
}
