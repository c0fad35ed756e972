//! Property tests for allocator invariants.
//!
//! Each property drives an allocator with arbitrary operation sequences and
//! checks its bookkeeping after every step.

use proptest::prelude::*;
use strata_memory::prelude::*;

// ---------------------------------------------------------------------------
// Arena: monotonic, non-overlapping, reset returns to the first offset
//
// Zero-byte requests consume nothing and share the next offset, so sizes
// start at one.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn arena_allocations_are_monotonic(sizes in prop::collection::vec(1usize..200, 1..40)) {
        let mut arena = ArenaAllocator::new(4096).expect("Failed to create arena");
        let mut first = None;
        let mut last: Option<Allocation> = None;

        for size in sizes {
            let Ok(handle) = arena.allocate(size) else { break };
            first.get_or_insert(handle.offset());
            if let Some(previous) = last {
                prop_assert!(handle.offset() > previous.offset());
                prop_assert!(handle.offset() >= previous.end());
                prop_assert!(!handle.overlaps(&previous));
            }
            last = Some(handle);
        }

        arena.reset();
        let again = arena.allocate(1).expect("Allocation after reset failed");
        prop_assert_eq!(Some(again.offset()), first.or(Some(0)));
    }
}

// ---------------------------------------------------------------------------
// Pool: used + free == block_count, release then allocate reuses the block
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pool_conserves_blocks(
        block_count in 1usize..32,
        ops in prop::collection::vec(any::<(bool, prop::sample::Index)>(), 0..100),
    ) {
        let mut pool = PoolAllocator::new(24, block_count).expect("Failed to create pool");
        let mut live: Vec<Allocation> = Vec::new();

        for (allocate, pick) in ops {
            if allocate || live.is_empty() {
                match pool.allocate() {
                    Ok(handle) => live.push(handle),
                    Err(_) => {
                        prop_assert_eq!(live.len(), block_count);
                    }
                }
            } else {
                let handle = live.swap_remove(pick.index(live.len()));
                pool.release(&handle).expect("Release failed");
                let reused = pool.allocate().expect("Allocation after release failed");
                prop_assert_eq!(reused.offset(), handle.offset());
                live.push(reused);
            }
            prop_assert_eq!(pool.allocated_blocks() + pool.free_blocks(), block_count);
            prop_assert_eq!(pool.allocated_blocks(), live.len());
        }
    }
}

// ---------------------------------------------------------------------------
// Stack: reverse-order release restores each prior top; others are rejected
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn stack_releases_in_lifo_order(sizes in prop::collection::vec(0usize..128, 2..24)) {
        let mut stack = StackAllocator::new(8192).expect("Failed to create stack allocator");
        let mut pushed = Vec::new();

        for size in sizes {
            let before = stack.used();
            let handle = stack.allocate(size).expect("Allocation failed");
            pushed.push((handle, before));
        }

        while let Some((top, before)) = pushed.pop() {
            if let Some(&(below, _)) = pushed.last() {
                let used = stack.used();
                prop_assert!(stack.release(&below).is_err());
                prop_assert_eq!(stack.used(), used);
            }
            stack.release(&top).expect("Release failed");
            prop_assert_eq!(stack.used(), before);
        }
    }
}

// ---------------------------------------------------------------------------
// Free-list: free bytes + allocated bytes == capacity at every step
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn free_list_conserves_bytes(
        coalesce in any::<bool>(),
        ops in prop::collection::vec((any::<bool>(), 0usize..160, any::<prop::sample::Index>()), 0..80),
    ) {
        let config = if coalesce {
            FreeListConfig::default().with_coalescing()
        } else {
            FreeListConfig::default()
        };
        let mut list =
            FreeListAllocator::with_config(2048, config).expect("Failed to create free-list");
        let mut live: Vec<Allocation> = Vec::new();

        for (allocate, size, pick) in ops {
            if allocate || live.is_empty() {
                if let Ok(handle) = list.allocate(size) {
                    live.push(handle);
                }
            } else {
                let handle = live.swap_remove(pick.index(live.len()));
                list.release(&handle).expect("Release failed");
            }

            let free: usize = list.free_blocks().map(|block| block.size).sum();
            prop_assert_eq!(free + list.used(), list.capacity());
            prop_assert!(list.validate().is_ok());
        }
    }
}

// ---------------------------------------------------------------------------
// Buddy: every block is min_block << k and aligned to its own size
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn buddy_blocks_are_aligned_powers_of_two(
        ops in prop::collection::vec((any::<bool>(), 1usize..600, any::<prop::sample::Index>()), 0..80),
    ) {
        let mut buddy = BuddyAllocator::new(4096).expect("Failed to create buddy");
        let min = buddy.min_block_size();
        let mut live: Vec<(Allocation, usize)> = Vec::new();

        for (allocate, size, pick) in ops {
            if allocate || live.is_empty() {
                if let Ok(handle) = buddy.allocate(size) {
                    let block = buddy.block_size_for(size).expect("size is supported");
                    prop_assert!(block.is_power_of_two() && block >= min && block >= size);
                    prop_assert_eq!(handle.offset() % block, 0);
                    for (other, other_size) in &live {
                        let other_block = buddy.block_size_for(*other_size).expect("supported");
                        let disjoint = handle.offset() + block <= other.offset()
                            || other.offset() + other_block <= handle.offset();
                        prop_assert!(disjoint);
                    }
                    live.push((handle, size));
                }
            } else {
                let (handle, size) = live.swap_remove(pick.index(live.len()));
                buddy.release(&handle, size).expect("Release failed");
            }
            prop_assert!(buddy.validate().is_ok());
        }
    }
}
