//! Allocator tour
//!
//! Walks through each allocator with structured logging enabled.
//! Run with `RUST_LOG=strata_memory=trace` to see every allocation.

use strata_memory::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    println!("=== Allocator Tour ===\n");

    demo_arena()?;
    demo_pool()?;
    demo_stack()?;
    demo_free_list()?;
    demo_buddy()?;

    Ok(())
}

/// Arena: request-scoped scratch memory, released in bulk
fn demo_arena() -> MemoryResult<()> {
    println!("--- Arena ---");
    let mut arena = ArenaAllocator::debug(1024)?;

    for request_id in 1..=3 {
        let header = arena.allocate(100)?;
        let body = arena.allocate(50)?;
        arena.bytes_mut(&body)?.fill(request_id);
        println!("  request {request_id}: header {header}, body {body}");
        arena.reset();
    }

    println!("  peak usage: {} bytes\n", arena.peak());
    arena.destroy();
    Ok(())
}

/// Pool: fixed-size records recycled in O(1)
fn demo_pool() -> MemoryResult<()> {
    println!("--- Pool ---");
    let mut pool = PoolAllocator::debug(16, 4)?;

    let blocks = [pool.allocate()?, pool.allocate()?, pool.allocate()?, pool.allocate()?];
    if let Err(error) = pool.allocate() {
        println!("  fifth allocation: {error} [{}]", error.code());
    }

    pool.release(&blocks[1])?;
    let reused = pool.allocate()?;
    println!("  reused block at offset {}", reused.offset());
    println!("  {}\n", pool.statistics());
    Ok(())
}

/// Stack: nested scopes with LIFO release
fn demo_stack() -> MemoryResult<()> {
    println!("--- Stack ---");
    let mut stack = StackAllocator::debug(1024)?;

    let a = stack.allocate(4)?;
    let b = stack.allocate(100)?;
    let c = stack.allocate(8)?;

    if let Err(error) = stack.release(&b) {
        println!("  out-of-order release rejected: {error}");
    }
    stack.release(&c)?;
    stack.release(&b)?;

    {
        let mut frame = stack.frame();
        frame.allocate(256)?;
        println!("  inside frame: {} bytes used", frame.used());
    }
    println!("  after frame: {} bytes used", stack.used());

    stack.release(&a)?;
    println!("  {}\n", stack.memory_usage());
    Ok(())
}

/// Free-list: variable-size blocks with head-first reuse
fn demo_free_list() -> MemoryResult<()> {
    println!("--- Free-list ---");
    let mut list = FreeListAllocator::debug(1024)?;

    let a = list.allocate(4)?;
    let b = list.allocate(100)?;
    let _c = list.allocate(8)?;
    list.release(&b)?;
    list.release(&a)?;

    let d = list.allocate(4)?;
    println!("  a at {}, reused at {}", a.offset(), d.offset());
    println!("  {}\n", list.fragmentation());
    list.validate()?;
    Ok(())
}

/// Buddy: power-of-two blocks
fn demo_buddy() -> MemoryResult<()> {
    println!("--- Buddy ---");
    let mut buddy = BuddyAllocator::debug(1024)?;

    for size in [40, 100, 200] {
        let handle = buddy.allocate(size)?;
        println!(
            "  {size} bytes -> {}-byte block at offset {}",
            buddy.block_size_for(size)?,
            handle.offset()
        );
    }

    if let Err(error) = buddy.allocate(4096) {
        println!("  oversized request: {error}");
    }
    println!("  largest free block: {} bytes\n", buddy.largest_free_block());
    Ok(())
}
