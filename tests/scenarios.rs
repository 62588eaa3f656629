//! Black-box scenarios exercised only through the public `Arena` API:
//! single-block round trips, split/coalesce under exhaustion, and the
//! realloc grow/shrink/zero-size edge cases.

use buddy_arena::{Arena, BuddyError};

#[test]
fn allocate_and_free_a_single_block() {
    let _ = env_logger::try_init();
    let mut arena = Arena::new(1 << 16).unwrap();
    let block = arena.allocate(64).unwrap();
    unsafe {
        block.as_ptr().write_bytes(0x42, 64);
        assert_eq!(block.as_ptr().read(), 0x42);
    }
    arena.free(Some(block));
}

#[test]
fn many_small_allocations_then_frees_in_reverse_order() {
    let mut arena = Arena::new(1 << 18).unwrap();
    let mut blocks = Vec::new();
    for i in 0..32 {
        let b = arena.allocate(16 + i).unwrap();
        blocks.push(b);
    }
    while let Some(b) = blocks.pop() {
        arena.free(Some(b));
    }

    // The arena should be fully coalesced back to one block: a fresh
    // request for the whole thing (minus header slack) should succeed.
    let whole = arena.allocate((1 << 18) - 256).unwrap();
    arena.free(Some(whole));
}

#[test]
fn exhausting_the_arena_returns_out_of_memory_not_a_panic() {
    let mut arena = Arena::new(1 << 12).unwrap();
    let mut blocks = Vec::new();
    loop {
        match arena.allocate(32) {
            Ok(b) => blocks.push(b),
            Err(BuddyError::OutOfMemory) => break,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert!(!blocks.is_empty());

    for b in blocks {
        arena.free(Some(b));
    }
}

#[test]
fn reallocate_preserves_content_when_growing() {
    let mut arena = Arena::new(1 << 16).unwrap();
    let small = arena.allocate(16).unwrap();
    unsafe {
        for i in 0..16u8 {
            small.as_ptr().add(i as usize).write(i);
        }
    }

    let grown = arena.reallocate(Some(small), 512).unwrap().unwrap();
    unsafe {
        for i in 0..16u8 {
            assert_eq!(grown.as_ptr().add(i as usize).read(), i);
        }
    }
    arena.free(Some(grown));
}

#[test]
fn reallocate_within_the_same_class_keeps_the_same_pointer() {
    let mut arena = Arena::new(1 << 16).unwrap();
    let block = arena.allocate(100).unwrap();
    let same = arena.reallocate(Some(block), 120).unwrap().unwrap();
    assert_eq!(block, same);
    arena.free(Some(same));
}

#[test]
fn reallocate_to_zero_frees_and_returns_none() {
    let mut arena = Arena::new(1 << 16).unwrap();
    let block = arena.allocate(64).unwrap();
    let result = arena.reallocate(Some(block), 0).unwrap();
    assert!(result.is_none());
}

#[test]
fn reallocate_of_none_behaves_like_allocate() {
    let mut arena = Arena::new(1 << 16).unwrap();
    let block = arena.reallocate(None, 64).unwrap();
    assert!(block.is_some());
    arena.free(block);
}

#[test]
fn a_request_larger_than_the_whole_arena_is_out_of_memory() {
    let mut arena = Arena::new(1 << 10).unwrap();
    let result = arena.allocate(1 << 20);
    assert!(matches!(result, Err(BuddyError::OutOfMemory)));
}

#[test]
fn creating_an_arena_larger_than_the_representable_range_fails_cleanly() {
    let result = Arena::new(usize::MAX);
    assert!(matches!(result, Err(BuddyError::RequestTooLarge)));
}

#[test]
fn default_sized_arena_can_satisfy_a_moderate_allocation() {
    let mut arena = Arena::new(0).unwrap();
    let block = arena.allocate(4096).unwrap();
    arena.free(Some(block));
}

#[test]
fn destroy_consumes_the_arena_and_releases_its_region() {
    let arena = Arena::new(1 << 16).unwrap();
    arena.destroy();
}
