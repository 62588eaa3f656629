//! A fixed-capacity binary buddy memory allocator over a single `mmap`'d
//! arena.
//!
//! An [`Arena`] reserves `2^k` bytes up front and services `allocate`/
//! `free`/`reallocate` requests by splitting and coalescing power-of-two
//! blocks, tracked with one intrusive free list per size class. Internal
//! fragmentation is bounded to 2x: a request is always rounded up to the
//! next block size, never more.
//!
//! This crate is single-threaded, does not implement [`std::alloc::GlobalAlloc`],
//! and never grows an arena past its initial capacity — wrap it yourself if
//! your use case needs any of those.
//!
//! ```
//! use buddy_arena::Arena;
//!
//! let mut arena = Arena::new(1 << 20).unwrap();
//! let block = arena.allocate(128).unwrap();
//! arena.free(Some(block));
//! ```

mod arena;
mod block;
mod error;
mod os;
mod size_class;

pub use arena::Arena;
pub use error::BuddyError;
pub use size_class::{classify, DEFAULT_K, MAX_K, SMALLEST_K};
