//! The arena: owns the backing region, the sentinel free lists, and the
//! split/coalesce protocol.

use std::ptr::NonNull;

use crate::block::{Header, Link, Tag, HEADER_SIZE};
use crate::error::BuddyError;
use crate::os::{self, MemoryRegion};
use crate::size_class::{classify, DEFAULT_K, MAX_K};

/// A fixed-capacity arena sub-allocating a single `2^kval_m`-byte region
/// obtained from the OS collaborator.
///
/// Single-threaded and non-reentrant: every operation is a bounded-time,
/// straight-line traversal of at most `kval_m - SMALLEST_K` free-list
/// operations. Wrap an `Arena` in your own `Mutex` for shared access; this
/// crate does not provide one (thread safety is out of scope).
pub struct Arena {
    region: MemoryRegion,
    kval_m: u8,
    /// One sentinel per size class `0..MAX_K`. Class `k`'s sentinel always
    /// has `tag == Unused` and `kval == k`, and is never removed.
    sentinels: [Header; MAX_K as usize],
}

impl Arena {
    /// Creates a new arena of `requested_size` bytes, rounded up to the next
    /// representable size class. A `requested_size` of zero requests the
    /// default class ([`DEFAULT_K`]).
    pub fn new(requested_size: usize) -> Result<Arena, BuddyError> {
        let kval = if requested_size == 0 {
            DEFAULT_K
        } else {
            classify(requested_size)
        };

        if kval >= MAX_K {
            return Err(BuddyError::RequestTooLarge);
        }

        let region_len = 1usize << kval;
        let region = os::map(region_len)?;

        let mut sentinels = [Header {
            tag: Tag::Unused,
            kval: 0,
            next: Link::Sentinel(0),
            prev: Link::Sentinel(0),
        }; MAX_K as usize];
        for (k, sentinel) in sentinels.iter_mut().enumerate() {
            *sentinel = Header {
                tag: Tag::Unused,
                kval: k as u8,
                next: Link::Sentinel(k as u8),
                prev: Link::Sentinel(k as u8),
            };
        }

        let mut arena = Arena {
            region,
            kval_m: kval,
            sentinels,
        };

        let base_header = Header {
            tag: Tag::Avail,
            kval,
            next: Link::Sentinel(kval),
            prev: Link::Sentinel(kval),
        };
        unsafe { Header::write_at(arena.region.as_mut_ptr(), 0, base_header) };
        arena.sentinels[kval as usize].next = Link::Block(0);
        arena.sentinels[kval as usize].prev = Link::Block(0);

        log::debug!(
            "arena initialized: kval_m={kval} ({region_len} bytes)",
            kval = arena.kval_m
        );

        Ok(arena)
    }

    /// Releases the arena's backing region. Equivalent to dropping the
    /// arena; kept as an explicit, named operation for callers that want to
    /// force early release and for parity with the allocator's external
    /// interface.
    pub fn destroy(self) {}

    /// The size class of the whole arena (`M` in spec terms): the arena is
    /// `2^kval_m()` bytes.
    pub fn kval_m(&self) -> u8 {
        self.kval_m
    }

    /// Total number of bytes owned by this arena.
    pub fn size(&self) -> usize {
        self.region.len()
    }

    /// Finds the smallest free block of class `>= k`, splits it down to
    /// class `k`, and returns the payload pointer immediately following its
    /// header.
    pub fn allocate(&mut self, size_bytes: usize) -> Result<NonNull<u8>, BuddyError> {
        if size_bytes == 0 {
            return Err(BuddyError::OutOfMemory);
        }

        let total = size_bytes
            .checked_add(HEADER_SIZE)
            .ok_or(BuddyError::RequestTooLarge)?;
        let k = classify(total);
        if k > self.kval_m {
            return Err(BuddyError::OutOfMemory);
        }

        let mut j = k;
        let victim = loop {
            if j > self.kval_m {
                return Err(BuddyError::OutOfMemory);
            }
            let sentinel = self.get(Link::Sentinel(j));
            if sentinel.next != Link::Sentinel(j) {
                break sentinel.next;
            }
            j += 1;
        };
        self.detach(victim);

        let mut cur_k = j;
        let block_offset = match victim {
            Link::Block(off) => off,
            Link::Sentinel(_) => unreachable!("a free list head is never the sentinel itself"),
        };
        while cur_k > k {
            cur_k -= 1;
            let buddy_offset = block_offset + (1usize << cur_k);
            self.push_front(Link::Block(buddy_offset), Tag::Avail, cur_k);
        }

        let reserved = Header {
            tag: Tag::Reserved,
            kval: k,
            next: Link::Sentinel(k),
            prev: Link::Sentinel(k),
        };
        self.set(Link::Block(block_offset), reserved);

        log::trace!(
            "allocate: {size_bytes} bytes -> class {k} at offset {block_offset:#x}"
        );

        let ptr = unsafe { self.region.as_mut_ptr().add(block_offset + HEADER_SIZE) };
        Ok(NonNull::new(ptr).expect("an offset inside the mapped region is never null"))
    }

    /// Marks the block as available and merges it with its buddy while the
    /// buddy is free and of the same class. `ptr == None` is a no-op.
    pub fn free(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };

        let offset = self.offset_of_payload(ptr);
        let mut header = unsafe { Header::read_at(self.region.as_ptr(), offset) };
        header.tag = Tag::Avail;

        let mut cur_off = offset;
        let mut cur_k = header.kval;

        while cur_k < self.kval_m {
            let buddy_off = cur_off ^ (1usize << cur_k);
            if buddy_off >= self.region.len() {
                break;
            }
            let buddy = unsafe { Header::read_at(self.region.as_ptr(), buddy_off) };
            if buddy.tag != Tag::Avail || buddy.kval != cur_k {
                break;
            }
            self.detach(Link::Block(buddy_off));
            if buddy_off < cur_off {
                cur_off = buddy_off;
            }
            cur_k += 1;
        }

        log::trace!("free: merged to class {cur_k} at offset {cur_off:#x}");
        self.push_front(Link::Block(cur_off), Tag::Avail, cur_k);
    }

    /// Resizes the block at `ptr` to `size_bytes`.
    ///
    /// - `ptr == None` behaves like [`Arena::allocate`].
    /// - `size_bytes == 0` frees `ptr` and returns `Ok(None)`.
    /// - If the request still fits the block's current class, the same
    ///   pointer is returned unchanged — no in-place shrink is performed.
    /// - Otherwise a new block is allocated, the old payload is copied over,
    ///   and the old block is freed.
    pub fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        size_bytes: usize,
    ) -> Result<Option<NonNull<u8>>, BuddyError> {
        let Some(ptr) = ptr else {
            return self.allocate(size_bytes).map(Some);
        };

        if size_bytes == 0 {
            self.free(Some(ptr));
            return Ok(None);
        }

        let offset = self.offset_of_payload(ptr);
        let old_header = unsafe { Header::read_at(self.region.as_ptr(), offset) };
        let old_k = old_header.kval;

        let total = size_bytes
            .checked_add(HEADER_SIZE)
            .ok_or(BuddyError::RequestTooLarge)?;
        let new_k = classify(total);
        if new_k <= old_k {
            return Ok(Some(ptr));
        }

        let new_ptr = self.allocate(size_bytes)?;
        let copy_len = (1usize << old_k) - HEADER_SIZE;
        unsafe {
            std::ptr::copy_nonoverlapping(ptr.as_ptr(), new_ptr.as_ptr(), copy_len);
        }
        self.free(Some(ptr));
        Ok(Some(new_ptr))
    }

    /// Recovers the header offset for a payload pointer previously returned
    /// by this arena. Passing a foreign pointer is undefined behavior, as
    /// documented on the public API.
    fn offset_of_payload(&self, ptr: NonNull<u8>) -> usize {
        let base = self.region.as_ptr() as usize;
        (ptr.as_ptr() as usize) - base - HEADER_SIZE
    }

    fn get(&self, link: Link) -> Header {
        match link {
            Link::Sentinel(k) => self.sentinels[k as usize],
            Link::Block(off) => unsafe { Header::read_at(self.region.as_ptr(), off) },
        }
    }

    fn set(&mut self, link: Link, header: Header) {
        match link {
            Link::Sentinel(k) => self.sentinels[k as usize] = header,
            Link::Block(off) => unsafe { Header::write_at(self.region.as_mut_ptr(), off, header) },
        }
    }

    /// Unsplices `link` from whatever free list it currently sits on.
    fn detach(&mut self, link: Link) {
        let node = self.get(link);

        let mut prev = self.get(node.prev);
        prev.next = node.next;
        self.set(node.prev, prev);

        let mut next = self.get(node.next);
        next.prev = node.prev;
        self.set(node.next, next);
    }

    /// Splices `link` at the head of sentinel `kval`'s free list, writing
    /// its full header (`tag`, `kval`) in the process.
    fn push_front(&mut self, link: Link, tag: Tag, kval: u8) {
        let sentinel_link = Link::Sentinel(kval);
        let mut sentinel = self.get(sentinel_link);
        let old_head = sentinel.next;

        let node = Header {
            tag,
            kval,
            next: old_head,
            prev: sentinel_link,
        };
        self.set(link, node);

        let mut old_head_node = self.get(old_head);
        old_head_node.prev = link;
        self.set(old_head, old_head_node);

        sentinel.next = link;
        self.set(sentinel_link, sentinel);
    }
}
