//! The OS collaborator: obtains and releases the arena's backing region.
//!
//! The OS is the one external collaborator this crate talks to: "give me a
//! pointer to N contiguous readable/writable bytes, release it later." This
//! is implemented over an anonymous, private `mmap`, adapted to return a
//! safe, `Drop`-releasing owned region instead of a raw `*mut c_void`.

use std::io;
use std::ptr::NonNull;

use crate::error::BuddyError;

/// An owned, anonymous memory mapping. Released on `Drop`.
pub(crate) struct MemoryRegion {
    ptr: NonNull<u8>,
    len: usize,
}

impl MemoryRegion {
    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl Drop for MemoryRegion {
    fn drop(&mut self) {
        let result = unsafe { libc::munmap(self.ptr.as_ptr() as *mut libc::c_void, self.len) };
        if result != 0 {
            log::warn!(
                "munmap of {} bytes at {:p} failed: {}",
                self.len,
                self.ptr.as_ptr(),
                io::Error::last_os_error()
            );
        }
    }
}

/// Requests `len` contiguous, zero-initialized, readable/writable bytes from
/// the OS. `len` must already be the arena's full `2^kval_m` size; this
/// function does no rounding of its own.
pub(crate) fn map(len: usize) -> Result<MemoryRegion, BuddyError> {
    let raw = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };

    if raw == libc::MAP_FAILED {
        return Err(BuddyError::MapFailed(io::Error::last_os_error()));
    }

    log::trace!("mapped {len} bytes at {raw:p}");

    let ptr = NonNull::new(raw as *mut u8).expect("mmap returned a null pointer without MAP_FAILED");
    Ok(MemoryRegion { ptr, len })
}
