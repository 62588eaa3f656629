//! Error type for every fallible [`crate::Arena`] operation.

use thiserror::Error;

/// Everything that can go wrong when creating, growing, or allocating from
/// an [`crate::Arena`].
///
/// Every variant maps to the `OUT_OF_MEMORY` condition described in the
/// allocator's error-handling design: the caller always gets a typed
/// `Result` back rather than a process-wide indicator, since that is the
/// idiomatic contract for a `std`-available Rust library.
#[derive(Debug, Error)]
pub enum BuddyError {
    /// No free block of a sufficient size class was available, or the
    /// arena has no block large enough to ever satisfy the request.
    #[error("no free block of sufficient class is available")]
    OutOfMemory,

    /// The requested size, once classified, exceeds the arena's
    /// representable range (`classify` saturated at `MAX_K`).
    #[error("requested size exceeds the arena's representable range")]
    RequestTooLarge,

    /// The operating-system collaborator refused to map the backing region.
    #[error("failed to map backing memory from the operating system")]
    MapFailed(#[source] std::io::Error),
}
