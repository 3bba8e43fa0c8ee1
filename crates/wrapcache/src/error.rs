//! Slot error types

use thiserror::Error;

/// Contract violations reported by the checked slot operations.
///
/// The unchecked operations (`attach`, `preserve`) treat these as programmer
/// errors and only assert in debug builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    /// A wrapper is already cached; the slot is never overwritten
    #[error("slot already caches a wrapper at {addr:#x}")]
    AlreadyAttached {
        /// Address of the wrapper currently cached
        addr: usize,
    },

    /// Preservation was requested with no wrapper attached
    #[error("no wrapper to preserve")]
    NoWrapper,

    /// The wrapper address has its low bit set and cannot be tagged
    #[error("wrapper address {addr:#x} collides with the preserved bit")]
    Misaligned {
        /// The rejected address
        addr: usize,
    },
}
