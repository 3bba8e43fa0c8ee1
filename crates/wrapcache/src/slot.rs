//! Wrapper slot state machine
//!
//! A native object embeds one `WrapperSlot` to remember the wrapper a foreign
//! runtime created for it. The slot is a weak observer by default: attaching
//! takes no reference. `preserve` pins the wrapper with one strong reference
//! of the slot's own, `unpreserve`, `detach` and drop give it back.
//!
//! ```text
//!            attach               preserve
//!   Absent ---------> Unpreserved ---------> Preserved
//!     ^                 |    ^                  |
//!     |     detach      |    |   unpreserve     |
//!     +-----------------+    +------------------+
//!     ^                                         |
//!     +-------------- detach / drop ------------+
//! ```

use crate::error::SlotError;
use crate::handle::WrapperRef;
use crate::packed::PackedWord;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// State of a wrapper slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No wrapper cached
    Absent,
    /// Wrapper cached, owned by the foreign runtime only
    Unpreserved,
    /// Wrapper cached and held alive by the slot
    Preserved,
}

/// Single-entry cache for the wrapper of one native object.
///
/// Occupies one pointer-sized word. Access is single-threaded: the slot is
/// neither `Send` nor `Sync`.
pub struct WrapperSlot<R: WrapperRef> {
    word: PackedWord<R::Target>,
    _handle: PhantomData<R>,
}

impl<R: WrapperRef> WrapperSlot<R> {
    /// Create an empty slot
    pub const fn new() -> Self {
        Self {
            word: PackedWord::absent(),
            _handle: PhantomData,
        }
    }

    /// Current state
    pub fn state(&self) -> SlotState {
        if self.word.is_absent() {
            SlotState::Absent
        } else if self.word.is_preserved() {
            SlotState::Preserved
        } else {
            SlotState::Unpreserved
        }
    }

    /// Cached wrapper address, `None` if no wrapper is attached
    #[inline]
    pub fn get_wrapper(&self) -> Option<NonNull<R::Target>> {
        self.word.read()
    }

    /// Whether the slot currently holds a strong reference to the wrapper
    #[inline]
    pub fn is_preserving(&self) -> bool {
        self.word.is_preserved()
    }

    /// Borrow the wrapper while the slot keeps it alive
    pub fn preserved_wrapper(&self) -> Option<&R::Target> {
        if !self.is_preserving() {
            return None;
        }
        // SAFETY: the slot owns a strong reference, and `&self` keeps
        // `unpreserve`/`detach` from dropping it while the borrow lives.
        self.word.read().map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Cache `wrapper` without taking a reference to it.
    ///
    /// The slot must be absent. Attaching over a cached wrapper is a contract
    /// violation: it panics in debug builds and overwrites the slot in release
    /// builds, losing any reference the slot held.
    ///
    /// # Safety
    ///
    /// The wrapper must stay alive while it is attached and unpreserved: its
    /// owner has to `detach` this slot before destroying it.
    pub unsafe fn attach(&mut self, wrapper: &R) {
        debug_assert!(
            self.word.is_absent(),
            "already have a wrapper at {:#x}",
            self.word.bits()
        );
        let ptr = R::as_ptr(wrapper);
        self.word = PackedWord::with_pointer(ptr);

        #[cfg(feature = "slot_logging")]
        tracing::trace!(
            target: "wrapcache::slot",
            addr = ptr.as_ptr().addr(),
            "wrapper attached"
        );
    }

    /// Checked [`attach`](Self::attach): refuses to overwrite a cached wrapper
    /// or to store an address that would collide with the flag bit.
    ///
    /// # Safety
    ///
    /// Same contract as [`attach`](Self::attach).
    pub unsafe fn try_attach(&mut self, wrapper: &R) -> Result<(), SlotError> {
        if let Some(current) = self.word.read() {
            #[cfg(feature = "slot_logging")]
            tracing::warn!(
                target: "wrapcache::slot",
                addr = current.as_ptr().addr(),
                "attach refused: wrapper already cached"
            );
            return Err(SlotError::AlreadyAttached {
                addr: current.as_ptr().addr(),
            });
        }

        let ptr = R::as_ptr(wrapper);
        if !PackedWord::is_taggable(ptr) {
            return Err(SlotError::Misaligned {
                addr: ptr.as_ptr().addr(),
            });
        }

        // SAFETY: forwarded from the caller; the slot is absent
        unsafe { self.attach(wrapper) };
        Ok(())
    }

    /// Forget the cached wrapper, releasing the slot's reference if it held
    /// one. Does nothing when already absent.
    pub fn detach(&mut self) {
        let was_preserved = self.word.is_preserved();
        let wrapper = self.word.read();
        self.word.clear();

        #[cfg(feature = "slot_logging")]
        if let Some(ptr) = wrapper {
            tracing::trace!(
                target: "wrapcache::slot",
                addr = ptr.as_ptr().addr(),
                was_preserved,
                "wrapper detached"
            );
        }

        if let Some(ptr) = wrapper.filter(|_| was_preserved) {
            // SAFETY: this reference was taken by `preserve`
            unsafe { R::release(ptr) };
        }
    }

    /// Hold the wrapper alive with one strong reference. Idempotent.
    ///
    /// Preserving an absent slot is a contract violation: it panics in debug
    /// builds and does nothing in release builds.
    pub fn preserve(&mut self) {
        debug_assert!(!self.word.is_absent(), "no wrapper to preserve");
        if self.word.is_preserved() {
            return;
        }
        let Some(ptr) = self.word.read() else {
            return;
        };

        // SAFETY: an attached, unpreserved wrapper is alive per the
        // `attach` contract
        unsafe { R::retain(ptr) };
        self.word.set_preserved(true);

        #[cfg(feature = "slot_logging")]
        tracing::trace!(
            target: "wrapcache::slot",
            addr = ptr.as_ptr().addr(),
            "wrapper preserved"
        );
    }

    /// Checked [`preserve`](Self::preserve): reports an absent slot instead
    /// of asserting.
    pub fn try_preserve(&mut self) -> Result<(), SlotError> {
        if self.word.is_absent() {
            #[cfg(feature = "slot_logging")]
            tracing::warn!(target: "wrapcache::slot", "preserve refused: no wrapper");
            return Err(SlotError::NoWrapper);
        }
        self.preserve();
        Ok(())
    }

    /// Give back the slot's strong reference, keeping the wrapper cached.
    /// Does nothing unless preserving.
    pub fn unpreserve(&mut self) {
        if !self.word.is_preserved() {
            return;
        }
        let Some(ptr) = self.word.read() else {
            return;
        };
        self.word.set_preserved(false);

        #[cfg(feature = "slot_logging")]
        tracing::trace!(
            target: "wrapcache::slot",
            addr = ptr.as_ptr().addr(),
            "wrapper unpreserved"
        );

        // SAFETY: this reference was taken by `preserve`
        unsafe { R::release(ptr) };
    }
}

impl<R: WrapperRef> Default for WrapperSlot<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: WrapperRef> Drop for WrapperSlot<R> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<R: WrapperRef> fmt::Debug for WrapperSlot<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapperSlot")
            .field("state", &self.state())
            .field("wrapper", &self.get_wrapper())
            .finish()
    }
}
