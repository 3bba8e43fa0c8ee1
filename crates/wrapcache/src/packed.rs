//! Packed wrapper word
//!
//! One pointer-sized word holds the wrapper address and the preserved flag.
//! Wrapper addresses are at least 2-aligned, so bit 0 of a valid address is
//! always clear and can carry the flag. A null address means "absent".

use std::fmt;
use std::ptr::{self, NonNull};

/// Flag bit: the slot holds one strong reference to the wrapper
pub const PRESERVED_BIT: usize = 1 << 0;

/// Mask applied to the word to recover the wrapper address
pub const POINTER_MASK: usize = !PRESERVED_BIT;

/// A wrapper pointer with the preserved flag stored in its low bit.
///
/// The word is kept as a raw pointer and tagged through the address APIs, so
/// the flag never strips the pointer's provenance.
#[repr(transparent)]
pub struct PackedWord<T> {
    ptr: *mut T,
}

impl<T> PackedWord<T> {
    /// An absent word (all bits zero)
    pub const fn absent() -> Self {
        Self {
            ptr: ptr::null_mut(),
        }
    }

    /// Whether `ptr` leaves the flag bit free
    #[inline]
    pub fn is_taggable(ptr: NonNull<T>) -> bool {
        ptr.as_ptr().addr() & PRESERVED_BIT == 0
    }

    /// Word holding `ptr` with the flag clear.
    ///
    /// `ptr` must be [taggable](Self::is_taggable). An odd address panics in
    /// debug builds; in release builds its low bit is masked off and the word
    /// holds a different pointer. Check first, as
    /// [`WrapperSlot::try_attach`](crate::WrapperSlot::try_attach) does.
    #[inline]
    pub fn with_pointer(ptr: NonNull<T>) -> Self {
        debug_assert!(
            Self::is_taggable(ptr),
            "wrapper address {:#x} has the preserved bit set",
            ptr.as_ptr().addr()
        );
        Self {
            ptr: ptr.as_ptr().map_addr(|addr| addr & POINTER_MASK),
        }
    }

    /// Wrapper address with the flag masked off, `None` when absent
    #[inline]
    pub fn read(&self) -> Option<NonNull<T>> {
        NonNull::new(self.ptr.map_addr(|addr| addr & POINTER_MASK))
    }

    /// Store a raw tagged value
    #[inline]
    pub fn write(&mut self, raw: *mut T) {
        self.ptr = raw;
    }

    /// Raw tagged value as stored
    #[inline]
    pub fn raw(&self) -> *mut T {
        self.ptr
    }

    /// The word as an integer, flag included
    #[inline]
    pub fn bits(&self) -> usize {
        self.ptr.addr()
    }

    /// No wrapper stored
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.bits() == 0
    }

    /// Preserved flag
    #[inline]
    pub fn is_preserved(&self) -> bool {
        self.bits() & PRESERVED_BIT != 0
    }

    /// Set or clear the preserved flag, leaving the address untouched
    #[inline]
    pub fn set_preserved(&mut self, preserved: bool) {
        self.ptr = if preserved {
            self.ptr.map_addr(|addr| addr | PRESERVED_BIT)
        } else {
            self.ptr.map_addr(|addr| addr & POINTER_MASK)
        };
    }

    /// Reset to absent
    #[inline]
    pub fn clear(&mut self) {
        self.ptr = ptr::null_mut();
    }
}

impl<T> Default for PackedWord<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> fmt::Debug for PackedWord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedWord")
            .field("addr", &format_args!("{:#x}", self.bits() & POINTER_MASK))
            .field("preserved", &self.is_preserved())
            .finish()
    }
}
