//! Reference-counting capability for cached wrappers
//!
//! The slot never owns a wrapper through a Rust handle. It keeps the address
//! and, while preserving, one count on the wrapper's own reference counter.
//! `WrapperRef` is the seam between the two: it names the pointee type and
//! the increment/decrement pair the slot drives.

use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::Arc;

/// A strong handle type whose reference count can be adjusted through the
/// wrapper's address alone.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - `as_ptr` returns the address `retain` and `release` accept, and that
///   address is stable for the life of the wrapper;
/// - `retain` adds exactly one strong reference and `release` removes exactly
///   one, destroying the wrapper when the count reaches zero.
pub unsafe trait WrapperRef {
    /// The wrapper object the handle points to
    type Target;

    /// Address of the wrapper, used as its identity
    fn as_ptr(this: &Self) -> NonNull<Self::Target>;

    /// Add one strong reference.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `as_ptr` and the wrapper must be alive.
    unsafe fn retain(ptr: NonNull<Self::Target>);

    /// Drop one strong reference, possibly destroying the wrapper.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `as_ptr` and the caller must own the reference
    /// being released, i.e. one previously taken with `retain`.
    unsafe fn release(ptr: NonNull<Self::Target>);
}

// SAFETY: `Rc::as_ptr` is the pointer `Rc::into_raw` would hand out, which is
// what the strong-count functions expect.
unsafe impl<T> WrapperRef for Rc<T> {
    type Target = T;

    fn as_ptr(this: &Self) -> NonNull<T> {
        // SAFETY: `Rc` allocations are never null
        unsafe { NonNull::new_unchecked(Rc::as_ptr(this).cast_mut()) }
    }

    unsafe fn retain(ptr: NonNull<T>) {
        // SAFETY: forwarded from the caller
        unsafe { Rc::increment_strong_count(ptr.as_ptr()) }
    }

    unsafe fn release(ptr: NonNull<T>) {
        // SAFETY: forwarded from the caller
        unsafe { Rc::decrement_strong_count(ptr.as_ptr()) }
    }
}

// SAFETY: same reasoning as for `Rc`.
unsafe impl<T> WrapperRef for Arc<T> {
    type Target = T;

    fn as_ptr(this: &Self) -> NonNull<T> {
        // SAFETY: `Arc` allocations are never null
        unsafe { NonNull::new_unchecked(Arc::as_ptr(this).cast_mut()) }
    }

    unsafe fn retain(ptr: NonNull<T>) {
        // SAFETY: forwarded from the caller
        unsafe { Arc::increment_strong_count(ptr.as_ptr()) }
    }

    unsafe fn release(ptr: NonNull<T>) {
        // SAFETY: forwarded from the caller
        unsafe { Arc::decrement_strong_count(ptr.as_ptr()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rc_retain_release() {
        let rc = Rc::new(7u32);
        let ptr = WrapperRef::as_ptr(&rc);
        assert_eq!(ptr.as_ptr().cast_const(), Rc::as_ptr(&rc));

        unsafe { <Rc<u32> as WrapperRef>::retain(ptr) };
        assert_eq!(Rc::strong_count(&rc), 2);

        unsafe { <Rc<u32> as WrapperRef>::release(ptr) };
        assert_eq!(Rc::strong_count(&rc), 1);
    }

    #[test]
    fn test_arc_retain_release() {
        let arc = Arc::new(String::from("wrapper"));
        let ptr = WrapperRef::as_ptr(&arc);

        unsafe { <Arc<String> as WrapperRef>::retain(ptr) };
        assert_eq!(Arc::strong_count(&arc), 2);

        unsafe { <Arc<String> as WrapperRef>::release(ptr) };
        assert_eq!(Arc::strong_count(&arc), 1);
    }

    #[test]
    fn test_release_last_reference_destroys() {
        let rc = Rc::new(());
        let weak = Rc::downgrade(&rc);
        let ptr = WrapperRef::as_ptr(&rc);

        // Hand the only count over to the raw pointer.
        std::mem::forget(rc);
        unsafe { <Rc<()> as WrapperRef>::release(ptr) };
        assert!(weak.upgrade().is_none());
    }
}
