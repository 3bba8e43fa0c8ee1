//! Capability query for objects that cache their wrapper

use crate::handle::WrapperRef;
use crate::slot::WrapperSlot;
use crate::trace::EdgeVisitor;
use std::ptr::NonNull;

/// Implemented by native objects that embed a [`WrapperSlot`].
///
/// Lets binding code find the cached wrapper of any such object without
/// knowing its concrete type.
pub trait CachesWrapper {
    /// Handle type of the wrapper
    type Wrapper: WrapperRef;

    /// The embedded slot
    fn wrapper_cache(&self) -> &WrapperSlot<Self::Wrapper>;

    /// The embedded slot, mutably
    fn wrapper_cache_mut(&mut self) -> &mut WrapperSlot<Self::Wrapper>;

    /// The cached wrapper, if one is attached
    fn cached_wrapper(&self) -> Option<NonNull<<Self::Wrapper as WrapperRef>::Target>> {
        self.wrapper_cache().get_wrapper()
    }

    /// The cached wrapper as an untyped handle
    fn opaque_wrapper(&self) -> Option<NonNull<()>> {
        self.cached_wrapper().map(NonNull::cast)
    }

    /// Report the wrapper edge from this object's own trace routine
    fn trace_wrapper(&self, visitor: &mut dyn EdgeVisitor<<Self::Wrapper as WrapperRef>::Target>) {
        self.wrapper_cache().trace_edge(visitor);
    }
}
