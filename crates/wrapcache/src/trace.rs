//! Cycle-collector tracing hook
//!
//! A preserved wrapper is an owned edge from the native object to the wrapper,
//! and a cycle collector has to see it. An unpreserved wrapper is not kept
//! alive by the slot, so it is not reported, the same way a weak reference
//! cell does not trace its target.

use crate::handle::WrapperRef;
use crate::slot::WrapperSlot;
use std::ptr::NonNull;

/// Edge name reported for a preserved wrapper
pub const WRAPPER_EDGE: &str = "wrapper";

/// Receiver for the outgoing edges of a traced object
pub trait EdgeVisitor<T> {
    /// Record an edge named `name` from the object being traced to `target`
    fn visit(&mut self, name: &'static str, target: NonNull<T>);
}

impl<T, F> EdgeVisitor<T> for F
where
    F: FnMut(&'static str, NonNull<T>) + ?Sized,
{
    fn visit(&mut self, name: &'static str, target: NonNull<T>) {
        self(name, target)
    }
}

impl<R: WrapperRef> WrapperSlot<R> {
    /// Report the wrapper edge to `visitor` if the slot is preserving.
    pub fn trace_edge<V>(&self, visitor: &mut V)
    where
        V: EdgeVisitor<R::Target> + ?Sized,
    {
        self.trace_edge_named(visitor, WRAPPER_EDGE);
    }

    /// Like [`trace_edge`](Self::trace_edge) with a caller-chosen edge name,
    /// for owners with several slots.
    pub fn trace_edge_named<V>(&self, visitor: &mut V, name: &'static str)
    where
        V: EdgeVisitor<R::Target> + ?Sized,
    {
        if !self.is_preserving() {
            return;
        }
        if let Some(wrapper) = self.get_wrapper() {
            visitor.visit(name, wrapper);
        }
    }
}
