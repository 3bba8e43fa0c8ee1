//! # wrapcache
//!
//! Per-object cache for the wrapper a foreign runtime creates to represent a
//! native object.
//!
//! ## Design
//!
//! - **One word**: the wrapper address and a "preserved" flag share a single
//!   pointer-sized word, the flag living in the address's always-clear low bit
//! - **Weak by default**: attaching a wrapper takes no reference; the foreign
//!   runtime owns it
//! - **Preservation**: the owner can pin the wrapper with one strong reference
//!   held by the slot, released on `unpreserve`, `detach` or drop
//! - **Tracing**: only a preserved wrapper is reported to a cycle collector
//!
//! ```
//! use std::rc::Rc;
//! use wrapcache::{SlotState, WrapperSlot};
//!
//! let wrapper = Rc::new("reflector");
//! let mut slot = WrapperSlot::new();
//!
//! // SAFETY: `wrapper` outlives the slot
//! unsafe { slot.attach(&wrapper) };
//! slot.preserve();
//! assert_eq!(Rc::strong_count(&wrapper), 2);
//! assert_eq!(slot.state(), SlotState::Preserved);
//!
//! slot.unpreserve();
//! assert_eq!(Rc::strong_count(&wrapper), 1);
//! ```

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod cache;
pub mod error;
pub mod handle;
pub mod packed;
pub mod slot;
pub mod trace;

pub use cache::CachesWrapper;
pub use error::SlotError;
pub use handle::WrapperRef;
pub use packed::PackedWord;
pub use slot::{SlotState, WrapperSlot};
pub use trace::{EdgeVisitor, WRAPPER_EDGE};
