//! Model checks for random slot operation sequences

use proptest::prelude::*;
use std::ptr::NonNull;
use std::rc::Rc;
use wrapcache::{SlotState, WrapperRef, WrapperSlot};

#[derive(Debug, Clone, Copy)]
enum Op {
    /// Attach wrapper `n` if the slot is empty
    Attach(usize),
    Detach,
    Preserve,
    Unpreserve,
    Trace,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..3).prop_map(Op::Attach),
        Just(Op::Detach),
        Just(Op::Preserve),
        Just(Op::Unpreserve),
        Just(Op::Trace),
    ]
}

proptest! {
    #[test]
    fn prop_slot_matches_model(ops in prop::collection::vec(op(), 0..64)) {
        let wrappers: Vec<Rc<u64>> = (0..3).map(|i| Rc::new(i as u64)).collect();
        let mut slot = WrapperSlot::<Rc<u64>>::new();

        // Model: which wrapper is attached, and whether the slot preserves it
        let mut attached: Option<usize> = None;
        let mut preserved = false;

        for op in ops {
            match op {
                Op::Attach(n) => {
                    if attached.is_none() {
                        unsafe { slot.attach(&wrappers[n]) };
                        attached = Some(n);
                    }
                }
                Op::Detach => {
                    slot.detach();
                    attached = None;
                    preserved = false;
                }
                Op::Preserve => {
                    if attached.is_some() {
                        slot.preserve();
                        preserved = true;
                    }
                }
                Op::Unpreserve => {
                    slot.unpreserve();
                    preserved = false;
                }
                Op::Trace => {
                    let mut edges = 0;
                    slot.trace_edge(&mut |_: &'static str, _: NonNull<u64>| edges += 1);
                    prop_assert_eq!(edges, usize::from(preserved));
                }
            }

            let expected = attached.map(|n| WrapperRef::as_ptr(&wrappers[n]));
            prop_assert_eq!(slot.get_wrapper(), expected);
            prop_assert_eq!(slot.is_preserving(), preserved);

            let state = match (attached, preserved) {
                (None, _) => SlotState::Absent,
                (Some(_), false) => SlotState::Unpreserved,
                (Some(_), true) => SlotState::Preserved,
            };
            prop_assert_eq!(slot.state(), state);

            // Only the preserved wrapper carries the slot's extra reference
            for (i, wrapper) in wrappers.iter().enumerate() {
                let extra = usize::from(preserved && attached == Some(i));
                prop_assert_eq!(Rc::strong_count(wrapper), 1 + extra);
            }
        }

        drop(slot);
        for wrapper in &wrappers {
            prop_assert_eq!(Rc::strong_count(wrapper), 1);
        }
    }

    #[test]
    fn prop_repeated_preserve_is_one_reference(times in 1usize..8) {
        let wrapper = Rc::new(());
        let mut slot = WrapperSlot::new();
        unsafe { slot.attach(&wrapper) };

        for _ in 0..times {
            slot.preserve();
        }
        prop_assert_eq!(Rc::strong_count(&wrapper), 2);

        for _ in 0..times {
            slot.unpreserve();
        }
        prop_assert_eq!(Rc::strong_count(&wrapper), 1);
        prop_assert_eq!(slot.get_wrapper(), Some(WrapperRef::as_ptr(&wrapper)));
    }
}
