//! Integration tests for the `opaque_value` package.
//!
//! These exercise the public API end to end: round trips for inline and boxed types, copy and
//! move semantics, swapping in every combination of empty and full containers, and cast failures.

#![allow(
    clippy::arithmetic_side_effects,
    clippy::indexing_slicing,
    clippy::unwrap_used,
    reason = "tests focus on succinct code and do not need to tick all the boxes"
)]

use std::cell::Cell;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt::Debug;
use std::ptr;
use std::rc::Rc;

use opaque_value::{
    BadCast, OpaqueValue, Placement, TypeInfo, cast, cast_into, cast_mut, cast_ref, downcast_mut,
    downcast_ref, swap,
};

#[derive(Clone, Debug, Eq, PartialEq)]
struct Large {
    id: u32,
    payload: [u64; 16],
    label: String,
}

impl Large {
    fn new(id: u32) -> Self {
        Self {
            id,
            payload: [u64::from(id); 16],
            label: format!("large-{id}"),
        }
    }
}

/// Builds one container per interesting shape: empty, inline and boxed.
fn samples() -> Vec<OpaqueValue> {
    vec![
        OpaqueValue::new(),
        OpaqueValue::from_value(7_u8),
        OpaqueValue::from_value(Rc::new(5_i32)),
        OpaqueValue::from_value(String::from("text")),
        OpaqueValue::from_value(Large::new(3)),
    ]
}

/// A comparable description of what a container holds.
fn describe(value: &OpaqueValue) -> (TypeInfo, Option<String>) {
    let rendered = if let Some(v) = value.downcast_ref::<u8>() {
        Some(v.to_string())
    } else if let Some(v) = value.downcast_ref::<Rc<i32>>() {
        Some(v.to_string())
    } else if let Some(v) = value.downcast_ref::<String>() {
        Some(v.clone())
    } else {
        value.downcast_ref::<Large>().map(|v| v.label.clone())
    };

    (value.type_info(), rendered)
}

#[test]
fn integer_scenario() {
    let value = OpaqueValue::from_value(42_i32);

    assert_eq!(value.type_info(), TypeInfo::of::<i32>());
    assert_eq!(cast::<i32>(&value).unwrap(), 42);
    assert_eq!(downcast_ref::<f64>(Some(&value)), None);
    assert!(cast::<f64>(&value).is_err());
}

#[test]
fn round_trip_for_many_types() {
    fn check<T: Clone + PartialEq + Debug + 'static>(original: T) {
        let value = OpaqueValue::from_value(original.clone());
        assert_eq!(cast::<T>(&value).unwrap(), original);
        assert_eq!(value.placement(), Some(Placement::of::<T>()));
    }

    check(());
    check(true);
    check('q');
    check(-1_i8);
    check(u64::MAX);
    check(1.25_f32);
    check(PI);
    check("static str");
    check(String::from("owned"));
    check(vec![1_u16, 2, 3]);
    check(Some(Box::new(9_u32)));
    check((1_u8, 2_u16, 3_u32));
    check(Large::new(11));
    check(HashMap::from([(1, "one"), (2, "two")]));
}

#[test]
fn large_struct_uses_boxed_placement() {
    let mut source = OpaqueValue::from_value(Large::new(1));
    assert_eq!(source.placement(), Some(Placement::Boxed));

    let address_before = ptr::from_ref(source.downcast_ref::<Large>().unwrap());

    let target = source.take();
    assert!(!source.has_value());

    // The heap allocation is handed over, not copied.
    let address_after = ptr::from_ref(target.downcast_ref::<Large>().unwrap());
    assert_eq!(address_before, address_after);

    assert_eq!(cast::<Large>(&target).unwrap(), Large::new(1));
}

#[test]
fn small_value_uses_inline_placement() {
    let value = OpaqueValue::from_value(0xAB_u16);
    assert_eq!(value.placement(), Some(Placement::Inline));

    let container_start = ptr::from_ref(&value).addr();
    let container_end = container_start + size_of::<OpaqueValue>();
    let value_address = ptr::from_ref(value.downcast_ref::<u16>().unwrap()).addr();

    assert!(value_address >= container_start && value_address < container_end);
}

#[test]
fn reset_clears_every_sample() {
    for mut value in samples() {
        value.reset();

        assert!(!value.has_value());
        assert_eq!(value.type_info(), TypeInfo::none());
    }
}

#[test]
fn clone_matches_original_for_every_sample() {
    for value in samples() {
        let copy = value.clone();

        assert_eq!(describe(&copy), describe(&value));
        assert_eq!(copy.placement(), value.placement());
    }
}

#[test]
fn clone_is_independent_of_original() {
    let original = OpaqueValue::from_value(Large::new(2));
    let mut copy = original.clone();

    cast_mut::<Large>(&mut copy).unwrap().label.push_str("-edited");

    assert_eq!(cast_ref::<Large>(&original).unwrap().label, "large-2");
    assert_eq!(cast_ref::<Large>(&copy).unwrap().label, "large-2-edited");
}

#[test]
fn move_leaves_source_empty_for_every_sample() {
    for mut value in samples() {
        let before = describe(&value);

        let moved = value.take();

        assert_eq!(describe(&moved), before);
        assert!(!value.has_value());
    }
}

#[test]
fn swap_is_its_own_inverse_for_every_combination() {
    let count = samples().len();

    for i in 0..count {
        for j in 0..count {
            let mut a = samples().swap_remove(i);
            let mut b = samples().swap_remove(j);

            let a_before = describe(&a);
            let b_before = describe(&b);

            swap(&mut a, &mut b);
            assert_eq!(describe(&a), b_before);
            assert_eq!(describe(&b), a_before);

            swap(&mut a, &mut b);
            assert_eq!(describe(&a), a_before);
            assert_eq!(describe(&b), b_before);
        }
    }
}

#[test]
fn swap_different_types() {
    let mut a = OpaqueValue::from_value(10_u64);
    let mut b = OpaqueValue::from_value(Large::new(4));

    a.swap(&mut b);

    assert_eq!(a.type_info(), TypeInfo::of::<Large>());
    assert_eq!(b.type_info(), TypeInfo::of::<u64>());
    assert_eq!(cast::<Large>(&a).unwrap(), Large::new(4));
    assert_eq!(cast::<u64>(&b).unwrap(), 10);
}

#[test]
fn mismatch_and_empty_fail_the_same_way() {
    let full = OpaqueValue::from_value(String::from("s"));
    let empty = OpaqueValue::new();

    for value in [&full, &empty] {
        assert_eq!(downcast_ref::<u32>(Some(value)), None);

        let error: BadCast = cast::<u32>(value).unwrap_err();
        assert_eq!(error.requested(), TypeInfo::of::<u32>());
        assert_eq!(error.stored(), value.type_info());
    }

    assert!(cast_into::<u32>(full).is_err());
    assert!(cast_into::<u32>(empty).is_err());
}

#[test]
fn containers_passed_as_values_are_not_nested() {
    let source = OpaqueValue::from_value(42_i32);

    let outer = OpaqueValue::from_value(source.clone());
    assert!(outer.is::<i32>());
    assert_eq!(cast::<i32>(&outer).unwrap(), 42);

    let mut target = OpaqueValue::from_value(Large::new(8));
    target.set(source);
    assert_eq!(target.type_info(), TypeInfo::of::<i32>());
    assert_eq!(cast::<i32>(&target).unwrap(), 42);
    assert!(cast::<OpaqueValue>(&target).is_err());
}

#[test]
fn no_coercion_between_layout_compatible_types() {
    let value = OpaqueValue::from_value(1_u32);

    assert_eq!(downcast_ref::<i32>(Some(&value)), None);
    assert_eq!(downcast_ref::<f32>(Some(&value)), None);
    assert_eq!(downcast_ref::<[u8; 4]>(Some(&value)), None);
}

#[test]
fn values_are_dropped_exactly_once() {
    #[derive(Clone)]
    struct Tracked {
        _padding: [u64; 4],
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));

    {
        let mut a = OpaqueValue::from_value(Tracked {
            _padding: [0; 4],
            drops: Rc::clone(&drops),
        });
        let mut b = a.clone();
        let mut c = OpaqueValue::new();

        a.swap(&mut c);
        b.assign(&mut c);
        assert_eq!(drops.get(), 1);

        let d = b.take();
        drop(b);
        assert_eq!(drops.get(), 1);

        drop(d);
        assert_eq!(drops.get(), 2);
    }

    assert_eq!(drops.get(), 2);
}

#[test]
fn emplace_returns_reference_into_container() {
    let mut value = OpaqueValue::from_value(String::from("old"));

    let list = value.emplace_with(Vec::<u32>::new);
    list.extend([1, 2, 3]);

    assert_eq!(cast_ref::<Vec<u32>>(&value).unwrap(), &[1, 2, 3]);

    *downcast_mut::<Vec<u32>>(Some(&mut value)).unwrap() = vec![4];
    assert_eq!(cast::<Vec<u32>>(&value).unwrap(), vec![4]);
}

#[test]
fn containers_can_be_stored_in_collections() {
    let mut values: Vec<OpaqueValue> = (0..100_u32)
        .map(|i| {
            if i % 2 == 0 {
                OpaqueValue::from_value(i)
            } else {
                OpaqueValue::from_value(Large::new(i))
            }
        })
        .collect();

    // Growing the vector moves containers bitwise, which must be sound for both placements.
    values.reserve(10_000);

    for (i, value) in (0..100_u32).zip(&values) {
        if i % 2 == 0 {
            assert_eq!(cast::<u32>(value).unwrap(), i);
        } else {
            let large = cast_ref::<Large>(value).unwrap();
            assert_eq!(large.id, i);
            assert_eq!(large.payload[15], u64::from(i));
        }
    }

    let clones = values.clone();
    assert_eq!(clones.len(), values.len());
    assert!(clones[1].is::<Large>());
}
