use super::*;
use crate::{Reference, Registers};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quill_value::{grow_capacity, ElemKind, FloatKind, Heap, IntKind, Slice, StrKind, Value};
use std::sync::Arc;

fn registers(ints: &[i64]) -> Registers {
    let mut regs = Registers::new([16, 4, 4, 4], Arc::default());
    for (r, &n) in (1..).zip(ints) {
        regs.set_int(r, n).unwrap();
    }
    regs
}

fn ints_with_capacity(items: Vec<i64>, cap: usize) -> SliceValue {
    let (slice, _) = Slice::with_capacity(cap).append(items);
    SliceValue::Int(IntKind::Int, slice)
}

#[test]
fn appends_in_place_when_there_is_room() {
    let regs = registers(&[7, 8]);
    let before = ints_with_capacity(vec![1], 4);
    let after = regs.append_slice(1, 2, &before, &Env::new()).unwrap();
    assert!(after.same_backing(&before));
    assert_eq!((after.len(), after.cap()), (3, 4));
    assert_eq!(Value::Slice(after).to_string(), "[1 7 8]");
    assert_eq!(before.len(), 1);
}

#[test]
fn grows_past_capacity() {
    let regs = registers(&[3, 4, 5]);
    let env = Env::builder().memory_limit(1000).build();
    let before = ints_with_capacity(vec![1, 2], 2);
    let after = regs.append_slice(1, 3, &before, &env).unwrap();
    assert!(!after.same_backing(&before));
    assert_eq!((after.len(), after.cap()), (5, 8));
    assert_eq!(Value::Slice(after).to_string(), "[1 2 3 4 5]");
    assert_eq!(Value::Slice(before).to_string(), "[1 2]");
    assert_eq!(env.free_memory(), Some(1000 - 64));
}

#[test]
fn nil_slices() {
    let regs = registers(&[1, 2, 3]);
    let nil = SliceValue::nil(ElemKind::Int(IntKind::Int));
    let same = regs.append_slice(0, 0, &nil, &Env::new()).unwrap();
    assert!(same.is_nil());

    let grown = regs.append_slice(1, 3, &nil, &Env::new()).unwrap();
    assert!(!grown.is_nil());
    assert_eq!((grown.len(), grown.cap()), (3, 3));
}

#[test]
fn converts_to_the_element_kind() {
    let regs = registers(&[256 + 65, -1, 0, 2]);
    let bytes = regs
        .append_slice(1, 2, &SliceValue::bytes(b""), &Env::new())
        .unwrap();
    assert_eq!(Value::Slice(bytes).to_string(), "[65 255]");

    let bools = regs
        .append_slice(2, 3, &SliceValue::bools(Vec::new()), &Env::new())
        .unwrap();
    assert_eq!(Value::Slice(bools).to_string(), "[false false true]");

    let runes = regs
        .append_slice(1, 1, &SliceValue::runes("a"), &Env::new())
        .unwrap();
    assert_eq!(runes.type_name(), "[]rune");
    assert_eq!(runes.index(1).unwrap(), Value::int(321));
}

#[test]
fn other_banks() {
    let mut regs = registers(&[]);
    regs.set_float(1, 0.1).unwrap();
    regs.set_float(2, 2.0).unwrap();
    regs.set_string(1, Heap::from("a")).unwrap();
    regs.set_string(2, Heap::from("<b>")).unwrap();
    regs.set_general(1, Value::int(1)).unwrap();
    regs.set_general(2, Value::string("x")).unwrap();

    let floats = regs
        .append_slice(1, 2, &SliceValue::floats(FloatKind::Float32, Vec::new()), &Env::new())
        .unwrap();
    assert_eq!(floats.len(), 2);
    assert_eq!(floats.index(0).unwrap().to_string(), "0.1");
    assert_eq!(floats.index(1).unwrap().to_string(), "2");

    let html = regs
        .append_slice(1, 2, &SliceValue::nil(ElemKind::Str(StrKind::Html)), &Env::new())
        .unwrap();
    assert_eq!(html.index(1).unwrap(), Value::html("<b>"));

    let boxed = regs
        .append_slice(1, 2, &SliceValue::boxed(vec![Value::Nil]), &Env::new())
        .unwrap();
    assert_eq!(Value::Slice(boxed).to_string(), "[<nil> 1 x]");
}

#[test]
fn faults() {
    let mut regs = registers(&[1, 2, 3]);
    let nil = SliceValue::nil(ElemKind::Int(IntKind::Int));
    assert_eq!(
        regs.append_slice(15, 3, &nil, &Env::new()).unwrap_err(),
        VmError::InvalidRegister(15)
    );
    assert_eq!(
        regs.append_slice(-1, 1, &nil, &Env::new()).unwrap_err(),
        VmError::InvalidRegister(-1)
    );

    let env = Env::builder().memory_limit(16).build();
    assert_eq!(regs.append_slice(1, 3, &nil, &env).unwrap_err(), VmError::OutOfMemory);

    regs.set_reference(1, Reference::bool(true)).unwrap();
    assert_eq!(
        regs.append_slice(1, 2, &SliceValue::boxed(Vec::new()), &Env::new())
            .unwrap_err(),
        VmError::UnexpectedReference(1)
    );
}

proptest! {
    #[test]
    fn growth_preserves_prior_elements(
        prior in proptest::collection::vec(any::<i64>(), 0..20),
        extra in 0usize..20,
        appended in proptest::collection::vec(any::<i64>(), 1..16),
    ) {
        let cap = prior.len() + extra;
        let regs = registers(&appended);
        let before = ints_with_capacity(prior.clone(), cap);
        let after = regs.append_slice(1, appended.len(), &before, &Env::new()).unwrap();

        let new_len = prior.len() + appended.len();
        prop_assert_eq!(after.len(), new_len);
        if new_len <= cap {
            prop_assert!(after.same_backing(&before));
            prop_assert_eq!(after.cap(), cap);
        } else {
            prop_assert!(!after.same_backing(&before));
            prop_assert_eq!(after.cap(), grow_capacity(cap, prior.len(), new_len));
        }
        let expected: Vec<Value> = prior.iter().chain(&appended).map(|&n| Value::int(n)).collect();
        prop_assert_eq!(after.to_values().unwrap(), expected);
    }
}
