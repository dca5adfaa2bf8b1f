use super::*;
use pretty_assertions::assert_eq;
use quill_value::Decimal;

#[test]
fn writes_wrap_to_width() {
    let r = Reference::int(IntKind::Int8, 127);
    r.update_int(|n| n + 1).unwrap();
    assert_eq!(r.get_int().unwrap(), -128);

    let r = Reference::int(IntKind::Uint8, 0);
    r.set_int(300).unwrap();
    assert_eq!(r.get_int().unwrap(), 44);
    r.update_int(|n| n - 45).unwrap();
    assert_eq!(r.get_int().unwrap(), 255);
}

#[test]
fn unsigned_64_bit_patterns() {
    let r = Reference::int(IntKind::Uint64, -1);
    assert_eq!(r.get_int().unwrap(), -1);
    assert_eq!(r.get().unwrap(), Value::decimal(Decimal::from(u64::MAX)));
}

#[test]
fn unsigned_64_bit_values_write_back() {
    let r = Reference::int(IntKind::Uint64, -1);
    r.set(r.get().unwrap()).unwrap();
    assert_eq!(r.get_int().unwrap(), -1);

    let r = Reference::int(IntKind::Uint, 0);
    r.set(Value::decimal(Decimal::from(1_u64 << 63))).unwrap();
    assert_eq!(r.get_int().unwrap(), i64::MIN);
    assert_eq!(r.get().unwrap().to_string(), "9223372036854775808");

    let err = r.set(Value::decimal(&Decimal::from(u64::MAX) + &Decimal::from(1_i64))).unwrap_err();
    assert_eq!(err.to_string(), "number 18446744073709551616 overflows int");
    let signed = Reference::int(IntKind::Int64, 0);
    assert!(signed.set(Value::decimal(Decimal::from(u64::MAX))).is_err());
}

#[test]
fn float_width() {
    let r = Reference::float(FloatKind::Float32, 0.1);
    assert_eq!(r.get_float().unwrap(), f64::from(0.1_f32));
    assert_eq!(r.get().unwrap().to_string(), "0.1");
    r.update_float(|f| f * 2.0).unwrap();
    assert_eq!(r.get_float().unwrap(), f64::from(0.2_f32));
}

#[test]
fn clones_share_the_cell() {
    let host = Reference::string("before");
    let vm = host.clone();
    vm.set_string(Heap::from("after")).unwrap();
    assert_eq!(&*host.get_string().unwrap(), "after");
    assert!(host.ptr_eq(&vm));
    assert!(!host.ptr_eq(&Reference::string("after")));
}

#[test]
fn wrong_kind() {
    let r = Reference::bool(true);
    let err = r.get_int().unwrap_err();
    assert_eq!(
        err,
        VmError::WrongReferenceKind {
            reference: "bool",
            access: "int"
        }
    );
    assert_eq!(err.to_string(), "cannot use bool reference as int");
    assert!(Reference::int(IntKind::Int, 1).get_string().is_err());
    assert!(Reference::general(Value::Nil).get_float().is_err());
}

#[test]
fn set_converts_to_the_referenced_kind() {
    let r = Reference::int(IntKind::Int, 0);
    r.set(Value::decimal(Decimal::new(50_i64, 1))).unwrap();
    assert_eq!(r.get_int().unwrap(), 5);
    let err = r.set(Value::decimal(Decimal::new(55_i64, 1))).unwrap_err();
    assert_eq!(err.to_string(), "number 5.5 truncated to integer");
    assert_eq!(
        r.set(Value::string("x")).unwrap_err(),
        VmError::WrongReferenceKind {
            reference: "int",
            access: "string"
        }
    );

    let r = Reference::float(FloatKind::Float64, 0.0);
    r.set(Value::int(3)).unwrap();
    assert_eq!(r.get_float().unwrap(), 3.0);

    let r = Reference::string("");
    r.set(Value::html("<b>")).unwrap();
    assert_eq!(r.get().unwrap(), Value::string("<b>"));

    let r = Reference::general(Value::Nil);
    r.set(Value::slice(vec![Value::int(1)])).unwrap();
    assert_eq!(r.get().unwrap(), Value::slice(vec![Value::int(1)]));
    assert_eq!(r.kind(), RefKind::General);
}
