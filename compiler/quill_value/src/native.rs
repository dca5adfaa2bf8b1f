//! Host-side values and their normalization into [`Value`].

use crate::errors::{implementation_type, non_finite_number, EvalError};
use crate::host::{HostFunc, HostPackage, HostStruct};
use crate::value::{Heap, MapValue, SliceValue};
use crate::{Decimal, Value};

/// A value as the host produces it, before normalization.
///
/// Host functions and struct getters return `Native`s; every one of them
/// passes through [`normalize`] before an operator sees it.
#[derive(Clone, Debug)]
pub enum Native {
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    /// Complex numbers have no value category.
    Complex64(f32, f32),
    Complex128(f64, f64),
    /// Raw machine address; has no value category.
    Uintptr(usize),
    String(String),
    Html(String),
    Decimal(Decimal),
    Slice(SliceValue),
    Map(MapValue),
    Struct(HostStruct),
    Func(HostFunc),
    Package(HostPackage),
    /// Already normalized.
    Value(Value),
}

macro_rules! native_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Native {
                fn from(v: $ty) -> Self {
                    Native::$variant(v)
                }
            }
        )*
    };
}

native_from! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => String,
    Decimal => Decimal,
    SliceValue => Slice,
    MapValue => Map,
    HostStruct => Struct,
    HostFunc => Func,
    Value => Value,
}

impl From<&str> for Native {
    fn from(s: &str) -> Self {
        Native::String(s.to_owned())
    }
}

/// Map a host value onto the value categories.
///
/// Integers that fit `i64` become `Int`; larger unsigned integers become
/// exact decimals. Floats become the shortest decimal of their width.
/// Structs with a number or string capability are converted through it.
/// Complex numbers and raw addresses are rejected.
pub fn normalize(native: Native) -> Result<Value, EvalError> {
    Ok(match native {
        Native::Nil => Value::Nil,
        Native::Bool(b) => Value::Bool(b),
        Native::I8(n) => Value::Int(i64::from(n)),
        Native::I16(n) => Value::Int(i64::from(n)),
        Native::I32(n) => Value::Int(i64::from(n)),
        Native::I64(n) => Value::Int(n),
        Native::Isize(n) => Value::Int(i64::try_from(n).map_err(|_| implementation_type("isize"))?),
        Native::U8(n) => Value::Int(i64::from(n)),
        Native::U16(n) => Value::Int(i64::from(n)),
        Native::U32(n) => Value::Int(i64::from(n)),
        Native::U64(n) => unsigned(n),
        Native::Usize(n) => unsigned(u64::try_from(n).map_err(|_| implementation_type("uint"))?),
        Native::F32(f) => Value::decimal(Decimal::from_f32(f).ok_or_else(|| non_finite_number("float32"))?),
        Native::F64(f) => Value::decimal(Decimal::from_f64(f).ok_or_else(|| non_finite_number("float64"))?),
        Native::Complex64(..) => return Err(implementation_type("complex64")),
        Native::Complex128(..) => return Err(implementation_type("complex128")),
        Native::Uintptr(_) => return Err(implementation_type("uintptr")),
        Native::String(s) => Value::Str(Heap::from_string(s)),
        Native::Html(s) => Value::Html(Heap::from_string(s)),
        Native::Decimal(d) => Value::decimal(d),
        Native::Slice(s) => Value::Slice(s),
        Native::Map(m) => Value::Map(m),
        Native::Struct(s) => normalize_struct(s),
        Native::Func(f) => Value::Func(f),
        Native::Package(p) => Value::Package(p),
        Native::Value(v) => v,
    })
}

fn unsigned(n: u64) -> Value {
    match i64::try_from(n) {
        Ok(n) => Value::Int(n),
        Err(_) => Value::decimal(Decimal::from(n)),
    }
}

fn normalize_struct(s: HostStruct) -> Value {
    if let Some(number) = s.as_number() {
        return Value::decimal(number);
    }
    if let Some(text) = s.as_string() {
        return Value::string(text);
    }
    Value::Struct(s)
}

/// Normalize `value` again if it is a host struct with a number or string
/// capability; any other value is already normalized.
pub fn normalize_value(value: Value) -> Value {
    match value {
        Value::Struct(s) => normalize_struct(s),
        other => other,
    }
}
