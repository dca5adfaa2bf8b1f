//! Runtime values.
//!
//! [`Value`] is the closed set of categories every operator dispatches on.
//! Heap payloads are shared through [`Heap`], so cloning a value is cheap
//! and never copies strings or numbers.

mod heap;
mod map;
mod slice;

pub use heap::Heap;
pub use map::{MapKey, MapValue};
pub use slice::{grow_capacity, ElemKind, FloatKind, IntKind, Slice, SliceValue, StrKind};

use crate::host::{HostFunc, HostPackage, HostStruct};
use crate::Decimal;
use std::fmt;

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    /// The untyped nil.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Decimal(Heap<Decimal>),
    Str(Heap<str>),
    /// Markup that is already safe to emit.
    Html(Heap<str>),
    Slice(SliceValue),
    Map(MapValue),
    Struct(HostStruct),
    Func(HostFunc),
    Package(HostPackage),
    /// A predeclared type name used as a value (conversion or assertion).
    Type(ValueType),
    Builtin(Builtin),
}

impl Value {
    #[inline]
    pub fn int(n: i64) -> Value {
        Value::Int(n)
    }

    #[inline]
    pub fn decimal(d: Decimal) -> Value {
        Value::Decimal(Heap::new(d))
    }

    #[inline]
    pub fn string(s: impl Into<String>) -> Value {
        Value::Str(Heap::from_string(s.into()))
    }

    #[inline]
    pub fn html(s: impl Into<String>) -> Value {
        Value::Html(Heap::from_string(s.into()))
    }

    /// Boxed slice of `items`.
    pub fn slice(items: Vec<Value>) -> Value {
        Value::Slice(SliceValue::boxed(items))
    }

    /// Mutable map of `entries`.
    pub fn map<I>(entries: I) -> Value
    where
        I: IntoIterator<Item = (MapKey, Value)>,
    {
        let map = MapValue::new();
        for (key, value) in entries {
            map.insert(key, value);
        }
        Value::Map(map)
    }

    /// Category name shown in messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Decimal(_) => "number",
            Value::Str(_) => "string",
            Value::Html(_) => "html",
            Value::Slice(s) => s.type_name(),
            Value::Map(_) => "map",
            Value::Struct(s) => s.struct_type().name(),
            Value::Func(_) => "func",
            Value::Package(_) => "package",
            Value::Type(_) => "type",
            Value::Builtin(_) => "builtin",
        }
    }

    /// Whether this is nil or a typed nil (map, slice, struct pointer or
    /// func without an underlying value).
    pub fn is_nil(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Slice(s) => s.is_nil(),
            Value::Map(m) => m.is_nil(),
            Value::Struct(s) => s.is_nil(),
            Value::Func(f) => f.is_nil(),
            _ => false,
        }
    }

    /// Text of a string or markup value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) | Value::Html(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value as a decimal, widening integers.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Decimal(d) => Some((**d).clone()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Heap::from_text(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Heap::from_string(s))
    }
}

impl From<SliceValue> for Value {
    fn from(s: SliceValue) -> Self {
        Value::Slice(s)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Value::Map(m)
    }
}

impl PartialEq for Value {
    /// Structural equality within one category. Host values compare by
    /// identity. Operator `==` lives in the evaluator and is looser.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Decimal(a), Value::Decimal(b)) => a == b,
            (Value::Str(a), Value::Str(b)) | (Value::Html(a), Value::Html(b)) => a == b,
            (Value::Slice(a), Value::Slice(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a.ptr_eq(b),
            (Value::Func(a), Value::Func(b)) => a.ptr_eq(b),
            (Value::Package(a), Value::Package(b)) => a.ptr_eq(b),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Decimal(d) => write!(f, "Decimal({d})"),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Html(s) => write!(f, "Html({:?})", &**s),
            Value::Slice(s) => write!(f, "Slice({}, {self})", s.type_name()),
            Value::Map(_) => write!(f, "Map({self})"),
            Value::Struct(s) => write!(f, "Struct({s:?})"),
            Value::Func(func) => write!(f, "Func({func:?})"),
            Value::Package(p) => write!(f, "Package({})", p.name()),
            Value::Type(t) => write!(f, "Type({})", t.name()),
            Value::Builtin(b) => write!(f, "Builtin({})", b.name()),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    f.write_str("[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    /// Text rendering: `[1 2 3]`, `map[a:1 b:2]`, `<nil>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Str(s) | Value::Html(s) => f.write_str(s),
            Value::Slice(SliceValue::Bool(s)) => write_joined(f, &s.to_vec()),
            Value::Slice(SliceValue::Int(kind, s)) => {
                let items: Vec<Value> = s.to_vec().into_iter().map(|n| kind.to_value(n)).collect();
                write_joined(f, &items)
            }
            Value::Slice(SliceValue::Float(_, s)) => write_joined(f, &s.to_vec()),
            Value::Slice(SliceValue::Str(_, s)) => write_joined(f, &s.to_vec()),
            Value::Slice(SliceValue::Boxed(s)) => write_joined(f, &s.to_vec()),
            Value::Map(m) => {
                let mut entries: Vec<String> = m
                    .entries()
                    .into_iter()
                    .map(|(k, v)| format!("{}:{v}", k.to_value()))
                    .collect();
                entries.sort();
                write!(f, "map[{}]", entries.join(" "))
            }
            Value::Struct(s) => match s.as_string() {
                Some(text) => f.write_str(&text),
                None => write!(f, "{s:?}"),
            },
            Value::Func(func) => f.write_str(func.name()),
            Value::Package(p) => write!(f, "package {}", p.name()),
            Value::Type(t) => f.write_str(t.name()),
            Value::Builtin(b) => f.write_str(b.name()),
        }
    }
}

/// Predeclared type names usable as conversions and in type assertions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Html,
    Number,
    Int,
    Bool,
    Map,
    Slice,
}

impl ValueType {
    pub const ALL: [ValueType; 7] = [
        ValueType::String,
        ValueType::Html,
        ValueType::Number,
        ValueType::Int,
        ValueType::Bool,
        ValueType::Map,
        ValueType::Slice,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Html => "html",
            ValueType::Number => "number",
            ValueType::Int => "int",
            ValueType::Bool => "bool",
            ValueType::Map => "map",
            ValueType::Slice => "slice",
        }
    }
}

/// Predeclared functions that are only valid in call position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Len,
    Delete,
}

impl Builtin {
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Len => "len",
            Builtin::Delete => "delete",
        }
    }
}
