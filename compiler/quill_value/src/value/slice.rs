//! Typed sequences with shared backing storage.
//!
//! A [`Slice<T>`] is a window (`offset`, `len`, `cap`) onto a shared,
//! lock-protected buffer. Reslicing and in-capacity appends reuse the
//! buffer, so two slices may alias; growing past capacity copies into a
//! fresh buffer sized by [`grow_capacity`].

use super::{Heap, Value};
use crate::errors::{index_out_of_range, non_finite_number, EvalError};
use crate::Decimal;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Capacity for a slice of `old_len` elements and capacity `old_cap`
/// that must hold `new_len` elements.
///
/// Empty slices jump straight to `new_len`; otherwise capacity doubles
/// while the old length is under 1024 and grows by a quarter after that.
pub fn grow_capacity(old_cap: usize, old_len: usize, new_len: usize) -> usize {
    if old_cap == 0 {
        return new_len;
    }
    let mut cap = old_cap;
    while cap < new_len {
        if old_len < 1024 {
            cap += cap;
        } else {
            cap += cap / 4;
        }
    }
    cap
}

/// Window onto a shared buffer. `None` backing is the nil slice.
pub struct Slice<T> {
    backing: Option<Arc<RwLock<Vec<T>>>>,
    offset: usize,
    len: usize,
    cap: usize,
}

impl<T> Clone for Slice<T> {
    fn clone(&self) -> Self {
        Slice {
            backing: self.backing.clone(),
            offset: self.offset,
            len: self.len,
            cap: self.cap,
        }
    }
}

impl<T: Clone + Default> Slice<T> {
    pub fn nil() -> Self {
        Slice {
            backing: None,
            offset: 0,
            len: 0,
            cap: 0,
        }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        let len = items.len();
        Slice {
            backing: Some(Arc::new(RwLock::new(items))),
            offset: 0,
            len,
            cap: len,
        }
    }

    /// Empty, non-nil slice with room for `cap` elements.
    pub fn with_capacity(cap: usize) -> Self {
        Slice {
            backing: Some(Arc::new(RwLock::new(vec![T::default(); cap]))),
            offset: 0,
            len: 0,
            cap,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        self.backing.is_none()
    }

    /// Whether both slices view the same buffer.
    pub fn same_backing(&self, other: &Slice<T>) -> bool {
        match (&self.backing, &other.backing) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        let backing = self.backing.as_ref()?;
        backing.read().get(self.offset + index).cloned()
    }

    /// Overwrite element `index`; `false` if out of range.
    pub fn set(&self, index: usize, item: T) -> bool {
        if index >= self.len {
            return false;
        }
        let Some(backing) = &self.backing else {
            return false;
        };
        match backing.write().get_mut(self.offset + index) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        match &self.backing {
            Some(backing) => backing.read()[self.offset..self.offset + self.len].to_vec(),
            None => Vec::new(),
        }
    }

    /// `self[low:high]`, sharing the buffer. `None` unless `low <= high <= cap`.
    pub fn reslice(&self, low: usize, high: usize) -> Option<Slice<T>> {
        if low > high || high > self.cap {
            return None;
        }
        if self.backing.is_none() {
            return Some(Slice::nil());
        }
        Some(Slice {
            backing: self.backing.clone(),
            offset: self.offset + low,
            len: high - low,
            cap: self.cap - low,
        })
    }

    /// Append `items`, returning the new slice and, when the buffer had to
    /// be reallocated, its new capacity.
    pub fn append(&self, items: Vec<T>) -> (Slice<T>, Option<usize>) {
        if items.is_empty() {
            return (self.clone(), None);
        }
        let count = items.len();
        let new_len = self.len + count;

        if new_len <= self.cap {
            if let Some(backing) = &self.backing {
                let start = self.offset + self.len;
                let mut buffer = backing.write();
                for (slot, item) in buffer[start..start + count].iter_mut().zip(items) {
                    *slot = item;
                }
                drop(buffer);
                return (
                    Slice {
                        backing: self.backing.clone(),
                        offset: self.offset,
                        len: new_len,
                        cap: self.cap,
                    },
                    None,
                );
            }
        }

        let new_cap = grow_capacity(self.cap, self.len, new_len);
        let mut buffer = Vec::with_capacity(new_cap);
        buffer.extend(self.to_vec());
        buffer.extend(items);
        buffer.resize(new_cap, T::default());
        (
            Slice {
                backing: Some(Arc::new(RwLock::new(buffer))),
                offset: 0,
                len: new_len,
                cap: new_cap,
            },
            Some(new_cap),
        )
    }
}

/// Width of an integer element kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
}

impl IntKind {
    pub const BYTE: IntKind = IntKind::Uint8;
    pub const RUNE: IntKind = IntKind::Int32;

    pub const fn name(self) -> &'static str {
        match self {
            IntKind::Int => "int",
            IntKind::Int8 => "int8",
            IntKind::Int16 => "int16",
            IntKind::Int32 => "rune",
            IntKind::Int64 => "int64",
            IntKind::Uint => "uint",
            IntKind::Uint8 => "byte",
            IntKind::Uint16 => "uint16",
            IntKind::Uint32 => "uint32",
            IntKind::Uint64 => "uint64",
        }
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            IntKind::Uint | IntKind::Uint8 | IntKind::Uint16 | IntKind::Uint32 | IntKind::Uint64
        )
    }

    pub const fn byte_size(self) -> usize {
        match self {
            IntKind::Int8 | IntKind::Uint8 => 1,
            IntKind::Int16 | IntKind::Uint16 => 2,
            IntKind::Int32 | IntKind::Uint32 => 4,
            IntKind::Int | IntKind::Int64 | IntKind::Uint | IntKind::Uint64 => 8,
        }
    }

    /// Wrap `n` to this width. 64-bit unsigned values keep their bit
    /// pattern in the `i64`.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_lossless,
        reason = "wrapping to the element width is the point"
    )]
    pub const fn narrow(self, n: i64) -> i64 {
        match self {
            IntKind::Int8 => n as i8 as i64,
            IntKind::Int16 => n as i16 as i64,
            IntKind::Int32 => n as i32 as i64,
            IntKind::Uint8 => n as u8 as i64,
            IntKind::Uint16 => n as u16 as i64,
            IntKind::Uint32 => n as u32 as i64,
            IntKind::Int | IntKind::Int64 | IntKind::Uint | IntKind::Uint64 => n,
        }
    }

    /// Value of a stored element. Unsigned 64-bit patterns above
    /// `i64::MAX` become decimals.
    #[expect(clippy::cast_sign_loss, reason = "reinterpreting the stored bit pattern")]
    pub fn to_value(self, n: i64) -> Value {
        if matches!(self, IntKind::Uint | IntKind::Uint64) && n < 0 {
            Value::decimal(Decimal::from(n as u64))
        } else {
            Value::Int(n)
        }
    }
}

/// Width of a floating-point element kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    Float32,
    Float64,
}

impl FloatKind {
    pub const fn name(self) -> &'static str {
        match self {
            FloatKind::Float32 => "float32",
            FloatKind::Float64 => "float64",
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "rounding to float32 storage")]
    pub fn narrow(self, f: f64) -> f64 {
        match self {
            FloatKind::Float32 => f64::from(f as f32),
            FloatKind::Float64 => f,
        }
    }

    #[expect(clippy::cast_possible_truncation, reason = "stored float32 values are exact")]
    pub fn to_value(self, f: f64) -> Result<Value, EvalError> {
        let decimal = match self {
            FloatKind::Float32 => Decimal::from_f32(f as f32),
            FloatKind::Float64 => Decimal::from_f64(f),
        };
        decimal
            .map(Value::decimal)
            .ok_or_else(|| non_finite_number(self.name()))
    }
}

/// Whether string elements are plain or markup.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StrKind {
    String,
    Html,
}

/// Declared element kind of a sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ElemKind {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    Str(StrKind),
    Boxed,
}

impl ElemKind {
    /// Bytes one element occupies, for memory accounting.
    pub const fn byte_size(self) -> usize {
        match self {
            ElemKind::Bool => 1,
            ElemKind::Int(kind) => kind.byte_size(),
            ElemKind::Float(FloatKind::Float32) => 4,
            ElemKind::Float(FloatKind::Float64) => 8,
            ElemKind::Str(_) | ElemKind::Boxed => 16,
        }
    }

    /// Name of a sequence of this kind, as shown in messages.
    pub const fn slice_type_name(self) -> &'static str {
        match self {
            ElemKind::Bool => "[]bool",
            ElemKind::Int(IntKind::Int) => "[]int",
            ElemKind::Int(IntKind::Int8) => "[]int8",
            ElemKind::Int(IntKind::Int16) => "[]int16",
            ElemKind::Int(IntKind::Int32) => "[]rune",
            ElemKind::Int(IntKind::Int64) => "[]int64",
            ElemKind::Int(IntKind::Uint) => "[]uint",
            ElemKind::Int(IntKind::Uint8) => "[]byte",
            ElemKind::Int(IntKind::Uint16) => "[]uint16",
            ElemKind::Int(IntKind::Uint32) => "[]uint32",
            ElemKind::Int(IntKind::Uint64) => "[]uint64",
            ElemKind::Float(FloatKind::Float32) => "[]float32",
            ElemKind::Float(FloatKind::Float64) => "[]float64",
            ElemKind::Str(StrKind::String) => "[]string",
            ElemKind::Str(StrKind::Html) => "[]html",
            ElemKind::Boxed => "slice",
        }
    }
}

/// Sequence value: a typed slice tagged with its element kind.
#[derive(Clone)]
pub enum SliceValue {
    Bool(Slice<bool>),
    Int(IntKind, Slice<i64>),
    Float(FloatKind, Slice<f64>),
    Str(StrKind, Slice<Heap<str>>),
    Boxed(Slice<Value>),
}

macro_rules! with_slice {
    ($value:expr, $s:ident => $body:expr) => {
        match $value {
            SliceValue::Bool($s) => $body,
            SliceValue::Int(_, $s) => $body,
            SliceValue::Float(_, $s) => $body,
            SliceValue::Str(_, $s) => $body,
            SliceValue::Boxed($s) => $body,
        }
    };
}

impl SliceValue {
    /// Nil sequence of the given element kind.
    pub fn nil(kind: ElemKind) -> Self {
        match kind {
            ElemKind::Bool => SliceValue::Bool(Slice::nil()),
            ElemKind::Int(k) => SliceValue::Int(k, Slice::nil()),
            ElemKind::Float(k) => SliceValue::Float(k, Slice::nil()),
            ElemKind::Str(k) => SliceValue::Str(k, Slice::nil()),
            ElemKind::Boxed => SliceValue::Boxed(Slice::nil()),
        }
    }

    pub fn boxed(items: Vec<Value>) -> Self {
        SliceValue::Boxed(Slice::from_vec(items))
    }

    /// Integers stored at `kind`'s width.
    pub fn ints(kind: IntKind, items: Vec<i64>) -> Self {
        SliceValue::Int(kind, Slice::from_vec(items.into_iter().map(|n| kind.narrow(n)).collect()))
    }

    pub fn floats(kind: FloatKind, items: Vec<f64>) -> Self {
        SliceValue::Float(kind, Slice::from_vec(items.into_iter().map(|f| kind.narrow(f)).collect()))
    }

    pub fn bools(items: Vec<bool>) -> Self {
        SliceValue::Bool(Slice::from_vec(items))
    }

    pub fn strings(kind: StrKind, items: Vec<String>) -> Self {
        SliceValue::Str(kind, Slice::from_vec(items.into_iter().map(Heap::from_string).collect()))
    }

    /// The code points of `s`.
    pub fn runes(s: &str) -> Self {
        SliceValue::ints(IntKind::RUNE, s.chars().map(|c| i64::from(u32::from(c))).collect())
    }

    pub fn bytes(bytes: &[u8]) -> Self {
        SliceValue::ints(IntKind::BYTE, bytes.iter().map(|&b| i64::from(b)).collect())
    }

    pub fn elem_kind(&self) -> ElemKind {
        match self {
            SliceValue::Bool(_) => ElemKind::Bool,
            SliceValue::Int(k, _) => ElemKind::Int(*k),
            SliceValue::Float(k, _) => ElemKind::Float(*k),
            SliceValue::Str(k, _) => ElemKind::Str(*k),
            SliceValue::Boxed(_) => ElemKind::Boxed,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.elem_kind().slice_type_name()
    }

    pub fn len(&self) -> usize {
        with_slice!(self, s => s.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cap(&self) -> usize {
        with_slice!(self, s => s.cap())
    }

    pub fn is_nil(&self) -> bool {
        with_slice!(self, s => s.is_nil())
    }

    /// Whether both values view the same buffer.
    pub fn same_backing(&self, other: &SliceValue) -> bool {
        match (self, other) {
            (SliceValue::Bool(a), SliceValue::Bool(b)) => a.same_backing(b),
            (SliceValue::Int(_, a), SliceValue::Int(_, b)) => a.same_backing(b),
            (SliceValue::Float(_, a), SliceValue::Float(_, b)) => a.same_backing(b),
            (SliceValue::Str(_, a), SliceValue::Str(_, b)) => a.same_backing(b),
            (SliceValue::Boxed(a), SliceValue::Boxed(b)) => a.same_backing(b),
            _ => false,
        }
    }

    /// Element `index` as a value.
    pub fn index(&self, index: usize) -> Result<Value, EvalError> {
        let out_of_range = || index_out_of_range(i64::try_from(index).unwrap_or(i64::MAX), self.len());
        match self {
            SliceValue::Bool(s) => s.get(index).map(Value::Bool).ok_or_else(out_of_range),
            SliceValue::Int(k, s) => s.get(index).map(|n| k.to_value(n)).ok_or_else(out_of_range),
            SliceValue::Float(k, s) => s.get(index).ok_or_else(out_of_range).and_then(|f| k.to_value(f)),
            SliceValue::Str(StrKind::String, s) => s.get(index).map(Value::Str).ok_or_else(out_of_range),
            SliceValue::Str(StrKind::Html, s) => s.get(index).map(Value::Html).ok_or_else(out_of_range),
            SliceValue::Boxed(s) => s.get(index).ok_or_else(out_of_range),
        }
    }

    /// All elements as values.
    pub fn to_values(&self) -> Result<Vec<Value>, EvalError> {
        (0..self.len()).map(|i| self.index(i)).collect()
    }

    /// `self[low:high]` sharing storage; `None` unless `low <= high <= cap`.
    pub fn reslice(&self, low: usize, high: usize) -> Option<SliceValue> {
        Some(match self {
            SliceValue::Bool(s) => SliceValue::Bool(s.reslice(low, high)?),
            SliceValue::Int(k, s) => SliceValue::Int(*k, s.reslice(low, high)?),
            SliceValue::Float(k, s) => SliceValue::Float(*k, s.reslice(low, high)?),
            SliceValue::Str(k, s) => SliceValue::Str(*k, s.reslice(low, high)?),
            SliceValue::Boxed(s) => SliceValue::Boxed(s.reslice(low, high)?),
        })
    }
}

impl PartialEq for SliceValue {
    /// Same element kind, nil-ness and elements.
    fn eq(&self, other: &Self) -> bool {
        if self.elem_kind() != other.elem_kind() || self.is_nil() != other.is_nil() {
            return false;
        }
        match (self, other) {
            (SliceValue::Bool(a), SliceValue::Bool(b)) => a.to_vec() == b.to_vec(),
            (SliceValue::Int(_, a), SliceValue::Int(_, b)) => a.to_vec() == b.to_vec(),
            (SliceValue::Float(_, a), SliceValue::Float(_, b)) => a.to_vec() == b.to_vec(),
            (SliceValue::Str(_, a), SliceValue::Str(_, b)) => a.to_vec() == b.to_vec(),
            (SliceValue::Boxed(a), SliceValue::Boxed(b)) => a.to_vec() == b.to_vec(),
            _ => false,
        }
    }
}

impl fmt::Debug for SliceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&Value::Slice(self.clone()), f)
    }
}
