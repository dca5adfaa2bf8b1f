//! References into host-owned storage.
//!
//! A negative register address reads and writes through a [`Reference`]
//! held in the general bank. The host keeps its own clone of the
//! reference and observes every write the VM makes through it.
//!
//! The cell is tagged with the kind of host storage it stands for. Writes
//! wrap to the declared integer width or round to the declared float
//! width, so the host never sees a value its field could not hold.
//! Unsigned 64-bit storage keeps its bit pattern in the `i64`, and reads
//! through the int accessors reinterpret it as signed.

use crate::VmError;
use parking_lot::Mutex;
use quill_eval::decimal_to_int;
use quill_value::{Decimal, FloatKind, Heap, IntKind, Value};
use std::fmt;
use std::sync::Arc;

/// Kind of host storage behind a reference.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RefKind {
    Bool,
    Int(IntKind),
    Float(FloatKind),
    String,
    General,
}

impl RefKind {
    pub const fn name(self) -> &'static str {
        match self {
            RefKind::Bool => "bool",
            RefKind::Int(kind) => kind.name(),
            RefKind::Float(kind) => kind.name(),
            RefKind::String => "string",
            RefKind::General => "general",
        }
    }
}

enum Cell {
    Bool(bool),
    Int(IntKind, i64),
    Float(FloatKind, f64),
    Str(Heap<str>),
    General(Value),
}

impl Cell {
    fn kind(&self) -> RefKind {
        match self {
            Cell::Bool(_) => RefKind::Bool,
            Cell::Int(kind, _) => RefKind::Int(*kind),
            Cell::Float(kind, _) => RefKind::Float(*kind),
            Cell::Str(_) => RefKind::String,
            Cell::General(_) => RefKind::General,
        }
    }

    fn mismatch(&self, access: &'static str) -> VmError {
        VmError::WrongReferenceKind {
            reference: self.kind().name(),
            access,
        }
    }
}

/// Shared, typed cell standing for a host variable or field.
#[derive(Clone)]
pub struct Reference(Arc<Mutex<Cell>>);

impl Reference {
    fn from_cell(cell: Cell) -> Self {
        Reference(Arc::new(Mutex::new(cell)))
    }

    pub fn bool(b: bool) -> Self {
        Self::from_cell(Cell::Bool(b))
    }

    /// Integer storage of width `kind`; `n` is wrapped to that width.
    pub fn int(kind: IntKind, n: i64) -> Self {
        Self::from_cell(Cell::Int(kind, kind.narrow(n)))
    }

    pub fn float(kind: FloatKind, f: f64) -> Self {
        Self::from_cell(Cell::Float(kind, kind.narrow(f)))
    }

    pub fn string(s: impl Into<Heap<str>>) -> Self {
        Self::from_cell(Cell::Str(s.into()))
    }

    /// Storage for any value.
    pub fn general(value: Value) -> Self {
        Self::from_cell(Cell::General(value))
    }

    pub fn kind(&self) -> RefKind {
        self.0.lock().kind()
    }

    /// Whether both references share one cell.
    pub fn ptr_eq(&self, other: &Reference) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn get_bool(&self) -> Result<bool, VmError> {
        match &*self.0.lock() {
            Cell::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn set_bool(&self, b: bool) -> Result<(), VmError> {
        match &mut *self.0.lock() {
            Cell::Bool(slot) => {
                *slot = b;
                Ok(())
            }
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn get_int(&self) -> Result<i64, VmError> {
        match &*self.0.lock() {
            Cell::Int(_, n) => Ok(*n),
            other => Err(other.mismatch("int")),
        }
    }

    pub fn set_int(&self, n: i64) -> Result<(), VmError> {
        self.update_int(|_| n)
    }

    /// Replace the integer with `f(current)`, wrapped to the width.
    pub fn update_int(&self, f: impl FnOnce(i64) -> i64) -> Result<(), VmError> {
        match &mut *self.0.lock() {
            Cell::Int(kind, slot) => {
                *slot = kind.narrow(f(*slot));
                Ok(())
            }
            other => Err(other.mismatch("int")),
        }
    }

    pub fn get_float(&self) -> Result<f64, VmError> {
        match &*self.0.lock() {
            Cell::Float(_, f) => Ok(*f),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn set_float(&self, f: f64) -> Result<(), VmError> {
        self.update_float(|_| f)
    }

    pub fn update_float(&self, f: impl FnOnce(f64) -> f64) -> Result<(), VmError> {
        match &mut *self.0.lock() {
            Cell::Float(kind, slot) => {
                *slot = kind.narrow(f(*slot));
                Ok(())
            }
            other => Err(other.mismatch("float")),
        }
    }

    pub fn get_string(&self) -> Result<Heap<str>, VmError> {
        match &*self.0.lock() {
            Cell::Str(s) => Ok(s.clone()),
            other => Err(other.mismatch("string")),
        }
    }

    pub fn set_string(&self, s: Heap<str>) -> Result<(), VmError> {
        match &mut *self.0.lock() {
            Cell::Str(slot) => {
                *slot = s;
                Ok(())
            }
            other => Err(other.mismatch("string")),
        }
    }

    /// The referenced storage as a value, whatever its kind.
    pub fn get(&self) -> Result<Value, VmError> {
        let value = match &*self.0.lock() {
            Cell::Bool(b) => Value::Bool(*b),
            Cell::Int(kind, n) => kind.to_value(*n),
            Cell::Float(kind, f) => kind.to_value(*f)?,
            Cell::Str(s) => Value::Str(s.clone()),
            Cell::General(value) => value.clone(),
        };
        Ok(value)
    }

    /// Store `value`, converting it to the referenced kind. Integer storage
    /// accepts exact decimals; float storage accepts any number.
    #[expect(clippy::cast_precision_loss, reason = "int to float storage rounds like the host would")]
    pub fn set(&self, value: Value) -> Result<(), VmError> {
        let mut cell = self.0.lock();
        match (&mut *cell, value) {
            (Cell::General(slot), value) => *slot = value,
            (Cell::Bool(slot), Value::Bool(b)) => *slot = b,
            (Cell::Int(kind, slot), Value::Int(n)) => *slot = kind.narrow(n),
            (Cell::Int(kind, slot), Value::Decimal(d)) => {
                *slot = kind.narrow(decimal_to_cell(*kind, &d)?);
            }
            (Cell::Float(kind, slot), Value::Int(n)) => *slot = kind.narrow(n as f64),
            (Cell::Float(kind, slot), Value::Decimal(d)) => *slot = kind.narrow(d.to_f64()),
            (Cell::Str(slot), Value::Str(s) | Value::Html(s)) => *slot = s,
            (other, value) => return Err(other.mismatch(value.type_name())),
        }
        Ok(())
    }
}

/// Integer cell contents for an exact decimal. 64-bit unsigned storage
/// takes the whole `u64` range as a bit pattern.
#[expect(clippy::cast_possible_wrap, reason = "unsigned storage keeps its bit pattern")]
fn decimal_to_cell(kind: IntKind, d: &Decimal) -> Result<i64, VmError> {
    if matches!(kind, IntKind::Uint | IntKind::Uint64) {
        if let Some(n) = d.to_u64() {
            return Ok(n as i64);
        }
    }
    Ok(decimal_to_int(d)?)
}

impl fmt::Debug for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference({})", self.kind().name())
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
