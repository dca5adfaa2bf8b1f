//! The register file.
//!
//! Four banks hold a running program's working values: integers (which
//! also carry booleans and every integer width), floats, strings, and a
//! general bank of boxed values and [`Reference`]s. A call frame owns one
//! window per bank, starting just after its base offset, so register `r`
//! of the current frame is `bank[fp + r]`.
//!
//! Addresses are small signed integers:
//! - `r > 0` names a slot of the current frame directly.
//! - `r < 0` names general slot `-r`, which must hold a reference; the
//!   access reads or writes the host storage behind it.
//! - `r == 0` is never a valid register.
//!
//! The `_k` accessors read constants when `k` is set. Integer, boolean and
//! float constants are the address itself; string and general constants
//! index the current function's constant pool.

use crate::{Reference, VmError};
use quill_eval::{evaluate_binary, evaluate_unary};
use quill_ir::{BinaryOp, UnaryOp};
use quill_value::{ElemKind, Heap, StrKind, Value};
use std::ops::Range;
use std::sync::Arc;

/// Register address.
pub type Addr = i8;

/// One of the four register banks.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Bank {
    Int = 0,
    Float = 1,
    String = 2,
    General = 3,
}

/// A general register: a boxed value or a reference to host storage.
#[derive(Clone, Debug)]
pub enum Boxed {
    Value(Value),
    Ref(Reference),
}

impl Default for Boxed {
    fn default() -> Self {
        Boxed::Value(Value::Nil)
    }
}

/// Immutable constants of one compiled function.
#[derive(Clone, Debug, Default)]
pub struct FunctionConstants {
    pub strings: Vec<Heap<str>>,
    pub general: Vec<Value>,
}

/// Base offset and window size of a call frame, per bank.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub fp: [u32; 4],
    pub size: [u32; 4],
}

/// What [`Registers::pop_frame`] needs to resume the caller.
#[derive(Debug)]
pub struct CallerFrame {
    frame: Frame,
    constants: Arc<FunctionConstants>,
}

/// How an address resolved.
enum Slot<'a> {
    Direct(usize),
    Indirect(&'a Reference),
}

/// Constant pool index of a `k` operand. Pools hold up to 256 entries.
fn constant_index(r: Addr) -> u8 {
    u8::from_ne_bytes(r.to_ne_bytes())
}

pub struct Registers {
    int: Vec<i64>,
    float: Vec<f64>,
    string: Vec<Heap<str>>,
    general: Vec<Boxed>,
    frame: Frame,
    constants: Arc<FunctionConstants>,
}

impl Registers {
    /// Registers with a top-level frame of `sizes` registers per bank.
    pub fn new(sizes: [u32; 4], constants: Arc<FunctionConstants>) -> Self {
        let mut registers = Registers {
            int: Vec::new(),
            float: Vec::new(),
            string: Vec::new(),
            general: Vec::new(),
            frame: Frame::default(),
            constants,
        };
        registers.frame.size = sizes;
        registers.reserve(registers.frame);
        registers
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn constants(&self) -> &Arc<FunctionConstants> {
        &self.constants
    }

    /// Enter a callee frame right after the current one.
    ///
    /// Returns the caller's frame, to be handed back to
    /// [`pop_frame`](Self::pop_frame) when the call returns.
    pub fn push_frame(&mut self, sizes: [u32; 4], constants: Arc<FunctionConstants>) -> CallerFrame {
        let caller = self.frame;
        let mut frame = Frame { fp: caller.fp, size: sizes };
        for (fp, size) in frame.fp.iter_mut().zip(caller.size) {
            *fp += size;
        }
        self.reserve(frame);
        tracing::trace!(fp = ?frame.fp, size = ?frame.size, "push frame");
        self.frame = frame;
        CallerFrame {
            frame: caller,
            constants: std::mem::replace(&mut self.constants, constants),
        }
    }

    /// Leave the current frame. General slots of the frame are cleared so
    /// no value or reference outlives the call.
    pub fn pop_frame(&mut self, caller: CallerFrame) {
        let Frame { fp, size } = self.frame;
        let start = fp[Bank::General as usize] as usize + 1;
        let end = start + size[Bank::General as usize] as usize;
        if let Some(window) = self.general.get_mut(start..end) {
            window.fill(Boxed::default());
        }
        self.frame = caller.frame;
        self.constants = caller.constants;
    }

    fn reserve(&mut self, frame: Frame) {
        let need = |bank: Bank| (frame.fp[bank as usize] + frame.size[bank as usize]) as usize + 1;
        if self.int.len() < need(Bank::Int) {
            self.int.resize(need(Bank::Int), 0);
        }
        if self.float.len() < need(Bank::Float) {
            self.float.resize(need(Bank::Float), 0.0);
        }
        if self.string.len() < need(Bank::String) {
            self.string.resize(need(Bank::String), Heap::default());
        }
        if self.general.len() < need(Bank::General) {
            self.general.resize(need(Bank::General), Boxed::default());
        }
    }

    /// Bank index of the direct register `r`.
    fn direct(&self, bank: Bank, r: Addr) -> Result<usize, VmError> {
        let offset = u32::try_from(r).map_err(|_| VmError::InvalidRegister(r))?;
        if offset == 0 || offset > self.frame.size[bank as usize] {
            return Err(VmError::InvalidRegister(r));
        }
        Ok((self.frame.fp[bank as usize] + offset) as usize)
    }

    /// Bank indices of the contiguous run `first .. first + len`, all
    /// inside the current frame.
    fn run(&self, bank: Bank, first: Addr, len: usize) -> Result<Range<usize>, VmError> {
        if len == 0 {
            return Ok(0..0);
        }
        let start = self.direct(bank, first)?;
        let limit = (self.frame.fp[bank as usize] + self.frame.size[bank as usize]) as usize;
        if start + len - 1 > limit {
            return Err(VmError::InvalidRegister(first));
        }
        Ok(start..start + len)
    }

    /// The reference held by general slot `-r`.
    fn indirect(&self, r: Addr) -> Result<&Reference, VmError> {
        let offset = u32::from(r.unsigned_abs());
        if offset > self.frame.size[Bank::General as usize] {
            return Err(VmError::InvalidRegister(r));
        }
        let index = (self.frame.fp[Bank::General as usize] + offset) as usize;
        match self.general.get(index) {
            Some(Boxed::Ref(reference)) => Ok(reference),
            Some(Boxed::Value(_)) => Err(VmError::NotAReference(r)),
            None => Err(VmError::InvalidRegister(r)),
        }
    }

    fn resolve(&self, bank: Bank, r: Addr) -> Result<Slot<'_>, VmError> {
        match r {
            0 => Err(VmError::InvalidRegister(0)),
            r if r > 0 => self.direct(bank, r).map(Slot::Direct),
            r => self.indirect(r).map(Slot::Indirect),
        }
    }

    // Integers and booleans

    pub fn int(&self, r: Addr) -> Result<i64, VmError> {
        match self.resolve(Bank::Int, r)? {
            Slot::Direct(i) => Ok(self.int[i]),
            Slot::Indirect(reference) => reference.get_int(),
        }
    }

    pub fn int_k(&self, r: Addr, k: bool) -> Result<i64, VmError> {
        if k {
            return Ok(i64::from(r));
        }
        self.int(r)
    }

    pub fn set_int(&mut self, r: Addr, n: i64) -> Result<(), VmError> {
        match self.resolve(Bank::Int, r)? {
            Slot::Direct(i) => {
                self.int[i] = n;
                Ok(())
            }
            Slot::Indirect(reference) => reference.set_int(n),
        }
    }

    fn update_int(&mut self, r: Addr, f: fn(i64) -> i64) -> Result<(), VmError> {
        match self.resolve(Bank::Int, r)? {
            Slot::Direct(i) => {
                self.int[i] = f(self.int[i]);
                Ok(())
            }
            Slot::Indirect(reference) => reference.update_int(f),
        }
    }

    pub fn inc_int(&mut self, r: Addr) -> Result<(), VmError> {
        self.update_int(r, |n| n.wrapping_add(1))
    }

    pub fn dec_int(&mut self, r: Addr) -> Result<(), VmError> {
        self.update_int(r, |n| n.wrapping_sub(1))
    }

    /// Booleans share the int bank: any positive value is true.
    pub fn bool(&self, r: Addr) -> Result<bool, VmError> {
        match self.resolve(Bank::Int, r)? {
            Slot::Direct(i) => Ok(self.int[i] > 0),
            Slot::Indirect(reference) => reference.get_bool(),
        }
    }

    pub fn bool_k(&self, r: Addr, k: bool) -> Result<bool, VmError> {
        if k {
            return Ok(r > 0);
        }
        self.bool(r)
    }

    pub fn set_bool(&mut self, r: Addr, b: bool) -> Result<(), VmError> {
        match self.resolve(Bank::Int, r)? {
            Slot::Direct(i) => {
                self.int[i] = i64::from(b);
                Ok(())
            }
            Slot::Indirect(reference) => reference.set_bool(b),
        }
    }

    // Floats

    pub fn float(&self, r: Addr) -> Result<f64, VmError> {
        match self.resolve(Bank::Float, r)? {
            Slot::Direct(i) => Ok(self.float[i]),
            Slot::Indirect(reference) => reference.get_float(),
        }
    }

    pub fn float_k(&self, r: Addr, k: bool) -> Result<f64, VmError> {
        if k {
            return Ok(f64::from(r));
        }
        self.float(r)
    }

    pub fn set_float(&mut self, r: Addr, f: f64) -> Result<(), VmError> {
        match self.resolve(Bank::Float, r)? {
            Slot::Direct(i) => {
                self.float[i] = f;
                Ok(())
            }
            Slot::Indirect(reference) => reference.set_float(f),
        }
    }

    fn update_float(&mut self, r: Addr, f: fn(f64) -> f64) -> Result<(), VmError> {
        match self.resolve(Bank::Float, r)? {
            Slot::Direct(i) => {
                self.float[i] = f(self.float[i]);
                Ok(())
            }
            Slot::Indirect(reference) => reference.update_float(f),
        }
    }

    pub fn inc_float(&mut self, r: Addr) -> Result<(), VmError> {
        self.update_float(r, |f| f + 1.0)
    }

    pub fn dec_float(&mut self, r: Addr) -> Result<(), VmError> {
        self.update_float(r, |f| f - 1.0)
    }

    // Strings

    pub fn string(&self, r: Addr) -> Result<Heap<str>, VmError> {
        match self.resolve(Bank::String, r)? {
            Slot::Direct(i) => Ok(self.string[i].clone()),
            Slot::Indirect(reference) => reference.get_string(),
        }
    }

    pub fn string_k(&self, r: Addr, k: bool) -> Result<Heap<str>, VmError> {
        if k {
            let index = constant_index(r);
            return self
                .constants
                .strings
                .get(usize::from(index))
                .cloned()
                .ok_or(VmError::MissingConstant(index));
        }
        self.string(r)
    }

    pub fn set_string(&mut self, r: Addr, s: Heap<str>) -> Result<(), VmError> {
        match self.resolve(Bank::String, r)? {
            Slot::Direct(i) => {
                self.string[i] = s;
                Ok(())
            }
            Slot::Indirect(reference) => reference.set_string(s),
        }
    }

    // General

    pub fn general(&self, r: Addr) -> Result<Value, VmError> {
        match self.resolve(Bank::General, r)? {
            Slot::Direct(i) => match &self.general[i] {
                Boxed::Value(value) => Ok(value.clone()),
                Boxed::Ref(_) => Err(VmError::UnexpectedReference(r)),
            },
            Slot::Indirect(reference) => reference.get(),
        }
    }

    pub fn general_k(&self, r: Addr, k: bool) -> Result<Value, VmError> {
        if k {
            let index = constant_index(r);
            return self
                .constants
                .general
                .get(usize::from(index))
                .cloned()
                .ok_or(VmError::MissingConstant(index));
        }
        self.general(r)
    }

    pub fn set_general(&mut self, r: Addr, value: Value) -> Result<(), VmError> {
        match self.resolve(Bank::General, r)? {
            Slot::Direct(i) => {
                self.general[i] = Boxed::Value(value);
                Ok(())
            }
            Slot::Indirect(reference) => reference.set(value),
        }
    }

    /// The reference held by the direct general register `r`.
    pub fn reference(&self, r: Addr) -> Result<Reference, VmError> {
        match &self.general[self.direct(Bank::General, r)?] {
            Boxed::Ref(reference) => Ok(reference.clone()),
            Boxed::Value(_) => Err(VmError::NotAReference(r)),
        }
    }

    /// Bind `reference` to the direct general register `r`, making `-r`
    /// read and write through it.
    pub fn set_reference(&mut self, r: Addr, reference: Reference) -> Result<(), VmError> {
        let i = self.direct(Bank::General, r)?;
        self.general[i] = Boxed::Ref(reference);
        Ok(())
    }

    // Kind dispatch

    /// Read `r` as an element of kind `kind`: booleans and integers from
    /// the int bank, floats from the float bank, strings from the string
    /// bank, anything else from the general bank.
    pub fn get_value(&self, r: Addr, kind: ElemKind, k: bool) -> Result<Value, VmError> {
        let value = match kind {
            ElemKind::Bool => Value::Bool(self.bool_k(r, k)?),
            ElemKind::Int(kind) => kind.to_value(kind.narrow(self.int_k(r, k)?)),
            ElemKind::Float(kind) => kind.to_value(self.float_k(r, k)?)?,
            ElemKind::Str(StrKind::String) => Value::Str(self.string_k(r, k)?),
            ElemKind::Str(StrKind::Html) => Value::Html(self.string_k(r, k)?),
            ElemKind::Boxed => self.general_k(r, k)?,
        };
        Ok(value)
    }

    /// Store `value` in the bank matching its category. Decimals and
    /// HTML strings are boxed so their category survives.
    pub fn set_value(&mut self, r: Addr, value: Value) -> Result<(), VmError> {
        match value {
            Value::Bool(b) => self.set_bool(r, b),
            Value::Int(n) => self.set_int(r, n),
            Value::Str(s) => self.set_string(r, s),
            other => self.set_general(r, other),
        }
    }

    // Boxed arithmetic

    /// `dst = left op right` over general registers; `right` may be a
    /// constant.
    pub fn binary_general(
        &mut self,
        op: BinaryOp,
        left: Addr,
        right: Addr,
        k: bool,
        dst: Addr,
    ) -> Result<(), VmError> {
        let result = evaluate_binary(&self.general(left)?, &self.general_k(right, k)?, op)?;
        self.set_general(dst, result)
    }

    /// `dst = op src` over general registers.
    pub fn unary_general(&mut self, op: UnaryOp, src: Addr, dst: Addr) -> Result<(), VmError> {
        let result = evaluate_unary(&self.general(src)?, op)?;
        self.set_general(dst, result)
    }

    pub(crate) fn int_run(&self, first: Addr, len: usize) -> Result<&[i64], VmError> {
        let range = self.run(Bank::Int, first, len)?;
        self.int.get(range).ok_or(VmError::InvalidRegister(first))
    }

    pub(crate) fn float_run(&self, first: Addr, len: usize) -> Result<&[f64], VmError> {
        let range = self.run(Bank::Float, first, len)?;
        self.float.get(range).ok_or(VmError::InvalidRegister(first))
    }

    pub(crate) fn string_run(&self, first: Addr, len: usize) -> Result<&[Heap<str>], VmError> {
        let range = self.run(Bank::String, first, len)?;
        self.string.get(range).ok_or(VmError::InvalidRegister(first))
    }

    pub(crate) fn general_run(&self, first: Addr, len: usize) -> Result<&[Boxed], VmError> {
        let range = self.run(Bank::General, first, len)?;
        self.general.get(range).ok_or(VmError::InvalidRegister(first))
    }
}
