//! Indexing, slicing, selectors and type assertions.
//!
//! Each returns the value together with a found flag; single-value
//! contexts discard the flag, two-value contexts report it instead of
//! failing on a missing key.

use super::Evaluator;
use crate::coerce::to_index;
use crate::conversion::has_type;
use quill_ir::{ExprId, ExprKind, Name};
use quill_value::errors::{
    assignment_mismatch, field_not_found, index_out_of_range, inverted_slice_bounds,
    nil_index_out_of_range, not_a_map, not_a_type, not_indexable, not_sliceable,
    slice_bounds_out_of_range, undefined, untyped_nil, wrong_type,
};
use quill_value::{normalize_value, EvalError, EvalResult, MapKey, Value, ValueType};

type Found = Result<(Value, bool), EvalError>;

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// Byte range of runes `low..high` of `s`. `None` when a bound passes the
/// end of the string.
fn rune_range(s: &str, low: usize, high: Option<usize>) -> Option<&str> {
    let mut offsets = s
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(s.len()));
    let start = offsets.nth(low)?;
    let end = match high {
        None => s.len(),
        Some(high) => match high.checked_sub(low + 1) {
            Some(skip) => offsets.nth(skip)?,
            None => start,
        },
    };
    s.get(start..end)
}

impl Evaluator<'_> {
    fn untyped_nil_at(&self, id: ExprId) -> EvalError {
        untyped_nil().with_span(self.arena.span(id))
    }

    fn eval_position(&mut self, id: ExprId) -> Result<usize, EvalError> {
        let value = normalize_value(self.eval_expr(id)?);
        to_index(&value, &self.expr_text(id)).map_err(|err| err.with_span(self.arena.span(id)))
    }

    fn eval_key(&mut self, id: ExprId) -> Result<MapKey, EvalError> {
        let key = normalize_value(self.eval_expr(id)?);
        MapKey::from_value(&key).map_err(|err| err.with_span(self.arena.span(id)))
    }

    /// `receiver[index]`.
    pub(super) fn eval_index(
        &mut self,
        id: ExprId,
        receiver: ExprId,
        index: ExprId,
        comma_ok: bool,
    ) -> Found {
        let container = self.eval_expr(receiver)?;
        match container {
            Value::Nil if self.is_nil_literal(receiver) => Err(self.untyped_nil_at(receiver)),
            Value::Nil => Err(nil_index_out_of_range(&self.expr_text(index))),
            Value::Str(_) | Value::Html(_) | Value::Slice(_) if comma_ok => {
                Err(assignment_mismatch(2, 1))
            }
            Value::Str(s) | Value::Html(s) => {
                let position = self.eval_position(index)?;
                match s.chars().nth(position) {
                    Some(c) => Ok((Value::string(c.to_string()), true)),
                    None => Err(index_out_of_range(signed(position), s.chars().count())),
                }
            }
            Value::Slice(s) => {
                let position = self.eval_position(index)?;
                Ok((s.index(position)?, true))
            }
            Value::Map(m) => {
                if m.is_nil() {
                    return Err(nil_index_out_of_range(&self.expr_text(index)));
                }
                let key = self.eval_key(index)?;
                Ok(m.get(&key).map_or((Value::Nil, false), |value| (value, true)))
            }
            Value::Struct(s) => {
                let key = normalize_value(self.eval_expr(index)?);
                let Some(name) = key.as_str() else {
                    return Err(not_indexable(&self.expr_text(id), s.struct_type().name()));
                };
                match self.struct_keys.lookup(&s, name)? {
                    Some(value) => Ok((value, true)),
                    None if comma_ok => Ok((Value::Nil, false)),
                    None => Err(field_not_found(name)),
                }
            }
            other => Err(not_indexable(&self.expr_text(id), other.type_name())),
        }
    }

    /// `receiver[low:high]`. Bounds are evaluated before the receiver.
    pub(super) fn eval_slicing(
        &mut self,
        receiver: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
    ) -> EvalResult {
        let lo = match low {
            Some(id) => self.eval_position(id)?,
            None => 0,
        };
        let hi = match high {
            Some(id) => Some(self.eval_position(id)?),
            None => None,
        };
        if let Some(hi) = hi {
            if lo > hi {
                return Err(inverted_slice_bounds(signed(lo), signed(hi)));
            }
        }
        let container = self.eval_expr(receiver)?;
        match container {
            Value::Nil if self.is_nil_literal(receiver) => Err(self.untyped_nil_at(receiver)),
            Value::Nil => Err(slice_bounds_out_of_range(lo, hi, 0)),
            Value::Str(s) | Value::Html(s) => {
                let part = rune_range(&s, lo, hi)
                    .ok_or_else(|| slice_bounds_out_of_range(lo, hi, s.chars().count()))?;
                self.alloc(part.len())?;
                Ok(Value::string(part))
            }
            Value::Slice(s) => {
                let len = s.len();
                let high = hi.unwrap_or(len);
                if high > len {
                    return Err(slice_bounds_out_of_range(lo, hi, len));
                }
                s.reslice(lo, high)
                    .map(Value::Slice)
                    .ok_or_else(|| slice_bounds_out_of_range(lo, hi, len))
            }
            other => Err(not_sliceable(&self.expr_text(receiver), other.type_name())),
        }
    }

    /// `receiver.field` on packages, maps and host structs.
    pub(super) fn eval_selector(&mut self, receiver: ExprId, field: Name, comma_ok: bool) -> Found {
        let container = self.eval_expr(receiver)?;
        let name = self.interner.lookup(field);
        let found = match &container {
            Value::Package(package) => {
                return package
                    .lookup(&name)
                    .map(|value| (value, true))
                    .ok_or_else(|| undefined(&format!("{}.{name}", package.name())));
            }
            Value::Map(m) => m.get(&MapKey::string(&name)),
            Value::Struct(s) => self.struct_keys.lookup(s, &name)?,
            other => return Err(not_a_map(&self.expr_text(receiver), other.type_name())),
        };
        match found {
            Some(value) => Ok((value, true)),
            None if comma_ok => Ok((Value::Nil, false)),
            None => Err(field_not_found(&name)),
        }
    }

    /// `expr.(T)`.
    pub(super) fn eval_type_assertion(&mut self, expr: ExprId, ty: ExprId, comma_ok: bool) -> Found {
        let target = match self.arena.kind(ty) {
            ExprKind::Ident(name) => self.env.lookup(name).cloned(),
            _ => None,
        };
        let Some(Value::Type(target)) = target else {
            return Err(not_a_type(&self.expr_text(ty)).with_span(self.arena.span(ty)));
        };
        let value = normalize_value(self.eval_expr(expr)?);
        if !has_type(&value, target) {
            if comma_ok {
                return Ok((Value::Nil, false));
            }
            return Err(wrong_type(&self.expr_text(expr), value.type_name(), target.name()));
        }
        let exact = match &value {
            Value::Decimal(d) if target == ValueType::Int => d.to_i64(),
            _ => None,
        };
        Ok((exact.map_or(value, Value::Int), true))
    }
}
