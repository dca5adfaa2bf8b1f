//! Binary operator implementations.
//!
//! Dispatch is a match on the pair of operand categories. Integer
//! arithmetic that overflows is redone exactly in [`Decimal`]; mixed
//! integer/decimal operands are promoted before operating.

use quill_ir::BinaryOp;
use quill_value::errors::{binary_type_mismatch, division_by_zero};
use quill_value::{escape_html, Decimal, EvalResult, Value, DIVISION_PRECISION};
use std::cmp::Ordering;

/// Evaluate `left op right` with the default division precision.
///
/// Both operands must already be normalized. `&&` and `||` are accepted
/// on bools; short-circuiting is the caller's business.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    evaluate_binary_with_precision(left, right, op, DIVISION_PRECISION)
}

/// Like [`evaluate_binary`], rounding non-terminating quotients to
/// `precision` fractional digits.
pub fn evaluate_binary_with_precision(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    precision: u32,
) -> EvalResult {
    let mismatch = || binary_type_mismatch(left.type_name(), op.as_symbol(), right.type_name());
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Ok(Value::string(format!("{}{}", &**a, &**b))),
            (Value::Str(a), Value::Html(b)) => Ok(Value::html(escape_html(a) + &**b)),
            (Value::Html(a), Value::Str(b)) => Ok(Value::html(format!("{}{}", &**a, escape_html(b)))),
            (Value::Html(a), Value::Html(b)) => Ok(Value::html(format!("{}{}", &**a, &**b))),
            _ => arithmetic(left, right, op, precision).ok_or_else(mismatch)?,
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(left, right, op, precision).ok_or_else(mismatch)?
        }
        BinaryOp::Eq => compare(left, right).map(|o| Value::Bool(o == Ordering::Equal)).ok_or_else(mismatch),
        BinaryOp::NotEq => compare(left, right).map(|o| Value::Bool(o != Ordering::Equal)).ok_or_else(mismatch),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            if matches!((left, right), (Value::Bool(_), Value::Bool(_))) {
                return Err(mismatch());
            }
            let ordering = compare(left, right).ok_or_else(mismatch)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == BinaryOp::And {
                *a && *b
            } else {
                *a || *b
            })),
            _ => Err(mismatch()),
        },
    }
}

/// Numeric `+ - * / %`; `None` when the operands are not both numbers.
fn arithmetic(left: &Value, right: &Value, op: BinaryOp, precision: u32) -> Option<EvalResult> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(int_arithmetic(*a, *b, op, precision)),
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            let a = left.as_decimal()?;
            let b = right.as_decimal()?;
            Some(decimal_arithmetic(&a, &b, op, precision))
        }
        _ => None,
    }
}

fn int_arithmetic(a: i64, b: i64, op: BinaryOp, precision: u32) -> EvalResult {
    let exact = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Sub => a.checked_sub(b),
        BinaryOp::Mul => a.checked_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(division_by_zero());
            }
            match a.checked_rem(b) {
                Some(0) => a.checked_div(b),
                _ => None,
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(division_by_zero());
            }
            Some(a.wrapping_rem(b))
        }
        _ => None,
    };
    match exact {
        Some(n) => Ok(Value::Int(n)),
        None => decimal_arithmetic(&Decimal::from(a), &Decimal::from(b), op, precision),
    }
}

fn decimal_arithmetic(a: &Decimal, b: &Decimal, op: BinaryOp, precision: u32) -> EvalResult {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a.checked_div_round(b, precision).ok_or_else(division_by_zero)?,
        BinaryOp::Mod => a.checked_rem(b).ok_or_else(division_by_zero)?,
        _ => {
            return Err(binary_type_mismatch("number", op.as_symbol(), "number"));
        }
    };
    Ok(Value::decimal(result))
}

/// Ordering of two comparable operands.
///
/// Strings compare with markup strings by their text; integers compare
/// with decimals by value; bools only with bools.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Str(a) | Value::Html(a), Value::Str(b) | Value::Html(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Int(_) | Value::Decimal(_), Value::Int(_) | Value::Decimal(_)) => {
            Some(left.as_decimal()?.cmp(&right.as_decimal()?))
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
