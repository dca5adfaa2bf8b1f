//! Implicit coercions: indices and host-call arguments.

use quill_value::errors::{
    argument_type_mismatch, int_overflow, negative_index, nil_argument, non_integer_index,
    truncated_to_integer,
};
use quill_value::{Decimal, ElemKind, EvalError, MapValue, ParamKind, SliceValue, Value};

/// Exact `i64` value of `d`.
///
/// Unlike `int(d)`, this never truncates: a fractional decimal is an
/// error, as is one outside the `Int` range.
pub fn decimal_to_int(d: &Decimal) -> Result<i64, EvalError> {
    if d.int_part().is_none() {
        return Err(int_overflow(&d.to_string()));
    }
    d.to_i64().ok_or_else(|| truncated_to_integer(&d.to_string()))
}

/// Non-negative index from a normalized value. `expr` is the index
/// expression's source text.
pub fn to_index(value: &Value, expr: &str) -> Result<usize, EvalError> {
    let n = match value {
        Value::Int(n) => *n,
        Value::Decimal(d) => decimal_to_int(d)?,
        other => return Err(non_integer_index(expr, other.type_name())),
    };
    usize::try_from(n).map_err(|_| negative_index(expr))
}

/// Coerce a normalized argument to the declared parameter kind.
///
/// `expr` is the argument's source text and `callee` the called
/// expression's, both for messages.
pub fn coerce_argument(
    value: Value,
    kind: ParamKind,
    expr: &str,
    callee: &str,
) -> Result<Value, EvalError> {
    let coerced = match (kind, value) {
        (_, Value::Nil) if kind.rejects_nil() => return Err(nil_argument(kind.name(), callee)),
        (ParamKind::Map, Value::Nil) => Value::Map(MapValue::nil()),
        (ParamKind::Slice, Value::Nil) => Value::Slice(SliceValue::nil(ElemKind::Boxed)),
        (ParamKind::Any | ParamKind::Func | ParamKind::Struct(_), Value::Nil) => Value::Nil,
        (ParamKind::Any, v) => v,
        (ParamKind::Int, Value::Decimal(d)) => Value::Int(decimal_to_int(&d)?),
        (ParamKind::Number, Value::Int(n)) => Value::decimal(Decimal::from(n)),
        (ParamKind::String, Value::Html(s)) => Value::Str(s),
        (ParamKind::Struct(name), Value::Struct(s)) if s.struct_type().name() == name => Value::Struct(s),
        (kind, v) if accepts(kind, &v) => v,
        (kind, v) => {
            return Err(argument_type_mismatch(expr, v.type_name(), kind.name(), callee));
        }
    };
    Ok(coerced)
}

fn accepts(kind: ParamKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (ParamKind::Bool, Value::Bool(_))
            | (ParamKind::Int, Value::Int(_))
            | (ParamKind::Number, Value::Decimal(_))
            | (ParamKind::String, Value::Str(_))
            | (ParamKind::Html, Value::Html(_))
            | (ParamKind::Map, Value::Map(_))
            | (ParamKind::Slice, Value::Slice(_))
            | (ParamKind::Func, Value::Func(_))
    )
}
