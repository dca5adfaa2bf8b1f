//! Explicit conversions (`int(x)`, `string(x)`, ...) and type membership
//! for type assertions.

use quill_value::errors::{cannot_convert, cannot_convert_nil, int_overflow};
use quill_value::{
    Decimal, ElemKind, EvalError, EvalResult, MapValue, SliceValue, Value, ValueType,
};

/// Convert a normalized `value` to `ty`. `expr` is the source text of the
/// converted expression, for messages.
///
/// Decimal to int truncates toward zero. Nil converts to a nil map or nil
/// slice. Sequences of code points convert to strings element-wise.
pub fn convert(value: Value, ty: ValueType, expr: &str) -> EvalResult {
    let converted = match (ty, &value) {
        (ValueType::String, Value::Str(_)) => Some(value.clone()),
        (ValueType::String, Value::Html(s)) => Some(Value::Str(s.clone())),
        (ValueType::Html, Value::Str(s)) => Some(Value::Html(s.clone())),
        (ValueType::Html, Value::Html(_)) => Some(value.clone()),
        (ValueType::String | ValueType::Html, _) => {
            text_of(&value)?.map(|text| wrap_text(ty, text))
        }
        (ValueType::Number | ValueType::Int, Value::Int(_))
        | (ValueType::Number, Value::Decimal(_))
        | (ValueType::Bool, Value::Bool(_))
        | (ValueType::Map, Value::Map(_) | Value::Struct(_))
        | (ValueType::Slice, Value::Slice(_)) => Some(value.clone()),
        (ValueType::Int, Value::Decimal(d)) => Some(Value::Int(
            d.int_part().ok_or_else(|| int_overflow(&d.to_string()))?,
        )),
        (ValueType::Map, Value::Nil) => Some(Value::Map(MapValue::nil())),
        (ValueType::Slice, Value::Nil) => Some(Value::Slice(SliceValue::nil(ElemKind::Boxed))),
        (ValueType::Slice, Value::Str(s) | Value::Html(s)) => Some(Value::Slice(SliceValue::runes(s))),
        _ => None,
    };
    match converted {
        Some(v) => Ok(v),
        None if matches!(value, Value::Nil) => Err(cannot_convert_nil(ty.name())),
        None => Err(cannot_convert(expr, value.type_name(), ty.name())),
    }
}

fn wrap_text(ty: ValueType, text: String) -> Value {
    if ty == ValueType::Html {
        Value::html(text)
    } else {
        Value::string(text)
    }
}

/// String form of a number (as a code point) or of a sequence of code
/// points. `None` when the value has no such form.
fn text_of(value: &Value) -> Result<Option<String>, EvalError> {
    Ok(match value {
        Value::Int(n) => Some(code_point(*n).to_string()),
        Value::Decimal(d) => d.to_i64().map(|n| code_point(n).to_string()),
        Value::Slice(s) => Some(slice_to_string(s)?),
        _ => None,
    })
}

/// Character for code point `n`, or U+FFFD when `n` is not one.
fn code_point(n: i64) -> char {
    u32::try_from(n)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Concatenate the elements of `s` as code points. Elements that are not
/// exact integers become U+FFFD.
pub fn slice_to_string(s: &SliceValue) -> Result<String, EvalError> {
    let mut out = String::with_capacity(s.len());
    for element in s.to_values()? {
        let c = match quill_value::normalize_value(element) {
            Value::Int(n) => code_point(n),
            Value::Decimal(d) => d.to_i64().map_or(char::REPLACEMENT_CHARACTER, code_point),
            _ => char::REPLACEMENT_CHARACTER,
        };
        out.push(c);
    }
    Ok(out)
}

/// Whether `value` belongs to `ty`, as checked by `x.(T)`.
///
/// `string` holds markup too, `number` holds ints, `int` holds decimals
/// that are exact integers in range, and `map` holds host structs.
pub fn has_type(value: &Value, ty: ValueType) -> bool {
    match (value, ty) {
        (Value::Str(_), ValueType::String)
        | (Value::Html(_), ValueType::String | ValueType::Html)
        | (Value::Int(_), ValueType::Int | ValueType::Number)
        | (Value::Decimal(_), ValueType::Number)
        | (Value::Bool(_), ValueType::Bool)
        | (Value::Slice(_), ValueType::Slice)
        | (Value::Map(_) | Value::Struct(_), ValueType::Map) => true,
        (Value::Decimal(d), ValueType::Int) => is_int(d),
        _ => false,
    }
}

fn is_int(d: &Decimal) -> bool {
    d.to_i64().is_some()
}
