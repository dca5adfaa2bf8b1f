//! Unary operator implementations.

use quill_ir::UnaryOp;
use quill_value::errors::invalid_unary_op;
use quill_value::{Decimal, EvalResult, Value};

/// Evaluate a unary operation on a normalized operand.
///
/// Negating the smallest `Int` promotes to `Decimal`.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> EvalResult {
    match (value, op) {
        (Value::Bool(b), UnaryOp::Not) => Ok(Value::Bool(!b)),
        (Value::Int(_) | Value::Decimal(_), UnaryOp::Pos) => Ok(value.clone()),
        (Value::Int(n), UnaryOp::Neg) => Ok(match n.checked_neg() {
            Some(n) => Value::Int(n),
            None => Value::decimal(-Decimal::from(*n)),
        }),
        (Value::Decimal(d), UnaryOp::Neg) => Ok(Value::decimal(-&**d)),
        _ => Err(invalid_unary_op(op.as_symbol(), value.type_name())),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn negation() {
        assert_eq!(evaluate_unary(&Value::int(5), UnaryOp::Neg).unwrap(), Value::int(-5));
        assert_eq!(
            evaluate_unary(&Value::int(i64::MIN), UnaryOp::Neg).unwrap().to_string(),
            "9223372036854775808"
        );
        let d = Value::decimal("1.5".parse().unwrap());
        assert_eq!(evaluate_unary(&d, UnaryOp::Neg).unwrap().to_string(), "-1.5");
    }

    #[test]
    fn plus_keeps_numbers() {
        assert_eq!(evaluate_unary(&Value::int(3), UnaryOp::Pos).unwrap(), Value::int(3));
        let err = evaluate_unary(&Value::string("a"), UnaryOp::Pos).unwrap_err();
        assert_eq!(err.message, "invalid operation: + string");
    }

    #[test]
    fn not_requires_bool() {
        assert_eq!(evaluate_unary(&Value::Bool(true), UnaryOp::Not).unwrap(), Value::Bool(false));
        let err = evaluate_unary(&Value::int(1), UnaryOp::Not).unwrap_err();
        assert_eq!(err.message, "invalid operation: ! int");
    }
}
