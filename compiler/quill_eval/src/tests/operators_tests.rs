//! Tests for binary and unary operator dispatch.

use crate::operators::{compare, evaluate_binary, evaluate_binary_with_precision};
use crate::unary_operators::evaluate_unary;
use proptest::prelude::*;
use quill_ir::{BinaryOp, UnaryOp};
use quill_value::{Decimal, Value};
use std::cmp::Ordering;

fn d(s: &str) -> Value {
    Value::decimal(s.parse::<Decimal>().unwrap())
}

fn binary(left: &Value, op: BinaryOp, right: &Value) -> String {
    match evaluate_binary(left, right, op) {
        Ok(value) => value.to_string(),
        Err(err) => format!("error: {}", err.message),
    }
}

mod arithmetic {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn int_results_stay_int() {
        assert_eq!(
            evaluate_binary(&Value::int(7), &Value::int(3), BinaryOp::Mod).unwrap(),
            Value::int(1)
        );
        assert_eq!(
            evaluate_binary(&Value::int(6), &Value::int(3), BinaryOp::Div).unwrap(),
            Value::int(2)
        );
        assert_eq!(
            evaluate_binary(&Value::int(-7), &Value::int(2), BinaryOp::Mod).unwrap(),
            Value::int(-1)
        );
    }

    #[test]
    fn inexact_division_rounds() {
        assert_eq!(
            binary(&Value::int(2), BinaryOp::Div, &Value::int(3)),
            "0.6666666666666666666666666667"
        );
        assert_eq!(binary(&Value::int(1), BinaryOp::Div, &Value::int(8)), "0.125");
        assert_eq!(
            evaluate_binary_with_precision(&Value::int(-2), &Value::int(3), BinaryOp::Div, 2)
                .unwrap()
                .to_string(),
            "-0.67"
        );
    }

    #[test]
    fn overflow_promotes() {
        assert_eq!(
            binary(&Value::int(i64::MAX), BinaryOp::Add, &Value::int(i64::MAX)),
            "18446744073709551614"
        );
        assert_eq!(
            binary(&Value::int(i64::MIN), BinaryOp::Mul, &Value::int(-1)),
            "9223372036854775808"
        );
        assert_eq!(
            binary(&Value::int(i64::MIN), BinaryOp::Div, &Value::int(-1)),
            "9223372036854775808"
        );
        assert_eq!(
            binary(&Value::int(i64::MIN), BinaryOp::Sub, &Value::int(1)),
            "-9223372036854775809"
        );
        assert_eq!(
            evaluate_binary(&Value::int(i64::MIN), &Value::int(-1), BinaryOp::Mod).unwrap(),
            Value::int(0)
        );
    }

    #[test]
    fn mixed_operands_promote() {
        assert_eq!(binary(&Value::int(1), BinaryOp::Add, &d("0.5")), "1.5");
        assert_eq!(binary(&d("7.2"), BinaryOp::Mod, &d("3.7")), "3.5");
        assert_eq!(binary(&Value::int(7), BinaryOp::Mod, &d("3.7")), "3.3");
        assert_eq!(binary(&d("1.5"), BinaryOp::Mul, &Value::int(2)), "3");
    }

    #[test]
    fn division_by_zero() {
        for op in [BinaryOp::Div, BinaryOp::Mod] {
            assert_eq!(binary(&Value::int(1), op, &Value::int(0)), "error: number divide by zero");
            assert_eq!(binary(&d("1.5"), op, &d("0.0")), "error: number divide by zero");
            assert_eq!(binary(&Value::int(1), op, &d("0")), "error: number divide by zero");
        }
    }

    #[test]
    fn unsupported_pairs() {
        assert_eq!(
            binary(&Value::Bool(true), BinaryOp::Add, &Value::Bool(false)),
            "error: invalid operation: bool + bool"
        );
        assert_eq!(
            binary(&Value::slice(vec![]), BinaryOp::Add, &Value::slice(vec![])),
            "error: invalid operation: slice + slice"
        );
        assert_eq!(
            binary(&Value::string("a"), BinaryOp::Sub, &Value::string("b")),
            "error: invalid operation: string - string"
        );
        assert_eq!(
            binary(&Value::string("a"), BinaryOp::Add, &Value::int(1)),
            "error: invalid operation: string + int"
        );
    }

    proptest! {
        #[test]
        fn int_arithmetic_is_exact(a in any::<i64>(), b in any::<i64>()) {
            let big = |n: i64| Decimal::from(n);
            let cases = [
                (BinaryOp::Add, &big(a) + &big(b)),
                (BinaryOp::Sub, &big(a) - &big(b)),
                (BinaryOp::Mul, &big(a) * &big(b)),
            ];
            for (op, expected) in cases {
                let got = evaluate_binary(&Value::int(a), &Value::int(b), op).unwrap();
                prop_assert_eq!(got.as_decimal(), Some(expected.clone()));
                let fits = expected.to_i64().is_some();
                prop_assert_eq!(matches!(got, Value::Int(_)), fits);
            }
        }
    }
}

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn concatenation_escapes_plain_operand() {
        let plain = Value::string("a<b");
        let html = Value::html("<i>");
        assert_eq!(
            evaluate_binary(&plain, &html, BinaryOp::Add).unwrap(),
            Value::html("a&lt;b<i>")
        );
        assert_eq!(
            evaluate_binary(&html, &plain, BinaryOp::Add).unwrap(),
            Value::html("<i>a&lt;b")
        );
        assert_eq!(
            evaluate_binary(&plain, &plain, BinaryOp::Add).unwrap(),
            Value::string("a<ba<b")
        );
    }

    #[test]
    fn html_compares_as_text() {
        assert_eq!(
            evaluate_binary(&Value::html("<b>"), &Value::string("<b>"), BinaryOp::Eq).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(compare(&Value::string("a"), &Value::html("b")), Some(Ordering::Less));
    }
}

mod comparison {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(compare(&Value::int(3), &d("3.00")), Some(Ordering::Equal));
        assert_eq!(compare(&d("2.5"), &Value::int(3)), Some(Ordering::Less));
        assert_eq!(
            evaluate_binary(&d("1.10"), &d("1.1"), BinaryOp::Eq).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn mismatched_categories_are_errors() {
        assert_eq!(
            binary(&Value::int(1), BinaryOp::Eq, &Value::string("1")),
            "error: invalid operation: int == string"
        );
        assert_eq!(
            binary(&Value::Bool(true), BinaryOp::Lt, &Value::Bool(false)),
            "error: invalid operation: bool < bool"
        );
        assert_eq!(
            evaluate_binary(&Value::Bool(true), &Value::Bool(false), BinaryOp::NotEq).unwrap(),
            Value::Bool(true)
        );
    }
}

mod unary {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn negation() {
        assert_eq!(evaluate_unary(&Value::int(5), UnaryOp::Neg).unwrap(), Value::int(-5));
        assert_eq!(
            evaluate_unary(&Value::int(i64::MIN), UnaryOp::Neg)
                .unwrap()
                .to_string(),
            "9223372036854775808"
        );
        assert_eq!(evaluate_unary(&d("1.5"), UnaryOp::Neg).unwrap(), d("-1.5"));
    }

    #[test]
    fn not_requires_bool() {
        assert_eq!(
            evaluate_unary(&Value::Bool(false), UnaryOp::Not).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            evaluate_unary(&Value::int(1), UnaryOp::Not).unwrap_err().message,
            "invalid operation: ! int"
        );
        assert_eq!(
            evaluate_unary(&Value::string("x"), UnaryOp::Pos).unwrap_err().message,
            "invalid operation: + string"
        );
    }
}
