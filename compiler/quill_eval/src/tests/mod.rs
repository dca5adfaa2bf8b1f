//! Evaluator tests.
//!
//! `operators_tests` exercise the operator functions directly; the other
//! modules parse source text, evaluate it and compare the results.

mod access_tests;
mod call_tests;
mod operators_tests;

use crate::{Error, Evaluator, EvaluatorBuilder};
use quill_ir::{ExprId, SharedInterner};
use quill_parse::parse_expression;
use quill_value::Value;

/// Parse `source`, build an evaluator through `setup`, and run `f` on the
/// root expression.
pub(super) fn run<T>(
    source: &str,
    setup: impl FnOnce(EvaluatorBuilder<'_>) -> EvaluatorBuilder<'_>,
    f: impl FnOnce(&mut Evaluator<'_>, ExprId) -> T,
) -> T {
    let interner = SharedInterner::default();
    let parsed = parse_expression(source, &interner).unwrap();
    let mut evaluator = setup(
        EvaluatorBuilder::new(&parsed.arena, &interner)
            .path("test.html")
            .source(source),
    )
    .build();
    f(&mut evaluator, parsed.root)
}

pub(super) fn eval(source: &str) -> Result<Value, Error> {
    run(source, |builder| builder, |evaluator, root| evaluator.eval(root))
}

pub(super) fn eval_with(source: &str, globals: Vec<(&str, Value)>) -> Result<Value, Error> {
    run(source, |builder| builder.globals(globals), |evaluator, root| evaluator.eval(root))
}

pub(super) fn eval2_with(source: &str, globals: Vec<(&str, Value)>) -> Result<(Value, Value), Error> {
    run(source, |builder| builder.globals(globals), |evaluator, root| evaluator.eval2(root))
}

/// Display form of the result of `source`.
pub(super) fn show(source: &str) -> String {
    eval(source).unwrap().to_string()
}

/// Message of the error `source` fails with.
pub(super) fn fails(source: &str) -> String {
    eval(source).unwrap_err().message
}

pub(super) fn fails_with(source: &str, globals: Vec<(&str, Value)>) -> String {
    eval_with(source, globals).unwrap_err().message
}
