//! The environment as the evaluator's memory budget.

use crate::Env;
use pretty_assertions::assert_eq;
use quill_eval::EvaluatorBuilder;
use quill_ir::SharedInterner;
use quill_parse::parse_expression;
use quill_value::{ErrorCategory, Value};
use std::sync::Arc;

fn eval_with_env(source: &str, env: &Arc<Env>) -> Result<Value, quill_eval::Error> {
    let interner = SharedInterner::default();
    let parsed = parse_expression(source, &interner).unwrap();
    let mut evaluator = EvaluatorBuilder::new(&parsed.arena, &interner)
        .source(source)
        .quota(Arc::clone(env) as Arc<dyn quill_value::MemoryQuota>)
        .global("s", Value::string("abcd"))
        .build();
    evaluator.eval(parsed.root)
}

#[test]
fn evaluator_allocations_are_charged() {
    let env = Arc::new(Env::builder().memory_limit(10).build());
    assert_eq!(eval_with_env("s + s", &env).unwrap(), Value::string("abcdabcd"));
    assert_eq!(env.free_memory(), Some(2));

    let err = eval_with_env("s + s", &env).unwrap_err();
    assert_eq!(err.message, "out of memory");
    assert_eq!(err.category(), ErrorCategory::Resource);
    assert!(err.is_fatal());
}

#[test]
fn unlimited_env() {
    let env = Arc::new(Env::new());
    assert_eq!(eval_with_env("len(s + s)", &env).unwrap(), Value::int(8));
    assert_eq!(env.free_memory(), None);
}
