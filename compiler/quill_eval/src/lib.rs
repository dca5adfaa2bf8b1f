#![allow(
    clippy::result_large_err,
    reason = "EvalError carries a structured kind and message; boxing it would cost an allocation per error"
)]
//! Quill Eval - expression evaluator for Quill templates.
//!
//! The evaluator uses:
//! - `Environment`: variable scoping with a scope stack
//! - `evaluate_binary` / `evaluate_unary`: enum-based operator dispatch
//! - `convert` / `coerce_argument`: explicit conversions and implicit
//!   argument coercion
//! - `StructKeyCache`: per-type field and method names of host structs
//! - `Value` and the error taxonomy from `quill_value`
//!
//! Build an [`Evaluator`] with [`EvaluatorBuilder`] and evaluate parsed
//! expressions in one of the four contexts (`eval`, `eval0`, `eval2`,
//! `eval_n`).

mod coerce;
mod conversion;
mod environment;
mod error;
pub mod interpreter;
mod operators;
mod struct_keys;
mod unary_operators;

pub use coerce::{coerce_argument, decimal_to_int, to_index};
pub use conversion::{convert, has_type, slice_to_string};
pub use environment::{AssignError, Environment, Scope};
pub use error::Error;
pub use interpreter::{EvalConfig, Evaluator, EvaluatorBuilder, ScopedEvaluator};
pub use operators::{compare, evaluate_binary, evaluate_binary_with_precision};
pub use struct_keys::{StructKey, StructKeyCache, StructKeys};
pub use unary_operators::evaluate_unary;

pub use quill_value::{EvalError, EvalResult, Value};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=quill_eval=debug`
/// or `RUST_LOG=quill_eval=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
