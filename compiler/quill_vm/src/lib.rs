//! Quill VM - register file and execution environment.
//!
//! The bytecode dispatch loop drives a [`Registers`] file through its
//! typed accessors; negative addresses reach host storage through
//! [`Reference`]s. Arithmetic on boxed registers reuses the evaluator's
//! operators, so both execution strategies share one set of semantics.
//! An [`Env`] carries the execution's memory quota, cancellation and exit
//! callbacks and doubles as the evaluator's [`MemoryQuota`].
//!
//! [`MemoryQuota`]: quill_value::MemoryQuota

mod append;
mod env;
mod error;
mod reference;
mod registers;

pub use env::{CancelToken, Env, EnvBuilder};
pub use error::VmError;
pub use reference::{RefKind, Reference};
pub use registers::{Addr, Bank, Boxed, CallerFrame, Frame, FunctionConstants, Registers};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
