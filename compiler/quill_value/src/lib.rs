#![allow(
    clippy::result_large_err,
    reason = "EvalError carries a structured kind and a message; boxing it would touch every operator"
)]
//! Quill value model.
//!
//! This crate provides:
//! - Runtime values ([`Value`], [`SliceValue`], [`MapValue`]) and the
//!   arbitrary-precision [`Decimal`]
//! - Host bindings: [`HostFunc`], [`StructType`], [`HostStruct`],
//!   [`HostPackage`], and [`normalize`] for host-produced [`Native`]s
//! - Evaluation errors ([`EvalError`], [`EvalErrorKind`], [`EvalResult`])
//!
//! Heap payloads are reference counted and immutable, except for the
//! backing buffers of slices and maps, which sit behind locks so values
//! can be shared by concurrent executions.

mod decimal;
pub mod errors;
mod host;
mod html;
mod native;
mod value;

pub use decimal::{Decimal, ParseDecimalError, DIVISION_PRECISION};
pub use errors::{ErrorCategory, EvalError, EvalErrorKind, EvalResult};
pub use host::{
    FieldDecl, HostFunc, HostPackage, HostResult, HostStruct, MethodDecl, ParamKind, Signature,
    StructType, StructTypeBuilder, StructTypeId,
};
pub use html::escape_html;
pub use native::{normalize, normalize_value, Native};
pub use value::{
    grow_capacity, Builtin, ElemKind, FloatKind, Heap, IntKind, MapKey, MapValue, Slice,
    SliceValue, StrKind, Value, ValueType,
};

/// Memory budget that allocating operations report to.
///
/// Positive sizes consume budget and negative sizes release it. An
/// implementation returns an out-of-memory error once the budget would
/// go negative.
pub trait MemoryQuota: Send + Sync {
    fn alloc(&self, bytes: i64) -> Result<(), EvalError>;
}
