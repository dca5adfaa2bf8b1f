//! Intermediate representation for Quill template expressions.
//!
//! - [`Span`], [`Position`], [`LineIndex`]: source locations
//! - [`Name`], [`StringInterner`]: interned identifiers and string literals
//! - [`BinaryOp`], [`UnaryOp`]: operators
//! - [`ExprArena`], [`ExprId`], [`ExprKind`]: the flat expression tree
//! - [`ExprPrinter`]: expression text for diagnostics
//!
//! Trees are immutable once built and may be shared by concurrent
//! evaluations.

mod arena;
mod expr;
mod expr_id;
mod interner;
mod name;
mod operators;
mod printer;
mod span;

pub use arena::ExprArena;
pub use expr::{ExprKind, MapEntry};
pub use expr_id::{ExprId, ExprRange, MapEntryRange};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use operators::{BinaryOp, UnaryOp};
pub use printer::ExprPrinter;
pub use span::{LineIndex, Position, Span};
