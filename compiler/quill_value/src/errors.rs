//! Evaluation errors.
//!
//! `EvalErrorKind` gives each failure a structured category; the factory
//! functions below are the way errors are built, and fill in both the kind
//! and the user-facing message. The evaluator attaches spans as errors
//! unwind and converts them into positioned errors at its boundary.

use crate::Value;
use quill_ir::Span;
use std::fmt;

/// Result of evaluating one expression.
pub type EvalResult = Result<Value, EvalError>;

/// Coarse error taxonomy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Operator, conversion or call applied to incompatible categories.
    Type,
    /// Index or slice bound violations.
    Range,
    /// Argument or result count mismatches.
    Arity,
    /// Division by zero, lossy implicit narrowing, non-finite numbers.
    Domain,
    /// Memory quota exhausted; fatal to the execution.
    Resource,
    /// Names that do not resolve.
    Name,
    /// Invariant violations and failures raised by host code.
    Internal,
}

/// Structured error kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Type
    InvalidBinaryOp {
        left: String,
        op: &'static str,
        right: String,
    },
    InvalidUnaryOp {
        op: &'static str,
        operand: String,
    },
    CannotConvert {
        from: String,
        to: String,
    },
    NotCallable {
        type_name: String,
    },
    ArgumentType {
        expected: String,
        got: String,
    },
    WrongType {
        expected: String,
        got: String,
    },
    NotAType {
        name: String,
    },
    Unhashable {
        type_name: String,
    },
    NotIndexable {
        type_name: String,
    },
    NonMutableMap,
    ImplementationType {
        type_name: String,
    },

    // Range
    IndexOutOfRange {
        index: i64,
    },
    NegativeIndex {
        index: String,
    },
    NilIndex {
        index: String,
    },
    SliceBounds,

    // Arity
    ArityMismatch {
        callee: String,
    },
    ResultCount {
        expected: usize,
        got: usize,
    },
    UsedAsValue,

    // Domain
    DivisionByZero,
    TruncatedToInteger {
        number: String,
    },
    IntOverflow {
        number: String,
    },
    NonFinite,

    // Resource
    OutOfMemory,

    // Name
    Undefined {
        name: String,
    },
    FieldNotFound {
        field: String,
    },
    BuiltinNotCalled {
        name: String,
    },
    UntypedNil,
    NilDereference,

    // Internal
    UnexpectedNode {
        kind: String,
    },
    HostPanic,
    Host,
    InvalidTag {
        field: String,
    },
    Custom,
}

impl EvalErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidBinaryOp { .. }
            | Self::InvalidUnaryOp { .. }
            | Self::CannotConvert { .. }
            | Self::NotCallable { .. }
            | Self::ArgumentType { .. }
            | Self::WrongType { .. }
            | Self::NotAType { .. }
            | Self::Unhashable { .. }
            | Self::NotIndexable { .. }
            | Self::NonMutableMap
            | Self::ImplementationType { .. } => ErrorCategory::Type,
            Self::IndexOutOfRange { .. }
            | Self::NegativeIndex { .. }
            | Self::NilIndex { .. }
            | Self::SliceBounds => {
                ErrorCategory::Range
            }
            Self::ArityMismatch { .. } | Self::ResultCount { .. } | Self::UsedAsValue => {
                ErrorCategory::Arity
            }
            Self::DivisionByZero
            | Self::TruncatedToInteger { .. }
            | Self::IntOverflow { .. }
            | Self::NonFinite => ErrorCategory::Domain,
            Self::OutOfMemory => ErrorCategory::Resource,
            Self::Undefined { .. }
            | Self::FieldNotFound { .. }
            | Self::BuiltinNotCalled { .. }
            | Self::UntypedNil
            | Self::NilDereference => ErrorCategory::Name,
            Self::UnexpectedNode { .. }
            | Self::HostPanic
            | Self::Host
            | Self::InvalidTag { .. }
            | Self::Custom => ErrorCategory::Internal,
        }
    }
}

/// Error raised while evaluating an expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// Innermost source span the error was raised at, once known.
    pub span: Option<Span>,
}

impl EvalError {
    /// Uncategorized error.
    #[cold]
    pub fn new(message: impl Into<String>) -> Self {
        EvalError::from_kind(EvalErrorKind::Custom, message)
    }

    #[cold]
    pub fn from_kind(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach `span` unless a more precise one is already present.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Type errors

#[cold]
pub fn binary_type_mismatch(left: &str, op: &'static str, right: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::InvalidBinaryOp {
            left: left.to_owned(),
            op,
            right: right.to_owned(),
        },
        format!("invalid operation: {left} {op} {right}"),
    )
}

#[cold]
pub fn invalid_unary_op(op: &'static str, operand: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::InvalidUnaryOp {
            op,
            operand: operand.to_owned(),
        },
        format!("invalid operation: {op} {operand}"),
    )
}

/// Operand of `&&`/`||` that is not a bool.
#[cold]
pub fn non_bool_logical(op: &'static str, operand: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::InvalidUnaryOp {
            op,
            operand: operand.to_owned(),
        },
        format!("invalid operation: operator {op} not defined on {operand}"),
    )
}

#[cold]
pub fn cannot_convert(expr: &str, from: &str, to: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::CannotConvert {
            from: from.to_owned(),
            to: to.to_owned(),
        },
        format!("cannot convert {expr} (type {from}) to type {to}"),
    )
}

#[cold]
pub fn cannot_convert_nil(to: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::CannotConvert {
            from: "nil".to_owned(),
            to: to.to_owned(),
        },
        format!("cannot convert nil to type {to}"),
    )
}

#[cold]
pub fn not_callable(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotCallable {
            type_name: type_name.to_owned(),
        },
        format!("cannot call non-function {expr} (type {type_name})"),
    )
}

#[cold]
pub fn argument_type_mismatch(expr: &str, got: &str, expected: &str, callee: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ArgumentType {
            expected: expected.to_owned(),
            got: got.to_owned(),
        },
        format!("cannot use {expr} (type {got}) as type {expected} in argument to {callee}"),
    )
}

#[cold]
pub fn nil_argument(expected: &str, callee: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ArgumentType {
            expected: expected.to_owned(),
            got: "nil".to_owned(),
        },
        format!("cannot use nil as type {expected} in argument to {callee}"),
    )
}

/// Failed single-value type assertion.
#[cold]
pub fn wrong_type(expr: &str, got: &str, expected: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::WrongType {
            expected: expected.to_owned(),
            got: got.to_owned(),
        },
        format!("{expr} is {got}, not {expected}"),
    )
}

#[cold]
pub fn not_a_type(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotAType {
            name: name.to_owned(),
        },
        format!("{name} is not a type"),
    )
}

#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Unhashable {
            type_name: type_name.to_owned(),
        },
        format!("hash of unhashable type {type_name}"),
    )
}

#[cold]
pub fn not_indexable(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotIndexable {
            type_name: type_name.to_owned(),
        },
        format!("invalid operation: {expr} (type {type_name} does not support indexing)"),
    )
}

#[cold]
pub fn not_sliceable(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotIndexable {
            type_name: type_name.to_owned(),
        },
        format!("cannot slice {expr} (type {type_name})"),
    )
}

#[cold]
pub fn not_a_map(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotIndexable {
            type_name: type_name.to_owned(),
        },
        format!("invalid operation: {expr} (type {type_name} is not map)"),
    )
}

#[cold]
pub fn non_mutable_map() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NonMutableMap, "cannot delete from non-mutable map")
}

#[cold]
pub fn delete_requires_map(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::WrongType {
            expected: "map".to_owned(),
            got: type_name.to_owned(),
        },
        format!("first argument to delete must be map; have {type_name}"),
    )
}

#[cold]
pub fn invalid_len_argument(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::WrongType {
            expected: "string, slice or map".to_owned(),
            got: type_name.to_owned(),
        },
        format!("invalid argument {expr} (type {type_name}) for len"),
    )
}

/// Host kind that has no value-model counterpart (complex numbers, raw pointers).
#[cold]
pub fn implementation_type(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ImplementationType {
            type_name: type_name.to_owned(),
        },
        format!("cannot use {type_name} as implementation type"),
    )
}

// Range errors

#[cold]
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IndexOutOfRange { index },
        format!("index out of range [{index}] with length {len}"),
    )
}

/// Indexing a nil container that is not the literal `nil`. `index` is
/// the index expression's source text.
#[cold]
pub fn nil_index_out_of_range(index: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NilIndex {
            index: index.to_owned(),
        },
        format!("index out of range [{index}] with length 0"),
    )
}

#[cold]
pub fn negative_index(index: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NegativeIndex {
            index: index.to_owned(),
        },
        format!("invalid slice index {index} (index must be non-negative)"),
    )
}

#[cold]
pub fn non_integer_index(expr: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::WrongType {
            expected: "int".to_owned(),
            got: type_name.to_owned(),
        },
        format!("non-integer slice index {expr} (type {type_name})"),
    )
}

#[cold]
pub fn inverted_slice_bounds(low: i64, high: i64) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::SliceBounds,
        format!("invalid slice index: {low} > {high}"),
    )
}

/// `[low:high]` past the end of a sequence of `len` elements. Names the
/// high bound when it is the one out of range.
#[cold]
pub fn slice_bounds_out_of_range(low: usize, high: Option<usize>, len: usize) -> EvalError {
    let message = match high {
        Some(high) if high > len => format!("slice bounds out of range [:{high}] with length {len}"),
        _ => format!("slice bounds out of range [{low}:{len}]"),
    };
    EvalError::from_kind(EvalErrorKind::SliceBounds, message)
}

// Arity errors

/// Argument count mismatch, in the two-line have/want shape.
#[cold]
pub fn wrong_argument_count(callee: &str, too_many: bool, have: &str, want: &str) -> EvalError {
    let which = if too_many { "too many" } else { "not enough" };
    EvalError::from_kind(
        EvalErrorKind::ArityMismatch {
            callee: callee.to_owned(),
        },
        format!("{which} arguments in call to {callee}\n\thave {have}\n\twant {want}"),
    )
}

/// Argument count mismatch for `len`, `delete` and conversions.
#[cold]
pub fn builtin_argument_count(what: &str, call: &str, too_many: bool) -> EvalError {
    let which = if too_many { "too many" } else { "missing" };
    let noun = if too_many { "arguments" } else { "argument" };
    EvalError::from_kind(
        EvalErrorKind::ArityMismatch {
            callee: what.to_owned(),
        },
        format!("{which} {noun} to {what}: {call}"),
    )
}

#[cold]
pub fn used_as_value(call: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UsedAsValue, format!("{call} used as value"))
}

#[cold]
pub fn multiple_value_in_single_context(call: &str, got: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ResultCount { expected: 1, got },
        format!("multiple-value {call} in single-value context"),
    )
}

#[cold]
pub fn assignment_mismatch(expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::ResultCount { expected, got },
        format!("assignment mismatch: {expected} variables but {got} values"),
    )
}

#[cold]
pub fn evaluated_but_not_used(expr: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UsedAsValue, format!("{expr} evaluated but not used"))
}

// Domain errors

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero, "number divide by zero")
}

#[cold]
pub fn truncated_to_integer(number: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::TruncatedToInteger {
            number: number.to_owned(),
        },
        format!("number {number} truncated to integer"),
    )
}

#[cold]
pub fn int_overflow(number: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::IntOverflow {
            number: number.to_owned(),
        },
        format!("number {number} overflows int"),
    )
}

#[cold]
pub fn non_finite_number(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NonFinite,
        format!("cannot use non-finite {type_name} as number"),
    )
}

// Resource errors

#[cold]
pub fn out_of_memory() -> EvalError {
    EvalError::from_kind(EvalErrorKind::OutOfMemory, "out of memory")
}

// Name errors

#[cold]
pub fn undefined(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Undefined {
            name: name.to_owned(),
        },
        format!("undefined: {name}"),
    )
}

#[cold]
pub fn field_not_found(field: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::FieldNotFound {
            field: field.to_owned(),
        },
        format!("field {field:?} does not exist"),
    )
}

#[cold]
pub fn builtin_not_called(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::BuiltinNotCalled {
            name: name.to_owned(),
        },
        format!("use of builtin {name} not in function call"),
    )
}

#[cold]
pub fn untyped_nil() -> EvalError {
    EvalError::from_kind(EvalErrorKind::UntypedNil, "use of untyped nil")
}

#[cold]
pub fn nil_dereference() -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NilDereference,
        "invalid memory address or nil pointer dereference",
    )
}

// Internal errors

#[cold]
pub fn unexpected_node(kind: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::UnexpectedNode {
            kind: kind.to_owned(),
        },
        format!("unexpected node type {kind}"),
    )
}

#[cold]
pub fn host_panic(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::HostPanic, message)
}

#[cold]
pub fn host_error(message: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Host, message)
}

#[cold]
pub fn invalid_tag(field: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::InvalidTag {
            field: field.to_owned(),
        },
        format!("invalid tag of field {field:?}"),
    )
}
