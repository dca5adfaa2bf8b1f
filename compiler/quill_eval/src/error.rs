//! Positioned errors returned at the evaluation boundary.

use quill_ir::Position;
use quill_value::{ErrorCategory, EvalErrorKind};
use std::sync::Arc;
use thiserror::Error;

/// An evaluation failure with its source location.
///
/// Renders as `path:line:column: message`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{path}:{position}: {message}")]
pub struct Error {
    pub path: Arc<str>,
    pub position: Position,
    pub message: String,
    pub kind: EvalErrorKind,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Whether the failure ends the execution rather than the expression.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Resource
    }
}
