//! Register and execution faults.

use quill_value::EvalError;
use thiserror::Error;

/// A fault raised by register access or the execution environment.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum VmError {
    /// The memory quota was exhausted. Fatal to the execution.
    #[error("out of memory")]
    OutOfMemory,

    #[error("execution cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// Address `0`, or an address outside the current frame's window.
    #[error("invalid register {0}")]
    InvalidRegister(i8),

    /// An indirect address whose general slot holds a plain value.
    #[error("register {0} does not hold a reference")]
    NotAReference(i8),

    /// A direct general access to a slot holding a reference.
    #[error("register {0} holds a reference")]
    UnexpectedReference(i8),

    #[error("cannot use {reference} reference as {access}")]
    WrongReferenceKind {
        reference: &'static str,
        access: &'static str,
    },

    #[error("missing constant {0}")]
    MissingConstant(u8),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl VmError {
    /// Whether the fault ends the execution rather than the instruction.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            VmError::OutOfMemory | VmError::Cancelled | VmError::DeadlineExceeded
        )
    }
}
