//! Execution environment.
//!
//! One [`Env`] accompanies one execution. Apart from the register file,
//! which the execution owns outright, it is the only state an execution
//! shares with the outside: a supervising thread may read the remaining
//! memory, cancel the execution, or register exit callbacks while it runs.

use crate::VmError;
use parking_lot::Mutex;
use quill_value::errors::out_of_memory;
use quill_value::{EvalError, MemoryQuota};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation flag, shared by clones.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

type ExitFunc = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Exits {
    exited: bool,
    funcs: Vec<ExitFunc>,
}

pub struct Env {
    /// Remaining budget in bytes; `None` when memory is not limited.
    free_memory: Option<Mutex<i64>>,
    cancel: CancelToken,
    deadline: Option<Instant>,
    exits: Mutex<Exits>,
}

impl Env {
    /// Environment without limits.
    pub fn new() -> Self {
        EnvBuilder::new().build()
    }

    pub fn builder() -> EnvBuilder {
        EnvBuilder::new()
    }

    /// Allocate `bytes`, or release them when negative.
    ///
    /// Once the budget goes negative it stays there: every later
    /// allocation fails, and [`free_memory`](Self::free_memory) reports
    /// how far the budget was overdrawn.
    pub fn alloc(&self, bytes: i64) -> Result<(), VmError> {
        let Some(free_memory) = &self.free_memory else {
            return Ok(());
        };
        let mut free = free_memory.lock();
        if *free >= 0 {
            *free = free.saturating_sub(bytes);
        }
        if *free < 0 {
            tracing::warn!(requested = bytes, free = *free, "memory quota exhausted");
            return Err(VmError::OutOfMemory);
        }
        Ok(())
    }

    /// Remaining budget in bytes, or `None` when memory is not limited.
    pub fn free_memory(&self) -> Option<i64> {
        self.free_memory.as_ref().map(|free| *free.lock())
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the execution should stop. Polled between instructions,
    /// never in the middle of an expression.
    pub fn check(&self) -> Result<(), VmError> {
        if self.cancel.is_cancelled() {
            return Err(VmError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(VmError::DeadlineExceeded),
            _ => Ok(()),
        }
    }

    /// Run `f` when the execution ends. After [`exit`](Self::exit) it runs
    /// immediately.
    pub fn exit_func(&self, f: impl FnOnce() + Send + 'static) {
        let mut exits = self.exits.lock();
        if exits.exited {
            drop(exits);
            f();
        } else {
            exits.funcs.push(Box::new(f));
        }
    }

    /// Mark the execution as ended and run the exit callbacks in
    /// registration order. Later calls do nothing.
    pub fn exit(&self) {
        let funcs = {
            let mut exits = self.exits.lock();
            if exits.exited {
                return;
            }
            exits.exited = true;
            std::mem::take(&mut exits.funcs)
        };
        tracing::debug!(callbacks = funcs.len(), "execution exited");
        for f in funcs {
            f();
        }
    }

    pub fn is_exited(&self) -> bool {
        self.exits.lock().exited
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryQuota for Env {
    fn alloc(&self, bytes: i64) -> Result<(), EvalError> {
        Env::alloc(self, bytes).map_err(|_| out_of_memory())
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("free_memory", &self.free_memory())
            .field("cancelled", &self.cancel.is_cancelled())
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Env`].
#[derive(Default)]
pub struct EnvBuilder {
    memory_limit: Option<i64>,
    cancel: Option<CancelToken>,
    deadline: Option<Instant>,
    exits: Vec<ExitFunc>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the memory the execution may allocate, in bytes.
    #[must_use]
    pub fn memory_limit(mut self, bytes: i64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Share `token` so the caller can cancel the execution.
    #[must_use]
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now.
    #[must_use]
    pub fn timeout(self, timeout: Duration) -> Self {
        self.deadline(Instant::now() + timeout)
    }

    #[must_use]
    pub fn exit_func(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.exits.push(Box::new(f));
        self
    }

    pub fn build(self) -> Env {
        Env {
            free_memory: self.memory_limit.map(Mutex::new),
            cancel: self.cancel.unwrap_or_default(),
            deadline: self.deadline,
            exits: Mutex::new(Exits {
                exited: false,
                funcs: self.exits,
            }),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
