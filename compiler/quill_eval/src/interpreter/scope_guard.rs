//! RAII scope management for the evaluator.
//!
//! [`ScopedEvaluator`] pushes a scope on creation and pops it on drop, so
//! an early `?` return or an unwinding host panic never leaves a block's
//! bindings visible to the caller.

use super::Evaluator;
use quill_value::Value;
use std::ops::{Deref, DerefMut};

/// Evaluator with one extra scope that is popped when the guard drops.
pub struct ScopedEvaluator<'guard, 'a> {
    evaluator: &'guard mut Evaluator<'a>,
}

impl Drop for ScopedEvaluator<'_, '_> {
    fn drop(&mut self) {
        self.evaluator.env.pop_scope();
    }
}

impl<'a> Deref for ScopedEvaluator<'_, 'a> {
    type Target = Evaluator<'a>;

    fn deref(&self) -> &Self::Target {
        self.evaluator
    }
}

impl DerefMut for ScopedEvaluator<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.evaluator
    }
}

impl<'a> Evaluator<'a> {
    /// Push a scope that lives as long as the returned guard.
    pub fn scoped(&mut self) -> ScopedEvaluator<'_, 'a> {
        self.env.push_scope();
        ScopedEvaluator { evaluator: self }
    }

    /// Run `f` in a fresh scope holding `bindings`.
    pub fn with_bindings<'n, T, F, I>(&mut self, bindings: I, f: F) -> T
    where
        F: FnOnce(&mut ScopedEvaluator<'_, 'a>) -> T,
        I: IntoIterator<Item = (&'n str, Value)>,
    {
        let mut scoped = self.scoped();
        for (name, value) in bindings {
            scoped.define(name, value);
        }
        f(&mut scoped)
    }
}
