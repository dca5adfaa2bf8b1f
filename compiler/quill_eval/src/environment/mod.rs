//! Variable scopes for the evaluator.
//!
//! A stack of scopes rather than a parent-linked chain: the bottom scope
//! holds the predeclared builtins, the next one the globals bound at build
//! time, and everything above is pushed and popped by the statement layer.

use quill_ir::{Name, StringInterner};
use quill_value::{Builtin, Value, ValueType};
use rustc_hash::FxHashMap;

const BUILTINS: usize = 0;
const GLOBALS: usize = 1;

/// Error returned by [`Environment::assign`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignError {
    /// No scope binds the name.
    Undefined,
    /// The name resolves to a predeclared builtin.
    Builtin,
}

/// A single scope of bindings.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        self.bindings.insert(name, value);
    }

    #[inline]
    pub fn get(&self, name: Name) -> Option<&Value> {
        self.bindings.get(&name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Scope stack, innermost last.
#[derive(Clone, Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    /// Environment with the builtins scope and an empty globals scope.
    pub fn new(interner: &StringInterner) -> Self {
        let mut builtins = Scope::new();
        builtins.define(interner.intern("nil"), Value::Nil);
        builtins.define(interner.intern("true"), Value::Bool(true));
        builtins.define(interner.intern("false"), Value::Bool(false));
        for builtin in [Builtin::Len, Builtin::Delete] {
            builtins.define(interner.intern(builtin.name()), Value::Builtin(builtin));
        }
        for ty in ValueType::ALL {
            builtins.define(interner.intern(ty.name()), Value::Type(ty));
        }
        Environment {
            scopes: vec![builtins, Scope::new()],
        }
    }

    /// Number of scopes, builtins and globals included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    #[inline]
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope. The builtins and globals scopes stay.
    #[inline]
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > GLOBALS + 1 {
            self.scopes.pop();
        }
    }

    /// Define `name` in the innermost scope.
    #[inline]
    pub fn define(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.define(name, value);
        }
    }

    pub fn define_global(&mut self, name: Name, value: Value) {
        if let Some(scope) = self.scopes.get_mut(GLOBALS) {
            scope.define(name, value);
        }
    }

    /// Rebind `name` in the innermost scope that defines it.
    pub fn assign(&mut self, name: Name, value: Value) -> Result<(), AssignError> {
        let index = self.resolve(name).ok_or(AssignError::Undefined)?;
        if index == BUILTINS {
            return Err(AssignError::Builtin);
        }
        self.scopes[index].define(name, value);
        Ok(())
    }

    /// Look `name` up from the innermost scope outwards.
    #[inline]
    pub fn lookup(&self, name: Name) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Whether `name` resolves to a predeclared builtin rather than to a
    /// binding that shadows it.
    pub fn resolves_to_builtin(&self, name: Name) -> bool {
        self.resolve(name) == Some(BUILTINS)
    }

    fn resolve(&self, name: Name) -> Option<usize> {
        self.scopes.iter().rposition(|scope| scope.get(name).is_some())
    }
}
