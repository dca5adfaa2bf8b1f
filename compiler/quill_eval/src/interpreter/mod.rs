//! Tree-walking expression evaluator.
//!
//! All evaluation goes through `eval_expr`, which recurses over the
//! expression tree and propagates [`EvalError`]s with `?`. The four public
//! contexts ([`Evaluator::eval`], [`Evaluator::eval0`], [`Evaluator::eval2`],
//! [`Evaluator::eval_n`]) are the boundary: they turn an `EvalError` into a
//! positioned [`Error`].
//!
//! Helper modules:
//!
//! - `access` - indexing, slicing, selectors and type assertions
//! - `call` - call dispatch, `len`, `delete`, conversions and host calls
//! - `scope_guard` - RAII scope management

mod access;
mod builder;
mod call;
mod scope_guard;

pub use builder::EvaluatorBuilder;
pub use scope_guard::ScopedEvaluator;

use crate::environment::Environment;
use crate::operators::evaluate_binary_with_precision;
use crate::struct_keys::StructKeyCache;
use crate::unary_operators::evaluate_unary;
use crate::Error;
use quill_ir::{
    BinaryOp, ExprArena, ExprId, ExprKind, ExprPrinter, ExprRange, LineIndex, MapEntryRange,
    Name, Position, Span, StringInterner,
};
use quill_stack::ensure_sufficient_stack;
use quill_value::errors::{
    assignment_mismatch, binary_type_mismatch, builtin_not_called, evaluated_but_not_used,
    non_bool_logical, undefined, unexpected_node,
};
use quill_value::{
    normalize_value, Decimal, EvalError, EvalResult, MapKey, MemoryQuota, Value,
    DIVISION_PRECISION,
};
use smallvec::SmallVec;
use std::sync::Arc;

/// Results of a call, usually one or two.
pub(crate) type Values = SmallVec<[Value; 2]>;

/// Scalar evaluation settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Fractional digits kept by non-terminating decimal divisions.
    pub division_precision: u32,
    /// Version that tagged struct fields are filtered by.
    pub version: Option<String>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            division_precision: DIVISION_PRECISION,
            version: None,
        }
    }
}

/// Evaluates expressions of one arena against a scope stack.
///
/// An evaluator belongs to a single execution; concurrent executions over
/// the same arena each build their own and may share a [`StructKeyCache`].
pub struct Evaluator<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    env: Environment,
    config: EvalConfig,
    struct_keys: Arc<StructKeyCache>,
    quota: Option<Arc<dyn MemoryQuota>>,
    path: Arc<str>,
    source: Option<(Arc<str>, LineIndex)>,
    nil: Name,
}

impl<'a> Evaluator<'a> {
    pub fn arena(&self) -> &'a ExprArena {
        self.arena
    }

    pub fn interner(&self) -> &'a StringInterner {
        self.interner
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn struct_keys(&self) -> &Arc<StructKeyCache> {
        &self.struct_keys
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn push_scope(&mut self) {
        self.env.push_scope();
    }

    pub fn pop_scope(&mut self) {
        self.env.pop_scope();
    }

    /// Bind `name` in the innermost scope.
    pub fn define(&mut self, name: &str, value: Value) {
        let name = self.interner.intern(name);
        self.env.define(name, value);
    }

    /// Evaluate `id` in single-value context.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval(&mut self, id: ExprId) -> Result<Value, Error> {
        let result = self.eval_expr(id);
        self.finish(id, result)
    }

    /// Evaluate `id` as a statement. Only calls may be evaluated for their
    /// effects; their results are discarded.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval0(&mut self, id: ExprId) -> Result<(), Error> {
        let result = self.eval_void(id);
        self.finish(id, result)
    }

    /// Evaluate `id` in two-value context: `v, ok := m[k]`, `x.(T)`,
    /// selectors, identifiers and calls returning two results.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval2(&mut self, id: ExprId) -> Result<(Value, Value), Error> {
        let result = self.eval_pair(id);
        self.finish(id, result)
    }

    /// Evaluate a call returning exactly `n` results.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval_n(&mut self, id: ExprId, n: usize) -> Result<Vec<Value>, Error> {
        let result = match self.arena.kind(id) {
            ExprKind::Call { func, args } => self.eval_call(id, func, args, n).map(Values::into_vec),
            _ => Err(assignment_mismatch(n, 1)),
        };
        self.finish(id, result)
    }

    /// Line and column of `span` in the source, when the source is known.
    pub fn position(&self, span: Span) -> Position {
        match &self.source {
            Some((source, index)) => index.position(source, span),
            None => Position {
                line: 0,
                column: 0,
                start: span.start,
                end: span.end,
            },
        }
    }

    fn finish<T>(&self, root: ExprId, result: Result<T, EvalError>) -> Result<T, Error> {
        result.map_err(|err| {
            let span = err.span.unwrap_or_else(|| self.arena.span(root));
            Error {
                path: Arc::clone(&self.path),
                position: self.position(span),
                message: err.message,
                kind: err.kind,
            }
        })
    }

    /// Source text of `id`, reprinted from the tree.
    pub(crate) fn expr_text(&self, id: ExprId) -> String {
        ExprPrinter::new(self.arena, self.interner).print(id)
    }

    /// Report an allocation of `bytes` to the memory quota, if any.
    pub(crate) fn alloc(&self, bytes: usize) -> Result<(), EvalError> {
        match &self.quota {
            Some(quota) => quota.alloc(i64::try_from(bytes).unwrap_or(i64::MAX)),
            None => Ok(()),
        }
    }

    /// Whether `id` is the predeclared `nil`, not a value that is nil.
    pub(crate) fn is_nil_literal(&self, id: ExprId) -> bool {
        match self.arena.kind(id) {
            ExprKind::Ident(name) => name == self.nil && self.env.resolves_to_builtin(name),
            ExprKind::Paren(inner) => self.is_nil_literal(inner),
            _ => false,
        }
    }

    pub(crate) fn eval_expr(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_kind(id)).map_err(|err| err.with_span(self.arena.span(id)))
    }

    fn eval_kind(&mut self, id: ExprId) -> EvalResult {
        match self.arena.kind(id) {
            ExprKind::Int(n) => Ok(Value::Int(n)),
            ExprKind::Number(text) => self.eval_number(text),
            ExprKind::String(text) => Ok(Value::string(&*self.interner.lookup(text))),
            ExprKind::Ident(name) => self.eval_ident(name),
            ExprKind::Paren(inner) => self.eval_expr(inner),
            ExprKind::Unary { op, operand } => {
                let value = normalize_value(self.eval_expr(operand)?);
                evaluate_unary(&value, op)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(op, left, right),
            ExprKind::SliceLit(items) => self.eval_slice_lit(items),
            ExprKind::MapLit(entries) => self.eval_map_lit(entries),
            ExprKind::Call { func, args } => {
                let mut results = self.eval_call(id, func, args, 1)?;
                Ok(results.pop().unwrap_or_default())
            }
            ExprKind::Index { receiver, index } => {
                self.eval_index(id, receiver, index, false).map(|(value, _)| value)
            }
            ExprKind::Slicing { receiver, low, high } => self.eval_slicing(receiver, low, high),
            ExprKind::Selector { receiver, field } => {
                self.eval_selector(receiver, field, false).map(|(value, _)| value)
            }
            ExprKind::TypeAssertion { expr, ty } => {
                self.eval_type_assertion(expr, ty, false).map(|(value, _)| value)
            }
            kind @ ExprKind::Error => Err(unexpected_node(kind.kind_name())),
        }
    }

    fn eval_void(&mut self, id: ExprId) -> Result<(), EvalError> {
        match self.arena.kind(id) {
            ExprKind::Call { func, args } => self.eval_call(id, func, args, 0).map(drop),
            ExprKind::Paren(inner) => self.eval_void(inner),
            _ => Err(evaluated_but_not_used(&self.expr_text(id))),
        }
    }

    fn eval_pair(&mut self, id: ExprId) -> Result<(Value, Value), EvalError> {
        let (value, ok) = match self.arena.kind(id) {
            ExprKind::Index { receiver, index } => self.eval_index(id, receiver, index, true)?,
            ExprKind::Selector { receiver, field } => self.eval_selector(receiver, field, true)?,
            ExprKind::TypeAssertion { expr, ty } => self.eval_type_assertion(expr, ty, true)?,
            ExprKind::Paren(inner) => return self.eval_pair(inner),
            ExprKind::Ident(name) => match self.env.lookup(name) {
                Some(Value::Builtin(builtin)) => return Err(builtin_not_called(builtin.name())),
                Some(value) => (value.clone(), true),
                None => (Value::Nil, false),
            },
            ExprKind::Call { func, args } => {
                let mut results = self.eval_call(id, func, args, 2)?.into_iter();
                let first = results.next().unwrap_or_default();
                let second = results.next().unwrap_or_default();
                return Ok((first, second));
            }
            _ => return Err(assignment_mismatch(2, 1)),
        };
        Ok((value, Value::Bool(ok)))
    }

    fn eval_number(&self, text: Name) -> EvalResult {
        let text = self.interner.lookup(text);
        text.parse::<Decimal>()
            .map(Value::decimal)
            .map_err(|_| EvalError::new(format!("malformed number literal {text}")))
    }

    fn eval_ident(&self, name: Name) -> EvalResult {
        match self.env.lookup(name) {
            Some(Value::Builtin(builtin)) => Err(builtin_not_called(builtin.name())),
            Some(value) => Ok(value.clone()),
            None => Err(undefined(&self.interner.lookup(name))),
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        if matches!(op, BinaryOp::And | BinaryOp::Or) {
            return self.eval_logical(op, left, right);
        }
        let lhs = normalize_value(self.eval_expr(left)?);
        let rhs = normalize_value(self.eval_expr(right)?);
        if matches!(op, BinaryOp::Eq | BinaryOp::NotEq)
            && (matches!(lhs, Value::Nil) || matches!(rhs, Value::Nil))
        {
            return self.compare_nil(op, left, &lhs, right, &rhs);
        }
        let result = evaluate_binary_with_precision(&lhs, &rhs, op, self.config.division_precision)?;
        if let Value::Str(s) | Value::Html(s) = &result {
            self.alloc(s.len())?;
        }
        Ok(result)
    }

    /// `x == nil` and `x != nil`: true when `x` is nil or a typed nil.
    /// Two occurrences of the predeclared `nil` cannot be compared.
    fn compare_nil(
        &self,
        op: BinaryOp,
        left: ExprId,
        lhs: &Value,
        right: ExprId,
        rhs: &Value,
    ) -> EvalResult {
        let mismatch = || binary_type_mismatch(lhs.type_name(), op.as_symbol(), rhs.type_name());
        if self.is_nil_literal(left) && self.is_nil_literal(right) {
            return Err(mismatch());
        }
        let other = if matches!(lhs, Value::Nil) { rhs } else { lhs };
        let nilable = matches!(
            other,
            Value::Nil | Value::Slice(_) | Value::Map(_) | Value::Struct(_) | Value::Func(_)
        );
        if !nilable {
            return Err(mismatch());
        }
        Ok(Value::Bool(other.is_nil() == (op == BinaryOp::Eq)))
    }

    fn eval_logical(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        let lhs = normalize_value(self.eval_expr(left)?);
        let Value::Bool(short) = lhs else {
            return Err(non_bool_logical(op.as_symbol(), lhs.type_name()));
        };
        if short == (op == BinaryOp::Or) {
            return Ok(Value::Bool(short));
        }
        match normalize_value(self.eval_expr(right)?) {
            Value::Bool(rhs) => Ok(Value::Bool(rhs)),
            rhs => Err(non_bool_logical(op.as_symbol(), rhs.type_name())),
        }
    }

    fn eval_slice_lit(&mut self, items: ExprRange) -> EvalResult {
        let arena = self.arena;
        let ids = arena.get_expr_list(items);
        let values = ids
            .iter()
            .map(|&id| self.eval_expr(id))
            .collect::<Result<Vec<_>, _>>()?;
        self.alloc(values.len() * std::mem::size_of::<Value>())?;
        Ok(Value::slice(values))
    }

    fn eval_map_lit(&mut self, entries: MapEntryRange) -> EvalResult {
        let arena = self.arena;
        let entries = arena.get_map_entries(entries);
        let mut pairs = Vec::with_capacity(entries.len());
        for entry in entries {
            let key = normalize_value(self.eval_expr(entry.key)?);
            let key = MapKey::from_value(&key).map_err(|err| err.with_span(arena.span(entry.key)))?;
            let value = self.eval_expr(entry.value)?;
            pairs.push((key, value));
        }
        self.alloc(pairs.len() * 2 * std::mem::size_of::<Value>())?;
        Ok(Value::map(pairs))
    }
}
