//! Call dispatch.
//!
//! The callee decides the path: the `len` and `delete` builtins have their
//! own arity rules, type names convert their single argument, and host
//! functions bind arguments against their declared [`Signature`]. The
//! number of results a call produces is checked against the context before
//! any argument is looked at.

use super::{Evaluator, Values};
use crate::coerce::coerce_argument;
use crate::conversion::convert;
use quill_ir::{ExprId, ExprKind, ExprRange};
use quill_value::errors::{
    assignment_mismatch, builtin_argument_count, delete_requires_map, evaluated_but_not_used,
    host_error, host_panic, invalid_len_argument, multiple_value_in_single_context,
    non_mutable_map, not_callable, untyped_nil, used_as_value, wrong_argument_count,
};
use quill_value::{
    normalize, normalize_value, Builtin, EvalError, HostFunc, MapKey, ParamKind, Signature, Value,
    ValueType,
};
use smallvec::smallvec;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Check that a call producing `have` results fits a context expecting
/// `want`; `want == 0` is statement context. Calls without effects
/// (`len`, conversions) cannot be used as statements.
fn check_result_count(call: &str, have: usize, want: usize, pure: bool) -> Result<(), EvalError> {
    match (want, have) {
        (0, _) if pure => Err(evaluated_but_not_used(call)),
        (0, _) => Ok(()),
        (1, 0) => Err(used_as_value(call)),
        (1, 1) => Ok(()),
        (1, got) => Err(multiple_value_in_single_context(call, got)),
        (want, have) if want == have => Ok(()),
        (want, have) => Err(assignment_mismatch(want, have)),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "host function panicked".to_owned()
    }
}

fn signed(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

impl Evaluator<'_> {
    /// Evaluate the call `id` in a context expecting `want` results.
    pub(super) fn eval_call(
        &mut self,
        id: ExprId,
        func: ExprId,
        args: ExprRange,
        want: usize,
    ) -> Result<Values, EvalError> {
        let arena = self.arena;
        let args = arena.get_expr_list(args);
        if let ExprKind::Ident(name) = arena.kind(func) {
            if let Some(&Value::Builtin(builtin)) = self.env.lookup(name) {
                return match builtin {
                    Builtin::Len => self.call_len(id, args, want),
                    Builtin::Delete => self.call_delete(id, args, want),
                };
            }
        }
        match self.eval_expr(func)? {
            Value::Type(ty) => self.call_conversion(id, ty, args, want),
            Value::Func(f) => self.call_host(id, func, &f, args, want),
            other => Err(not_callable(&self.expr_text(func), other.type_name())),
        }
    }

    fn call_len(&mut self, id: ExprId, args: &[ExprId], want: usize) -> Result<Values, EvalError> {
        let [arg] = args else {
            return Err(builtin_argument_count("len", &self.expr_text(id), args.len() > 1));
        };
        check_result_count(&self.expr_text(id), 1, want, true)?;
        if self.is_nil_literal(*arg) {
            return Err(untyped_nil().with_span(self.arena.span(*arg)));
        }
        let len = match normalize_value(self.eval_expr(*arg)?) {
            Value::Str(s) | Value::Html(s) => s.chars().count(),
            Value::Slice(s) => s.len(),
            Value::Map(m) => m.len(),
            other => {
                return Err(invalid_len_argument(&self.expr_text(*arg), other.type_name())
                    .with_span(self.arena.span(*arg)));
            }
        };
        Ok(smallvec![Value::Int(signed(len))])
    }

    fn call_delete(&mut self, id: ExprId, args: &[ExprId], want: usize) -> Result<Values, EvalError> {
        let [map, key] = args else {
            return Err(builtin_argument_count("delete", &self.expr_text(id), args.len() > 2));
        };
        check_result_count(&self.expr_text(id), 0, want, false)?;
        let m = match self.eval_expr(*map)? {
            Value::Map(m) => m,
            other => return Err(delete_requires_map(other.type_name())),
        };
        if !m.is_nil() && !m.is_mutable() {
            return Err(non_mutable_map());
        }
        let key = normalize_value(self.eval_expr(*key)?);
        let key = MapKey::from_value(&key)?;
        if !m.is_nil() {
            m.remove(&key)?;
        }
        Ok(Values::new())
    }

    fn call_conversion(
        &mut self,
        id: ExprId,
        ty: ValueType,
        args: &[ExprId],
        want: usize,
    ) -> Result<Values, EvalError> {
        let [arg] = args else {
            return Err(builtin_argument_count(
                &format!("conversion to {}", ty.name()),
                &self.expr_text(id),
                args.len() > 1,
            ));
        };
        check_result_count(&self.expr_text(id), 1, want, true)?;
        let value = normalize_value(self.eval_expr(*arg)?);
        let was_text = matches!(value, Value::Str(_) | Value::Html(_));
        let converted = convert(value, ty, &self.expr_text(*arg))?;
        match &converted {
            Value::Str(s) | Value::Html(s) if !was_text => self.alloc(s.len())?,
            Value::Slice(s) if was_text => self.alloc(s.len() * std::mem::size_of::<char>())?,
            _ => {}
        }
        Ok(smallvec![converted])
    }

    fn call_host(
        &mut self,
        id: ExprId,
        func: ExprId,
        f: &HostFunc,
        args: &[ExprId],
        want: usize,
    ) -> Result<Values, EvalError> {
        let signature = f.signature();
        let callee = self.expr_text(func);
        check_result_count(&self.expr_text(id), signature.results.len(), want, false)?;

        let mut values = Values::with_capacity(args.len());
        for &arg in args {
            values.push(self.eval_expr(arg)?);
        }
        if !signature.accepts_arg_count(values.len()) {
            let have: Vec<&str> = values.iter().map(Value::type_name).collect();
            return Err(wrong_argument_count(
                &callee,
                values.len() > signature.params.len(),
                &format!("({})", have.join(", ")),
                &signature.want_list(),
            ));
        }
        let coerced = self.bind_arguments(signature, &callee, args, values)?;

        tracing::debug!(callee = f.name(), args = coerced.len(), "host call");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f.invoke(&coerced)));
        let func_span = self.arena.span(func);
        let natives = match outcome {
            Ok(Ok(natives)) => natives,
            Ok(Err(message)) => return Err(host_error(&message).with_span(func_span)),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(callee = f.name(), %message, "host function panicked");
                return Err(host_panic(&message).with_span(func_span));
            }
        };
        if natives.len() != signature.results.len() {
            return Err(host_error(&format!(
                "{} returned {} values, want {}",
                f.name(),
                natives.len(),
                signature.results.len()
            ))
            .with_span(func_span));
        }
        natives.into_iter().map(normalize).collect()
    }

    /// Coerce each argument to its declared parameter kind.
    fn bind_arguments(
        &self,
        signature: &Signature,
        callee: &str,
        args: &[ExprId],
        values: Values,
    ) -> Result<Vec<Value>, EvalError> {
        args.iter()
            .zip(values)
            .enumerate()
            .map(|(i, (&arg, value))| {
                let kind = signature.param_for(i).unwrap_or(ParamKind::Any);
                let value = match kind {
                    ParamKind::Any | ParamKind::Struct(_) => value,
                    _ => normalize_value(value),
                };
                coerce_argument(value, kind, &self.expr_text(arg), callee)
                    .map_err(|err| err.with_span(self.arena.span(arg)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::check_result_count;

    #[test]
    fn result_counts() {
        assert!(check_result_count("f()", 0, 0, false).is_ok());
        assert!(check_result_count("f()", 2, 0, false).is_ok());
        assert!(check_result_count("f()", 2, 2, false).is_ok());
        assert_eq!(
            check_result_count("len(s)", 1, 0, true).map_err(|e| e.message),
            Err("len(s) evaluated but not used".to_owned())
        );
        assert_eq!(
            check_result_count("f()", 0, 1, false).map_err(|e| e.message),
            Err("f() used as value".to_owned())
        );
        assert_eq!(
            check_result_count("f()", 2, 1, false).map_err(|e| e.message),
            Err("multiple-value f() in single-value context".to_owned())
        );
        assert_eq!(
            check_result_count("f()", 1, 2, false).map_err(|e| e.message),
            Err("assignment mismatch: 2 variables but 1 values".to_owned())
        );
    }
}
