//! Reprint expressions as source text.
//!
//! Error messages quote the offending expression (`f() used as value`,
//! `cannot use x (type string) as type int in argument to f`), so the
//! evaluator needs a canonical textual form of any subtree.

use crate::{ExprArena, ExprId, ExprKind, StringInterner};
use quill_stack::ensure_sufficient_stack;
use std::fmt::Write;

/// Renders an expression subtree back to source form.
pub struct ExprPrinter<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
}

impl<'a> ExprPrinter<'a> {
    pub fn new(arena: &'a ExprArena, interner: &'a StringInterner) -> Self {
        ExprPrinter { arena, interner }
    }

    pub fn print(&self, id: ExprId) -> String {
        let mut out = String::new();
        self.write_expr(&mut out, id);
        out
    }

    fn write_list(&self, out: &mut String, ids: &[ExprId]) {
        for (i, &arg) in ids.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write_expr(out, arg);
        }
    }

    fn write_expr(&self, out: &mut String, id: ExprId) {
        ensure_sufficient_stack(|| match self.arena.kind(id) {
            ExprKind::Int(n) => {
                let _ = write!(out, "{n}");
            }
            ExprKind::Number(text) | ExprKind::Ident(text) => {
                out.push_str(&self.interner.lookup(text));
            }
            ExprKind::String(text) => {
                let _ = write!(out, "{:?}", &*self.interner.lookup(text));
            }
            ExprKind::Paren(inner) => {
                out.push('(');
                self.write_expr(out, inner);
                out.push(')');
            }
            ExprKind::Unary { op, operand } => {
                out.push_str(op.as_symbol());
                self.write_expr(out, operand);
            }
            ExprKind::Binary { op, left, right } => {
                self.write_expr(out, left);
                let _ = write!(out, " {} ", op.as_symbol());
                self.write_expr(out, right);
            }
            ExprKind::SliceLit(elems) => {
                out.push('[');
                self.write_list(out, self.arena.get_expr_list(elems));
                out.push(']');
            }
            ExprKind::MapLit(entries) => {
                out.push('{');
                for (i, entry) in self.arena.get_map_entries(entries).iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write_expr(out, entry.key);
                    out.push_str(": ");
                    self.write_expr(out, entry.value);
                }
                out.push('}');
            }
            ExprKind::Call { func, args } => {
                self.write_expr(out, func);
                out.push('(');
                self.write_list(out, self.arena.get_expr_list(args));
                out.push(')');
            }
            ExprKind::Index { receiver, index } => {
                self.write_expr(out, receiver);
                out.push('[');
                self.write_expr(out, index);
                out.push(']');
            }
            ExprKind::Slicing {
                receiver,
                low,
                high,
            } => {
                self.write_expr(out, receiver);
                out.push('[');
                if let Some(low) = low {
                    self.write_expr(out, low);
                }
                out.push(':');
                if let Some(high) = high {
                    self.write_expr(out, high);
                }
                out.push(']');
            }
            ExprKind::Selector { receiver, field } => {
                self.write_expr(out, receiver);
                out.push('.');
                out.push_str(&self.interner.lookup(field));
            }
            ExprKind::TypeAssertion { expr, ty } => {
                self.write_expr(out, expr);
                out.push_str(".(");
                self.write_expr(out, ty);
                out.push(')');
            }
            ExprKind::Error => out.push_str("<error>"),
        });
    }
}

