//! Expression node kinds.
//!
//! Children are referenced by [`ExprId`]; lists live in the arena's side
//! tables and are referenced by range.

use crate::{BinaryOp, ExprId, ExprRange, MapEntryRange, Name, Span, UnaryOp};

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ExprKind {
    /// Integer literal that fits in `i64`.
    Int(i64),
    /// Decimal literal, kept as source text (`1.5`, `1e3`, or an integer
    /// too large for `i64`).
    Number(Name),
    /// String literal, escapes already resolved.
    String(Name),
    Ident(Name),
    Paren(ExprId),
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// `[a, b, c]`
    SliceLit(ExprRange),
    /// `{k: v, ...}`
    MapLit(MapEntryRange),
    Call {
        func: ExprId,
        args: ExprRange,
    },
    Index {
        receiver: ExprId,
        index: ExprId,
    },
    /// `receiver[low:high]`, either bound optional.
    Slicing {
        receiver: ExprId,
        low: Option<ExprId>,
        high: Option<ExprId>,
    },
    Selector {
        receiver: ExprId,
        field: Name,
    },
    /// `expr.(ty)`; `ty` is an identifier node.
    TypeAssertion {
        expr: ExprId,
        ty: ExprId,
    },
    /// Placeholder left by the parser after a syntax error.
    Error,
}

impl ExprKind {
    /// Short node-kind name used in internal error messages.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::Int(_) | ExprKind::Number(_) | ExprKind::String(_) => "literal",
            ExprKind::Ident(_) => "identifier",
            ExprKind::Paren(_) => "parenthesis",
            ExprKind::Unary { .. } => "unary operator",
            ExprKind::Binary { .. } => "binary operator",
            ExprKind::SliceLit(_) => "slice literal",
            ExprKind::MapLit(_) => "map literal",
            ExprKind::Call { .. } => "call",
            ExprKind::Index { .. } => "index",
            ExprKind::Slicing { .. } => "slicing",
            ExprKind::Selector { .. } => "selector",
            ExprKind::TypeAssertion { .. } => "type assertion",
            ExprKind::Error => "error",
        }
    }
}

/// One `key: value` pair of a map literal.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct MapEntry {
    pub key: ExprId,
    pub value: ExprId,
    pub span: Span,
}
