//! Lexer and parser for Quill template expressions.
//!
//! Only the expression sublanguage lives here; statements and template
//! text are handled by the layers above. The output is an immutable
//! [`ExprArena`] plus the id of the root expression.

mod error;
mod grammar;
mod lexer;
mod parser;

pub use error::ParseError;
pub use lexer::{lex, Token, TokenKind};
pub use parser::Parser;

use quill_ir::{ExprArena, ExprId, StringInterner};

/// A parsed expression: its arena and root node.
#[derive(Clone, Debug)]
pub struct ParsedExpr {
    pub arena: ExprArena,
    pub root: ExprId,
}

/// Parse `source` as a single expression.
///
/// Identifiers, string literals and decimal literal text are interned in
/// `interner`; evaluate the result with the same interner.
pub fn parse_expression(source: &str, interner: &StringInterner) -> Result<ParsedExpr, ParseError> {
    let tokens = lex(source, interner)?;
    let mut parser = Parser::new(tokens, source.len());
    let root = parser.parse_expr()?;
    if !parser.at_end() {
        let extra = parser.current();
        return Err(ParseError::new(
            format!("unexpected {} after expression", extra.kind.describe()),
            extra.span,
        ));
    }
    let arena = parser.into_arena();
    tracing::trace!(nodes = arena.len(), "parsed expression");
    Ok(ParsedExpr { arena, root })
}
