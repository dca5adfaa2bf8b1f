//! Parser state and token cursor.

use crate::lexer::{Token, TokenKind};
use crate::ParseError;
use quill_ir::{ExprArena, ExprId, ExprKind, Span};

/// Recursive-descent parser over a token vector.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) arena: ExprArena,
}

impl Parser {
    pub fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            arena: ExprArena::with_capacity(source_len),
        }
    }

    /// Consume the parser, returning the finished arena.
    pub fn into_arena(self) -> ExprArena {
        self.arena
    }

    #[inline]
    pub(crate) fn current(&self) -> Token {
        self.tokens.get(self.pos).copied().unwrap_or(Token {
            kind: TokenKind::Eof,
            span: Span::DUMMY,
        })
    }

    #[inline]
    pub(crate) fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Advance and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume `kind` or fail with "expected ..., found ...".
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let found = self.current();
            Err(ParseError::new(
                format!(
                    "unexpected {}, expecting {}",
                    found.kind.describe(),
                    kind.describe()
                ),
                found.span,
            ))
        }
    }

    pub(crate) fn at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    #[inline]
    pub(crate) fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(kind, span)
    }

    #[inline]
    pub(crate) fn span_of(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }
}
