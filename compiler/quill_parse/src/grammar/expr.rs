//! Expression grammar.
//!
//! Precedence, loosest first: `||`, `&&`, comparisons, additive,
//! multiplicative, unary prefix, postfix (call, index, slice, selector,
//! type assertion), primary.

use crate::lexer::TokenKind;
use crate::{ParseError, Parser};
use quill_ir::{BinaryOp, ExprId, ExprKind, MapEntry, Span, UnaryOp};
use quill_stack::ensure_sufficient_stack;

impl Parser {
    /// Parse one expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_binary_or())
    }

    fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.span_of(left).merge(self.span_of(right));
        self.alloc(ExprKind::Binary { op, left, right }, span)
    }

    fn parse_binary_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_binary_and()?;
        while self.check(TokenKind::PipePipe) {
            self.advance();
            let right = self.parse_binary_and()?;
            left = self.binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_binary_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_comparison()?;
        while self.check(TokenKind::AmpAmp) {
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let op = match self.current_kind() {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Pos,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = start.merge(self.span_of(operand));
        Ok(self.alloc(ExprKind::Unary { op, operand }, span))
    }

    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            expr = match self.current_kind() {
                TokenKind::LParen => self.parse_call(expr)?,
                TokenKind::LBracket => self.parse_index_or_slice(expr)?,
                TokenKind::Dot => self.parse_selector_or_assertion(expr)?,
                _ => return Ok(expr),
            };
        }
    }

    fn parse_call(&mut self, func: ExprId) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.check(TokenKind::RParen) {
                self.expect(TokenKind::Comma)?;
            }
        }
        let end = self.expect(TokenKind::RParen)?.span;
        let args = self.arena.alloc_expr_list(&args);
        let span = self.span_of(func).merge(end);
        Ok(self.alloc(ExprKind::Call { func, args }, span))
    }

    fn parse_index_or_slice(&mut self, receiver: ExprId) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::LBracket)?;
        let low = if self.check(TokenKind::Colon) {
            None
        } else {
            Some(self.parse_expr()?)
        };

        if !self.check(TokenKind::Colon) {
            let end = self.expect(TokenKind::RBracket)?.span;
            let span = self.span_of(receiver).merge(end);
            return match low {
                Some(index) => Ok(self.alloc(ExprKind::Index { receiver, index }, span)),
                None => Err(ParseError::new("expected operand", end)),
            };
        }

        self.advance();
        let high = if self.check(TokenKind::RBracket) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = self.expect(TokenKind::RBracket)?.span;
        let span = self.span_of(receiver).merge(end);
        Ok(self.alloc(
            ExprKind::Slicing {
                receiver,
                low,
                high,
            },
            span,
        ))
    }

    fn parse_selector_or_assertion(&mut self, receiver: ExprId) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::Dot)?;
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(field) => {
                let span = self.span_of(receiver).merge(token.span);
                Ok(self.alloc(ExprKind::Selector { receiver, field }, span))
            }
            TokenKind::LParen => {
                let ty_token = self.advance();
                let TokenKind::Ident(name) = ty_token.kind else {
                    return Err(ParseError::new(
                        format!("unexpected {}, expecting type name", ty_token.kind.describe()),
                        ty_token.span,
                    ));
                };
                let ty = self.alloc(ExprKind::Ident(name), ty_token.span);
                let end = self.expect(TokenKind::RParen)?.span;
                let span = self.span_of(receiver).merge(end);
                Ok(self.alloc(ExprKind::TypeAssertion { expr: receiver, ty }, span))
            }
            other => Err(ParseError::new(
                format!("unexpected {}, expecting name or (", other.describe()),
                token.span,
            )),
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.advance();
        let span = token.span;
        match token.kind {
            TokenKind::Int(n) => Ok(self.alloc(ExprKind::Int(n), span)),
            TokenKind::Number(text) => Ok(self.alloc(ExprKind::Number(text), span)),
            TokenKind::String(text) => Ok(self.alloc(ExprKind::String(text), span)),
            TokenKind::Ident(name) => Ok(self.alloc(ExprKind::Ident(name), span)),
            TokenKind::LParen => {
                let inner = self.parse_expr()?;
                let end = self.expect(TokenKind::RParen)?.span;
                Ok(self.alloc(ExprKind::Paren(inner), span.merge(end)))
            }
            TokenKind::LBracket => self.parse_slice_literal(span),
            TokenKind::LBrace => self.parse_map_literal(span),
            other => Err(ParseError::new(
                format!("unexpected {}, expecting expression", other.describe()),
                span,
            )),
        }
    }

    fn parse_slice_literal(&mut self, start: Span) -> Result<ExprId, ParseError> {
        let mut elems = Vec::new();
        while !self.check(TokenKind::RBracket) {
            elems.push(self.parse_expr()?);
            if !self.check(TokenKind::RBracket) {
                self.expect(TokenKind::Comma)?;
            }
        }
        let end = self.expect(TokenKind::RBracket)?.span;
        let elems = self.arena.alloc_expr_list(&elems);
        Ok(self.alloc(ExprKind::SliceLit(elems), start.merge(end)))
    }

    fn parse_map_literal(&mut self, start: Span) -> Result<ExprId, ParseError> {
        let mut entries = Vec::new();
        while !self.check(TokenKind::RBrace) {
            let key = self.parse_expr()?;
            self.expect(TokenKind::Colon)?;
            let value = self.parse_expr()?;
            entries.push(MapEntry {
                key,
                value,
                span: self.span_of(key).merge(self.span_of(value)),
            });
            if !self.check(TokenKind::RBrace) {
                self.expect(TokenKind::Comma)?;
            }
        }
        let end = self.expect(TokenKind::RBrace)?.span;
        let entries = self.arena.alloc_map_entries(&entries);
        Ok(self.alloc(ExprKind::MapLit(entries), start.merge(end)))
    }
}
