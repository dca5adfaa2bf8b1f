//! Expression tokenizer built on logos.
//!
//! Raw logos tokens are converted into [`Token`]s whose payloads are
//! already resolved: integers parsed, string escapes decoded, identifiers
//! and decimal literal text interned.

use crate::ParseError;
use logos::Logos;
use quill_ir::{Name, Span, StringInterner};

#[derive(Logos, Copy, Clone, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,

    #[regex(r"[0-9]+")]
    Int,
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Decimal,
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
    #[regex(r"`[^`]*`")]
    RawString,
    #[regex(r"[\p{L}_][\p{L}\p{N}_]*")]
    Ident,
}

/// Token kinds seen by the parser.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    EqEq,
    NotEq,
    LtEq,
    Lt,
    GtEq,
    Gt,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    Int(i64),
    /// Decimal literal text, or an integer literal outside the `i64` range.
    Number(Name),
    String(Name),
    Ident(Name),
    Eof,
}

impl TokenKind {
    /// Description used in "expected ..., found ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::LtEq
            | TokenKind::Lt
            | TokenKind::GtEq
            | TokenKind::Gt
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::Bang
            | TokenKind::AmpAmp
            | TokenKind::PipePipe => "operator",
            TokenKind::Int(_) | TokenKind::Number(_) => "number",
            TokenKind::String(_) => "string",
            TokenKind::Ident(_) => "name",
            TokenKind::Eof => "end of expression",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize `source`, appending a trailing [`TokenKind::Eof`].
pub fn lex(source: &str, interner: &StringInterner) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::with_capacity(source.len() / 2 + 1);
    let mut raw = RawToken::lexer(source);

    while let Some(result) = raw.next() {
        let span = Span::from_range(raw.span());
        let slice = raw.slice();
        let Ok(token) = result else {
            return Err(ParseError::new(format!("invalid character {slice:?}"), span));
        };
        let kind = match token {
            RawToken::LParen => TokenKind::LParen,
            RawToken::RParen => TokenKind::RParen,
            RawToken::LBracket => TokenKind::LBracket,
            RawToken::RBracket => TokenKind::RBracket,
            RawToken::LBrace => TokenKind::LBrace,
            RawToken::RBrace => TokenKind::RBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::Gt => TokenKind::Gt,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::Bang => TokenKind::Bang,
            RawToken::AmpAmp => TokenKind::AmpAmp,
            RawToken::PipePipe => TokenKind::PipePipe,
            // Literals past i64::MAX stay exact as decimals.
            RawToken::Int => match slice.parse::<i64>() {
                Ok(n) => TokenKind::Int(n),
                Err(_) => TokenKind::Number(interner.intern(slice)),
            },
            RawToken::Decimal => TokenKind::Number(interner.intern(slice)),
            RawToken::String => {
                let body = &slice[1..slice.len() - 1];
                TokenKind::String(interner.intern(&unescape(body, span)?))
            }
            RawToken::RawString => TokenKind::String(interner.intern(&slice[1..slice.len() - 1])),
            RawToken::Ident => TokenKind::Ident(interner.intern(slice)),
        };
        tokens.push(Token { kind, span });
    }

    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::new(end, end),
    });
    Ok(tokens)
}

/// Decode the escape sequences of a double-quoted string body.
fn unescape(body: &str, span: Span) -> Result<String, ParseError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('a') => '\u{07}',
            Some('b') => '\u{08}',
            Some('f') => '\u{0C}',
            Some('v') => '\u{0B}',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('\'') => '\'',
            Some('x') => hex_escape(&mut chars, 2, span)?,
            Some('u') => hex_escape(&mut chars, 4, span)?,
            Some('U') => hex_escape(&mut chars, 8, span)?,
            _ => return Err(ParseError::new("unknown escape sequence", span)),
        };
        out.push(escaped);
    }
    Ok(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize, span: Span) -> Result<char, ParseError> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| ParseError::new("invalid escape sequence", span))?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or_else(|| ParseError::new("escape sequence is invalid Unicode code point", span))
}
