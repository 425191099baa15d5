//! A lexical token from a source, classified for the grammar and carrying its value

use crate::location::{Span, Spanned};
use crate::value::{Keyword, LexicalValue, Operator, TypeName};
use std::fmt::{Debug, Display, Formatter};

/// A lexical token from a source
#[derive(Clone, PartialEq)]
pub struct Token {
    kind: TokenKind,
    value: LexicalValue,
    span: Span,
}

impl Token {
    /// Creates a new token
    pub fn new(kind: TokenKind, value: LexicalValue, span: Span) -> Self {
        Self { kind, value, span }
    }

    /// Creates a token whose value is implied by its kind, such as a keyword or punctuation
    pub fn bare(kind: TokenKind, span: Span) -> Self {
        let value = kind.implied_value();
        Self { kind, value, span }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Gets the value carried by this token
    pub fn value(&self) -> &LexicalValue {
        &self.value
    }

    /// Splits this token into its value and span
    pub fn into_parts(self) -> (LexicalValue, Span) {
        (self.value, self.span)
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?}) @ {}", self.kind, self.value, self.span)
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span.clone()
    }
}

/// The terminal classification of a token
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TokenKind {
    Identifier,

    // literals
    Integer,
    Float,
    Char,
    String,
    Boolean,

    Type(TypeName),
    Keyword(Keyword),
    Else,

    /// `=`
    Assign,
    /// `<=`, either an initialization or a comparison depending on context
    Lte,
    Gte,
    Lt,
    Gt,
    Eq,
    Neq,
    And,
    Or,
    Bang,
    Plus,
    Minus,
    Star,
    Div,
    Rem,
    /// `^`
    Caret,

    LParen,
    RParen,
    LBracket,
    RBracket,
    LCurly,
    RCurly,
    Comma,
    SemiColon,
}

impl TokenKind {
    /// The value tokens of this kind carry when it isn't read from the source text
    pub fn implied_value(&self) -> LexicalValue {
        match self {
            TokenKind::Type(t) => LexicalValue::TypeName(*t),
            TokenKind::Keyword(k) => LexicalValue::Keyword(*k),
            TokenKind::Assign => LexicalValue::Operator(Operator::Attribution),
            TokenKind::Lte => LexicalValue::Operator(Operator::LessEqual),
            TokenKind::Gte => LexicalValue::Operator(Operator::GreaterEqual),
            TokenKind::Lt => LexicalValue::Operator(Operator::LessThan),
            TokenKind::Gt => LexicalValue::Operator(Operator::GreaterThan),
            TokenKind::Eq => LexicalValue::Operator(Operator::Equal),
            TokenKind::Neq => LexicalValue::Operator(Operator::NotEqual),
            TokenKind::And => LexicalValue::Operator(Operator::And),
            TokenKind::Or => LexicalValue::Operator(Operator::Or),
            TokenKind::Bang => LexicalValue::Operator(Operator::Negation),
            TokenKind::Plus => LexicalValue::Operator(Operator::Positive),
            TokenKind::Minus => LexicalValue::Operator(Operator::Negative),
            TokenKind::Star => LexicalValue::Operator(Operator::Multiplication),
            TokenKind::Div => LexicalValue::Operator(Operator::Division),
            TokenKind::Rem => LexicalValue::Operator(Operator::Rest),
            TokenKind::Caret => LexicalValue::Operator(Operator::IndexSep),
            _ => LexicalValue::Empty,
        }
    }

    /// Whether this kind is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer
                | TokenKind::Float
                | TokenKind::Char
                | TokenKind::String
                | TokenKind::Boolean
        )
    }

    /// A short description used in diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Integer => "integer literal",
            TokenKind::Float => "float literal",
            TokenKind::Char => "char literal",
            TokenKind::String => "string literal",
            TokenKind::Boolean => "bool literal",
            TokenKind::Type(_) => "type name",
            TokenKind::Keyword(k) => k.as_str(),
            TokenKind::Else => "else",
            TokenKind::Assign => "=",
            TokenKind::Lte => "<=",
            TokenKind::Gte => ">=",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::Eq => "==",
            TokenKind::Neq => "!=",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Bang => "!",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Div => "/",
            TokenKind::Rem => "%",
            TokenKind::Caret => "^",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LCurly => "{",
            TokenKind::RCurly => "}",
            TokenKind::Comma => ",",
            TokenKind::SemiColon => ";",
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.describe())
    }
}
