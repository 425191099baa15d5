use crate::lexer::LexingError;
use etapa_ast::SymbolError;
use etapa_tokens::location::Span;
use etapa_tokens::SpannedError;
use itertools::Itertools;
use std::fmt::{Display, Formatter};
use std::io;

/// Represents an error occurring while binding a source or parsing it
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    pub kind: SpannedError<ErrorKind, SyntaxError>,
    pub non_terminal_stack: Option<Vec<&'static str>>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(
        kind: ErrorKind,
        location: impl Into<Option<Span>>,
        cause: impl Into<Option<Self>>,
        non_terminals: impl Into<Option<Vec<&'static str>>>,
    ) -> Self {
        Self {
            kind: SpannedError::new(kind, location, cause),
            non_terminal_stack: non_terminals.into(),
        }
    }

    /// The kind of error
    pub fn error_kind(&self) -> &ErrorKind {
        self.kind.error()
    }

    /// Where the error occurred, if it's known
    pub fn location(&self) -> Option<&Span> {
        self.kind.location()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error: {}", self.kind)?;
        if let Some(non_terminals) = &self.non_terminal_stack {
            if !non_terminals.is_empty() {
                writeln!(f, "non terminal stack:")?;
                for (idx, non_terminal) in non_terminals.iter().enumerate() {
                    writeln!(f, "  {}: {}", idx, non_terminal)?;
                }
            }
        }

        Ok(())
    }
}

impl<E> From<E> for SyntaxError
where
    E: Into<ErrorKind>,
{
    fn from(value: E) -> Self {
        Self::new(value.into(), None, None, None)
    }
}

/// [SyntaxError] kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Lex(#[from] LexingError),
    #[error(transparent)]
    Symbol(#[from] SymbolError),
    #[error("expected {}, found {found}", .expected.iter().join(" or "))]
    ParseFailure { expected: Vec<String>, found: String },
    #[error("unexpected EOF, expected {}", .expected.iter().join(" or "))]
    UnexpectedEof { expected: Vec<String> },
    #[error("dimension {dimension} of array {name:?} must be positive")]
    InvalidDimension { name: String, dimension: i64 },
    #[error("array {name:?} is too large")]
    ArrayTooLarge { name: String },
    #[error("input is nested deeper than {limit} non terminals")]
    NestingTooDeep { limit: usize },
}

impl ErrorKind {
    pub fn invalid_input(reason: impl AsRef<str>) -> Self {
        Self::InvalidInput(reason.as_ref().to_string())
    }

    pub fn parse_failure(
        expected: impl IntoIterator<Item = impl ToString>,
        found: impl ToString,
    ) -> Self {
        Self::ParseFailure {
            expected: expected.into_iter().map(|s| s.to_string()).collect(),
            found: found.to_string(),
        }
    }
}

pub type SyntaxResult<T = ()> = Result<T, SyntaxError>;
