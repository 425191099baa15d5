//! Lexical values, source locations and tokens shared by every stage of the etapa front-end

use crate::location::{LineReader, Span};
use std::fmt::{Display, Formatter};

pub mod location;
pub mod token;
pub mod value;

pub use location::{LocationTracker, Position, SourceId, Spanned};
pub use token::{Token, TokenKind};
pub use value::{Keyword, LexicalValue, Operator, TypeName, ValueKind};

/// An error with a location
#[derive(Debug, thiserror::Error)]
pub struct SpannedError<E, C> {
    error: E,
    location: Option<Span>,
    cause: Option<Box<C>>,
}

impl<E, C> SpannedError<E, C> {
    pub fn new(error: E, location: impl Into<Option<Span>>, cause: impl Into<Option<C>>) -> Self {
        Self {
            error,
            location: location.into(),
            cause: cause.into().map(Box::new),
        }
    }

    /// Gets the error itself
    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn location(&self) -> Option<&Span> {
        self.location.as_ref()
    }

    pub fn cause(&self) -> Option<&C> {
        self.cause.as_deref()
    }
}

impl<E: Display, C: Display> Display for SpannedError<E, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error)?;
        if let Some(location) = &self.location {
            writeln!(f, "  -> {location}")?;
            // anonymous or unreadable sources just don't get an excerpt
            if let Ok(lines) = LineReader::new(2, 2).lines(location) {
                let base_line = location.begin().line;
                let width = lines.iter().map(|line| line.line).max().unwrap_or(0) / 10 + 1;
                for line in &lines {
                    writeln!(f, "{:width$} | {}", line.line, line.src.trim_end())?;
                    if line.line == base_line {
                        let col = location.begin().column - 1;
                        if location.width() > 0 {
                            writeln!(
                                f,
                                "{}{}{}",
                                " ".repeat(width + 3),
                                " ".repeat(col),
                                "~".repeat(location.width())
                            )?;
                        } else {
                            writeln!(f, "{}{}^", " ".repeat(width + 3), "-".repeat(col))?;
                        }
                    }
                }
            }
        }
        if let Some(cause) = &self.cause {
            cause.fmt(f)?;
        }

        Ok(())
    }
}
