//! Responsible with converting a [BufRead] obj into a stream of tokens

use crate::lexer::token_parsing::{parse_insignificant, parse_token};
use etapa_tokens::location::Span;
use etapa_tokens::{LexicalValue, LocationTracker, Token, TokenKind};
use std::io;
use std::io::BufRead;
use thiserror::Error;
use tracing::trace;

mod token_parsing;

/// Produces tokens on demand from a stream owned by someone else.
///
/// The tokenizer is handed the stream and the location tracker on every call, and must keep
/// the tracker in step with the text it consumes: [`LocationTracker::step`] at the start of
/// a token and [`LocationTracker::advance`] over everything it reads, skipped text included.
pub trait Tokenizer {
    /// Gets the next token. `Ok(None)` signals the end of the input.
    fn next_token(
        &mut self,
        input: &mut dyn BufRead,
        location: &mut LocationTracker,
    ) -> LexResult<Option<Token>>;

    /// Forgets any buffered state, so the next call starts on a fresh stream
    fn reset(&mut self);
}

/// The reference tokenizer.
///
/// Input is pulled one line at a time. Tokens never span lines, except for block comments,
/// which pull more lines until they are closed.
#[derive(Debug, Default)]
pub struct Lexer {
    buffer: String,
    offset: usize,
    eof: bool,
}

impl Lexer {
    /// Creates a new lexer
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls another line into the buffer, dropping what was already consumed
    fn fill(&mut self, input: &mut dyn BufRead) -> io::Result<()> {
        self.buffer.drain(..self.offset);
        self.offset = 0;
        let read = input.read_line(&mut self.buffer)?;
        if read == 0 {
            self.eof = true;
        }
        trace!(read, eof = self.eof, "filled lexer buffer");
        Ok(())
    }

    fn consume(&mut self, len: usize, location: &mut LocationTracker) {
        location.advance(&self.buffer[self.offset..self.offset + len]);
        self.offset += len;
    }
}

impl Tokenizer for Lexer {
    fn next_token(
        &mut self,
        input: &mut dyn BufRead,
        location: &mut LocationTracker,
    ) -> LexResult<Option<Token>> {
        loop {
            let skipped = match parse_insignificant(&self.buffer[self.offset..]) {
                Ok((_, skipped)) => skipped.len(),
                Err(_) => 0,
            };
            self.consume(skipped, location);

            let rest = &self.buffer[self.offset..];
            let complete_line = self.eof || rest.contains('\n');
            if rest.is_empty() {
                if self.eof {
                    return Ok(None);
                }
            } else if rest.starts_with("/*") {
                if self.eof {
                    location.step();
                    self.consume(rest.len(), location);
                    return Err(LexingError::UnterminatedComment(location.span()));
                }
            } else if complete_line {
                location.step();
                return match parse_token(rest) {
                    Ok((remaining, (kind, text))) => {
                        let text = text.to_string();
                        self.consume(rest.len() - remaining.len(), location);
                        let span = location.span();
                        let value = lexeme_value(kind, &text, &span)?;
                        let token = Token::new(kind, value, span);
                        trace!(?token, "lexed");
                        Ok(Some(token))
                    }
                    Err(_) => Err(self.invalid(location)),
                };
            }
            self.fill(input)?;
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Lexer {
    /// Consumes the offending text and describes why it could not be classified
    fn invalid(&mut self, location: &mut LocationTracker) -> LexingError {
        let rest = &self.buffer[self.offset..];
        match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.consume(len, location);
                LexingError::UnterminatedLiteral(quote, location.span())
            }
            Some(c) => {
                self.consume(c.len_utf8(), location);
                LexingError::InvalidChar(c, location.span())
            }
            None => LexingError::UnexpectedEof(location.span()),
        }
    }
}

/// Computes the value carried by a token from the text it was read from
fn lexeme_value(kind: TokenKind, text: &str, span: &Span) -> LexResult<LexicalValue> {
    let value = match kind {
        TokenKind::Identifier => LexicalValue::string(text),
        TokenKind::Integer => text
            .parse::<i64>()
            .map(LexicalValue::IntLiteral)
            .map_err(|_| LexingError::IntegerOverflow(text.to_string(), span.clone()))?,
        TokenKind::Float => text
            .parse::<f64>()
            .map(LexicalValue::FloatLiteral)
            .map_err(|_| LexingError::InvalidLiteral(text.to_string(), span.clone()))?,
        TokenKind::Boolean => LexicalValue::BoolLiteral(text == "true"),
        TokenKind::Char => text
            .chars()
            .nth(1)
            .map(LexicalValue::CharLiteral)
            .ok_or_else(|| LexingError::InvalidLiteral(text.to_string(), span.clone()))?,
        TokenKind::String => LexicalValue::string(&text[1..text.len() - 1]),
        other => other.implied_value(),
    };
    Ok(value)
}

pub type LexResult<T> = Result<T, LexingError>;

#[derive(Debug, Error)]
pub enum LexingError {
    /// Invalid char
    #[error("invalid char: {0:?}")]
    InvalidChar(char, Span),
    #[error("unterminated block comment")]
    UnterminatedComment(Span),
    #[error("missing closing {0} on literal")]
    UnterminatedLiteral(char, Span),
    #[error("integer literal {0} is out of range")]
    IntegerOverflow(String, Span),
    #[error("invalid literal {0}")]
    InvalidLiteral(String, Span),
    #[error("unexpected EOF")]
    UnexpectedEof(Span),
    #[error(transparent)]
    IoError(#[from] io::Error),
}

impl LexingError {
    /// Where the error occurred, if it's known
    pub fn span(&self) -> Option<Span> {
        match self {
            LexingError::InvalidChar(_, span)
            | LexingError::UnterminatedComment(span)
            | LexingError::UnterminatedLiteral(_, span)
            | LexingError::IntegerOverflow(_, span)
            | LexingError::InvalidLiteral(_, span)
            | LexingError::UnexpectedEof(span) => Some(span.clone()),
            LexingError::IoError(_) => None,
        }
    }
}
