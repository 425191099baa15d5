//! The grammar-reducer side of parsing: the context a reducer pulls tokens through, and the
//! reference [Grammar].

use crate::lexer::{LexingError, Tokenizer};
use etapa_ast::{SymbolTable, SyntaxNode};
use etapa_tokens::location::{Span, Spanned};
use etapa_tokens::{LocationTracker, Token, TokenKind};
use std::fmt::{Debug, Formatter};
use std::io::BufRead;
use tracing::trace;

mod error;
mod grammar;

pub use error::*;
pub use grammar::Grammar;

/// How many non terminals may be open at once before a parse is abandoned
pub const MAX_NESTING: usize = 128;

/// Builds a syntax tree from the tokens of a [ParseContext].
///
/// A reducer returns the root of the tree on success. On failure it returns the error that
/// stopped it, and no partial tree is kept.
pub trait GrammarReducer {
    fn reduce(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode>;
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Uninit,
    Lookahead(Token),
    Eof,
}

/// Everything a [GrammarReducer] can reach during a single parse.
///
/// Tokens are pulled lazily from the tokenizer, one token of lookahead at most. The context
/// also owns the global [SymbolTable] of the parse.
pub struct ParseContext<'d> {
    input: &'d mut dyn BufRead,
    tokenizer: &'d mut dyn Tokenizer,
    location: &'d mut LocationTracker,
    symbols: SymbolTable,
    state: State,
    last_span: Option<Span>,
    non_terminals: Vec<&'static str>,
    nesting_limit: usize,
}

impl<'d> ParseContext<'d> {
    /// Creates a context with an empty symbol table
    pub fn new(
        input: &'d mut dyn BufRead,
        tokenizer: &'d mut dyn Tokenizer,
        location: &'d mut LocationTracker,
    ) -> Self {
        Self {
            input,
            tokenizer,
            location,
            symbols: SymbolTable::new(),
            state: State::Uninit,
            last_span: None,
            non_terminals: vec![],
            nesting_limit: MAX_NESTING,
        }
    }

    /// Changes how many non terminals may be open at once, [MAX_NESTING] by default
    pub fn set_nesting_limit(&mut self, limit: usize) {
        self.nesting_limit = limit;
    }

    fn fetch(&mut self) -> SyntaxResult<()> {
        match self.tokenizer.next_token(&mut *self.input, &mut *self.location) {
            Ok(Some(token)) => self.state = State::Lookahead(token),
            Ok(None) => self.state = State::Eof,
            Err(LexingError::IoError(e)) => {
                let at = self.current_point();
                return Err(self.error(ErrorKind::Io(e), at));
            }
            Err(e) => {
                let span = e.span();
                return Err(self.error(e.into(), span));
            }
        }
        Ok(())
    }

    /// peeks the current lookahead
    pub fn peek(&mut self) -> SyntaxResult<Option<&Token>> {
        if matches!(self.state, State::Uninit) {
            self.fetch()?;
        }
        match &self.state {
            State::Lookahead(token) => Ok(Some(token)),
            _ => Ok(None),
        }
    }

    /// peeks the kind of the current lookahead
    pub fn peek_kind(&mut self) -> SyntaxResult<Option<TokenKind>> {
        Ok(self.peek()?.map(|token| *token.kind()))
    }

    /// Consumes the current lookahead. `Ok(None)` at the end of the input.
    pub fn next_token(&mut self) -> SyntaxResult<Option<Token>> {
        if matches!(self.state, State::Uninit) {
            self.fetch()?;
        }
        match std::mem::take(&mut self.state) {
            State::Lookahead(token) => {
                trace!("consumed {token:?}");
                self.last_span = Some(token.span());
                Ok(Some(token))
            }
            other => {
                self.state = other;
                Ok(None)
            }
        }
    }

    /// Checks if the lookahead is of the given kind, without consuming it
    pub fn check(&mut self, kind: TokenKind) -> SyntaxResult<bool> {
        Ok(self.peek_kind()? == Some(kind))
    }

    /// consumes the lookahead if it's of the given kind
    pub fn eat(&mut self, kind: TokenKind) -> SyntaxResult<Option<Token>> {
        if self.check(kind)? {
            self.next_token()
        } else {
            Ok(None)
        }
    }

    /// consumes the lookahead, which must be of the given kind
    pub fn expect(&mut self, kind: TokenKind) -> SyntaxResult<Token> {
        match self.eat(kind)? {
            Some(token) => Ok(token),
            None => Err(self.unexpected([format!("`{kind}`")])),
        }
    }

    /// Whether every token was consumed
    pub fn at_eof(&mut self) -> SyntaxResult<bool> {
        Ok(self.peek()?.is_none())
    }

    /// Creates an error describing the current lookahead as not being any of `expected`
    pub fn unexpected<S: ToString>(&mut self, expected: impl IntoIterator<Item = S>) -> SyntaxError {
        let expected = expected
            .into_iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        let found = match self.peek() {
            Ok(found) => found.map(|token| (describe(token), token.span())),
            Err(e) => return e,
        };
        match found {
            Some((found, span)) => self.error(ErrorKind::ParseFailure { expected, found }, span),
            None => {
                let at = self.current_point();
                self.error(ErrorKind::UnexpectedEof { expected }, at)
            }
        }
    }

    fn current_point(&self) -> Span {
        Span::point(self.location.source().clone(), self.location.position())
    }

    /// Creates an error at the given location, capturing the current non terminal stack
    pub fn error(&self, kind: ErrorKind, location: impl Into<Option<Span>>) -> SyntaxError {
        SyntaxError::new(kind, location, None, self.non_terminals.clone())
    }

    /// Wrapper function for parsing a non terminal.
    ///
    /// Fails with [ErrorKind::NestingTooDeep] instead of running `f` once the nesting limit
    /// is reached.
    pub fn parse<O, F>(&mut self, non_terminal: &'static str, f: F) -> SyntaxResult<O>
    where
        F: FnOnce(&mut Self) -> SyntaxResult<O>,
    {
        if self.non_terminals.len() >= self.nesting_limit {
            let lookahead = match self.peek() {
                Ok(Some(token)) => Some(token.span()),
                _ => None,
            };
            let at = lookahead
                .or_else(|| self.last_span.clone())
                .unwrap_or_else(|| self.current_point());
            let limit = self.nesting_limit;
            return Err(self.error(ErrorKind::NestingTooDeep { limit }, at));
        }
        trace!("starting parsing {non_terminal}");
        self.non_terminals.push(non_terminal);
        let result = f(self);
        trace!("after parsing {non_terminal}, ok={}", result.is_ok());
        if result.is_ok() {
            self.non_terminals.pop();
        }
        result
    }

    /// The location tracker of the source being parsed
    pub fn location(&self) -> &LocationTracker {
        &*self.location
    }

    /// The span of the last consumed token
    pub fn last_span(&self) -> Option<&Span> {
        self.last_span.as_ref()
    }

    /// The global symbol table
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.symbols
    }

    /// Gives up the global symbol table at the end of the parse
    pub fn into_symbols(self) -> SymbolTable {
        self.symbols
    }
}

impl Debug for ParseContext<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("location", &self.location)
            .field("state", &self.state)
            .field("non_terminals", &self.non_terminals)
            .finish_non_exhaustive()
    }
}

/// How a token is shown in a diagnostic
fn describe(token: &Token) -> String {
    let kind = token.kind();
    if *kind == TokenKind::Identifier || kind.is_literal() {
        format!("{kind} `{}`", token.value())
    } else {
        format!("`{kind}`")
    }
}
