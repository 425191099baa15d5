//! The etapa front-end: a [Driver] that owns the input, a [Tokenizer] that turns it into
//! tokens and a [GrammarReducer] that builds the syntax tree out of them.
//!
//! [Tokenizer]: lexer::Tokenizer
//! [GrammarReducer]: parser::GrammarReducer

use std::path::Path;

pub mod driver;
pub mod lexer;
pub mod parser;

pub use driver::{Driver, Parsed};

/// Parses a file with the reference tokenizer and grammar.
pub fn parse_path(path: impl AsRef<Path>) -> parser::SyntaxResult<Parsed> {
    let mut driver = Driver::with_path(path)?;
    driver.parse()
}
