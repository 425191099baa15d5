//! A flat table of declared names

use etapa_tokens::location::Span;
use etapa_tokens::TypeName;
use indexmap::map::Entry;
use indexmap::IndexMap;
use itertools::Itertools;
use log::trace;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// What was declared
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SymbolKind {
    Variable,
    Array,
    Function,
}

impl Display for SymbolKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbolKind::Variable => f.write_str("variable"),
            SymbolKind::Array => f.write_str("array"),
            SymbolKind::Function => f.write_str("function"),
        }
    }
}

/// The record kept for a declared name
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub span: Span,
    pub kind: SymbolKind,
    pub ty: TypeName,
    /// size in bytes
    pub size: usize,
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} ({} bytes) declared at {}",
            self.kind, self.ty, self.name, self.size, self.span
        )
    }
}

/// A violation of the symbol table's contract
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum SymbolError {
    #[error("{name:?} was already declared at {previous}")]
    Redeclaration {
        name: String,
        span: Span,
        previous: Span,
    },
    #[error("undeclared identifier {name:?}")]
    UndeclaredIdentifier { name: String, span: Option<Span> },
}

impl SymbolError {
    /// Where the offending declaration or use is, when known
    pub fn span(&self) -> Option<&Span> {
        match self {
            SymbolError::Redeclaration { span, .. } => Some(span),
            SymbolError::UndeclaredIdentifier { span, .. } => span.as_ref(),
        }
    }
}

/// A flat mapping from names to their declarations.
///
/// A name maps to at most one [Symbol]; declaring it again is an error rather than an
/// overwrite. There is no nesting: scopes are built by composing several tables.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: IndexMap<String, Symbol>,
}

impl SymbolTable {
    /// Creates a new, empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a name, failing if it's already present
    pub fn declare(
        &mut self,
        name: impl Into<String>,
        kind: SymbolKind,
        ty: TypeName,
        size: usize,
        span: Span,
    ) -> Result<&Symbol, SymbolError> {
        let name = name.into();
        match self.symbols.entry(name) {
            Entry::Occupied(occupied) => Err(SymbolError::Redeclaration {
                name: occupied.key().clone(),
                span,
                previous: occupied.get().span.clone(),
            }),
            Entry::Vacant(vacant) => {
                trace!("declaring {kind} {:?}: {ty} ({size} bytes)", vacant.key());
                let symbol = Symbol {
                    name: vacant.key().clone(),
                    span,
                    kind,
                    ty,
                    size,
                };
                Ok(vacant.insert(symbol))
            }
        }
    }

    /// Looks up a name
    pub fn lookup(&self, name: &str) -> Result<&Symbol, SymbolError> {
        self.get(name)
            .ok_or_else(|| SymbolError::UndeclaredIdentifier {
                name: name.to_string(),
                span: None,
            })
    }

    /// Looks up a name, without treating its absence as an error
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterates over the symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }
}

impl Display for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.iter().join("\n"))
    }
}
