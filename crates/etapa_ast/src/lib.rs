//! The syntax tree produced by the etapa front-end, and the table of declared symbols
//! populated while it's built.

pub mod render;
pub mod symbols;
pub mod tree;

pub use symbols::{Symbol, SymbolError, SymbolKind, SymbolTable};
pub use tree::{Node, Nodes, SyntaxNode};
