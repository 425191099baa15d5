//! The reference grammar: a recursive descent reducer for the etapa language.
//!
//! ```text
//! program   := (global | function)*
//! global    := type ident dims? (',' ident dims?)* ';'        dims := '[' INT ('^' INT)* ']'
//! function  := type ident '(' (type ident (',' type ident)*)? ')' block
//! block     := '{' statement* '}'
//! statement := type local (',' local)* ';'                    local := ident ('<=' literal)?
//!            | lvalue '=' expr ';'
//!            | ident '(' args? ')' ';'
//!            | 'if' '(' expr ')' block ('else' block)?
//!            | 'while' '(' expr ')' block
//!            | 'input' ident ';' | 'output' expr ';' | 'return' expr ';'
//!            | block
//! lvalue    := ident ('[' expr ('^' expr)* ']')?
//! ```
//!
//! Children only ever hold the fixed parts of a construct. Statement lists, argument lists
//! and the functions of the program are chained through [`Node::append_sequence`].

use crate::parser::{ErrorKind, GrammarReducer, ParseContext, SyntaxResult};
use etapa_ast::{Node, SymbolKind, SymbolTable, SyntaxNode};
use etapa_tokens::location::{Span, Spanned};
use etapa_tokens::{Keyword, LexicalValue, Operator, Position, Token, TokenKind, TypeName};
use tracing::{debug, trace};

mod expr;

/// The reference [GrammarReducer].
///
/// Globals and functions are declared in the global table of the [ParseContext]. Every
/// function body and nested block gets a scope of its own, and names are looked up from the
/// innermost scope outward.
#[derive(Debug, Default)]
pub struct Grammar {
    scopes: Vec<SymbolTable>,
}

impl Grammar {
    /// Creates a new grammar
    pub fn new() -> Self {
        Self::default()
    }

    fn program(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        let start = Span::point(cx.location().source().clone(), Position::start());
        let mut root = Node::new(LexicalValue::Empty, start);
        while !cx.at_eof()? {
            if let Some(function) = self.global_or_function(cx)? {
                root.append_sequence(function);
            }
        }
        Ok(root)
    }

    fn global_or_function(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<Option<SyntaxNode>> {
        let ty = type_name(cx)?;
        let (name, span) = identifier(cx)?;
        if cx.check(TokenKind::LParen)? {
            cx.parse("function", |cx| self.function(cx, ty, name, span))
                .map(Some)
        } else {
            cx.parse("global declaration", |cx| {
                self.global_declarator(cx, ty, name, span)?;
                while cx.eat(TokenKind::Comma)?.is_some() {
                    let (name, span) = identifier(cx)?;
                    self.global_declarator(cx, ty, name, span)?;
                }
                cx.expect(TokenKind::SemiColon)?;
                Ok(None)
            })
        }
    }

    fn global_declarator(
        &mut self,
        cx: &mut ParseContext<'_>,
        ty: TypeName,
        name: String,
        span: Span,
    ) -> SyntaxResult {
        if cx.eat(TokenKind::LBracket)?.is_none() {
            return self.declare(cx, name, SymbolKind::Variable, ty, ty.size(), span);
        }
        let mut size = ty.size();
        loop {
            let found = cx
                .peek()?
                .filter(|token| *token.kind() == TokenKind::Integer)
                .map(|token| token.value().clone());
            let Some(LexicalValue::IntLiteral(dimension)) = found else {
                return Err(cx.unexpected(["integer literal"]));
            };
            let token = cx.expect(TokenKind::Integer)?;
            if dimension <= 0 {
                return Err(cx.error(
                    ErrorKind::InvalidDimension { name, dimension },
                    token.span(),
                ));
            }
            size = usize::try_from(dimension)
                .ok()
                .and_then(|dimension| size.checked_mul(dimension))
                .ok_or_else(|| {
                    cx.error(ErrorKind::ArrayTooLarge { name: name.clone() }, span.clone())
                })?;
            if cx.eat(TokenKind::Caret)?.is_none() {
                break;
            }
        }
        cx.expect(TokenKind::RBracket)?;
        self.declare(cx, name, SymbolKind::Array, ty, size, span)
    }

    fn function(
        &mut self,
        cx: &mut ParseContext<'_>,
        ty: TypeName,
        name: String,
        span: Span,
    ) -> SyntaxResult<SyntaxNode> {
        debug!("reducing function {name:?}");
        // declared before its body so it can call itself
        self.declare(cx, name.clone(), SymbolKind::Function, ty, ty.size(), span.clone())?;
        self.scopes.push(SymbolTable::new());
        let result = self.function_rest(cx, name, span);
        self.scopes.pop();
        result
    }

    fn function_rest(
        &mut self,
        cx: &mut ParseContext<'_>,
        name: String,
        span: Span,
    ) -> SyntaxResult<SyntaxNode> {
        cx.expect(TokenKind::LParen)?;
        if !cx.check(TokenKind::RParen)? {
            loop {
                let ty = type_name(cx)?;
                let (param, span) = identifier(cx)?;
                self.declare(cx, param, SymbolKind::Variable, ty, ty.size(), span)?;
                if cx.eat(TokenKind::Comma)?.is_none() {
                    break;
                }
            }
        }
        cx.expect(TokenKind::RParen)?;
        let mut function = Node::new(LexicalValue::string(name), span);
        if let Some(body) = cx.parse("block", |cx| self.statements(cx))? {
            function.add_child(body);
        }
        Ok(function)
    }

    /// Reduces a block in a scope of its own
    fn block(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<Option<SyntaxNode>> {
        self.scopes.push(SymbolTable::new());
        let result = cx.parse("block", |cx| self.statements(cx));
        self.scopes.pop();
        result
    }

    /// `'{' statement* '}'`, returning the first statement with the others chained after it
    fn statements(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<Option<SyntaxNode>> {
        cx.expect(TokenKind::LCurly)?;
        let mut head: Option<SyntaxNode> = None;
        while cx.eat(TokenKind::RCurly)?.is_none() {
            if let Some(statement) = self.statement(cx)? {
                match &mut head {
                    Some(head) => head.append_sequence(statement),
                    None => head = Some(statement),
                }
            }
        }
        Ok(head)
    }

    fn statement(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<Option<SyntaxNode>> {
        let Some(kind) = cx.peek_kind()? else {
            return Err(cx.unexpected(["statement", "`}`"]));
        };
        trace!("reducing statement starting with {kind:?}");
        match kind {
            TokenKind::Type(_) => cx.parse("local declaration", |cx| self.local_declaration(cx)),
            TokenKind::LCurly => self.block(cx),
            TokenKind::Keyword(Keyword::If) => cx.parse("if", |cx| self.if_statement(cx)).map(Some),
            TokenKind::Keyword(Keyword::While) => {
                cx.parse("while", |cx| self.while_statement(cx)).map(Some)
            }
            TokenKind::Keyword(Keyword::Input) => cx
                .parse("input", |cx| {
                    let node = keyword(cx, Keyword::Input)?;
                    let (name, span) = identifier(cx)?;
                    let target = self.resolve(cx, name, span)?;
                    cx.expect(TokenKind::SemiColon)?;
                    Ok(node.with_child(target))
                })
                .map(Some),
            TokenKind::Keyword(keyword @ (Keyword::Output | Keyword::Return)) => cx
                .parse(keyword.as_str(), |cx| {
                    let node = self::keyword(cx, keyword)?;
                    let value = self.expression(cx)?;
                    cx.expect(TokenKind::SemiColon)?;
                    Ok(node.with_child(value))
                })
                .map(Some),
            TokenKind::Identifier => cx
                .parse("simple statement", |cx| {
                    let (name, span) = identifier(cx)?;
                    let statement = if cx.check(TokenKind::LParen)? {
                        self.call(cx, name, span)?
                    } else {
                        let target = self.lvalue(cx, name, span)?;
                        let assign = cx.expect(TokenKind::Assign)?;
                        let value = self.expression(cx)?;
                        leaf(assign).with_child(target).with_child(value)
                    };
                    cx.expect(TokenKind::SemiColon)?;
                    Ok(statement)
                })
                .map(Some),
            _ => Err(cx.unexpected(["statement", "`}`"])),
        }
    }

    /// Declares the locals of the statement. Only those with an initializer produce a node.
    fn local_declaration(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<Option<SyntaxNode>> {
        let ty = type_name(cx)?;
        let mut head: Option<SyntaxNode> = None;
        loop {
            let (name, span) = identifier(cx)?;
            self.declare(cx, name.clone(), SymbolKind::Variable, ty, ty.size(), span.clone())?;
            if let Some(token) = cx.eat(TokenKind::Lte)? {
                let literal = literal(cx)?;
                let init = Node::new(Operator::Initialization.into(), token.span())
                    .with_child(Node::new(LexicalValue::string(name), span))
                    .with_child(literal);
                match &mut head {
                    Some(head) => head.append_sequence(init),
                    None => head = Some(init),
                }
            }
            if cx.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        cx.expect(TokenKind::SemiColon)?;
        Ok(head)
    }

    fn if_statement(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        let mut node = keyword(cx, Keyword::If)?;
        node.add_child(self.condition(cx)?);
        let then = self.block(cx)?;
        let otherwise = match cx.eat(TokenKind::Else)? {
            Some(_) => self.block(cx)?,
            None => None,
        };
        match (then, otherwise) {
            (Some(then), None) => node.add_child(then),
            (then, Some(otherwise)) => {
                let then = then.unwrap_or_else(|| Node::new(LexicalValue::Empty, node.span()));
                node.add_child(then);
                node.add_child(otherwise);
            }
            (None, None) => {}
        }
        Ok(node)
    }

    fn while_statement(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        let mut node = keyword(cx, Keyword::While)?;
        node.add_child(self.condition(cx)?);
        if let Some(body) = self.block(cx)? {
            node.add_child(body);
        }
        Ok(node)
    }

    fn condition(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        cx.expect(TokenKind::LParen)?;
        let condition = self.expression(cx)?;
        cx.expect(TokenKind::RParen)?;
        Ok(condition)
    }

    /// The rest of a call, after its name: the first argument is the child of the call, the
    /// others are chained after it.
    fn call(&mut self, cx: &mut ParseContext<'_>, name: String, span: Span) -> SyntaxResult<SyntaxNode> {
        self.lookup(cx, &name, &span)?;
        cx.expect(TokenKind::LParen)?;
        let mut call = Node::new(LexicalValue::string(name), span);
        if cx.eat(TokenKind::RParen)?.is_none() {
            let mut first = self.expression(cx)?;
            while cx.eat(TokenKind::Comma)?.is_some() {
                first.append_sequence(self.expression(cx)?);
            }
            cx.expect(TokenKind::RParen)?;
            call.add_child(first);
        }
        Ok(call)
    }

    /// The rest of an lvalue, after its name
    fn lvalue(&mut self, cx: &mut ParseContext<'_>, name: String, span: Span) -> SyntaxResult<SyntaxNode> {
        let target = self.resolve(cx, name, span)?;
        let Some(open) = cx.eat(TokenKind::LBracket)? else {
            return Ok(target);
        };
        let mut index = self.expression(cx)?;
        while let Some(caret) = cx.eat(TokenKind::Caret)? {
            let next = self.expression(cx)?;
            index = leaf(caret).with_child(index).with_child(next);
        }
        cx.expect(TokenKind::RBracket)?;
        Ok(Node::new(Operator::Index.into(), open.span())
            .with_child(target)
            .with_child(index))
    }

    /// Declares a name in the innermost scope
    fn declare(
        &mut self,
        cx: &mut ParseContext<'_>,
        name: String,
        kind: SymbolKind,
        ty: TypeName,
        size: usize,
        span: Span,
    ) -> SyntaxResult {
        let declared = match self.scopes.last_mut() {
            Some(scope) => scope.declare(name, kind, ty, size, span).map(|_| ()),
            None => cx.symbols_mut().declare(name, kind, ty, size, span).map(|_| ()),
        };
        declared.map_err(|e| {
            let span = e.span().cloned();
            cx.error(e.into(), span)
        })
    }

    /// Checks that a name is declared in any enclosing scope
    fn lookup(&self, cx: &ParseContext<'_>, name: &str, span: &Span) -> SyntaxResult {
        let declared = self.scopes.iter().rev().any(|scope| scope.contains(name))
            || cx.symbols().contains(name);
        if declared {
            return Ok(());
        }
        let error = etapa_ast::SymbolError::UndeclaredIdentifier {
            name: name.to_string(),
            span: Some(span.clone()),
        };
        Err(cx.error(error.into(), span.clone()))
    }

    /// Creates the node of a declared identifier
    fn resolve(&self, cx: &ParseContext<'_>, name: String, span: Span) -> SyntaxResult<SyntaxNode> {
        self.lookup(cx, &name, &span)?;
        Ok(Node::new(LexicalValue::string(name), span))
    }
}

impl GrammarReducer for Grammar {
    fn reduce(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        self.scopes.clear();
        cx.parse("program", |cx| self.program(cx))
    }
}

fn type_name(cx: &mut ParseContext<'_>) -> SyntaxResult<TypeName> {
    match cx.peek_kind()? {
        Some(TokenKind::Type(ty)) => {
            cx.next_token()?;
            Ok(ty)
        }
        _ => Err(cx.unexpected(["type name"])),
    }
}

fn identifier(cx: &mut ParseContext<'_>) -> SyntaxResult<(String, Span)> {
    let (value, span) = cx.expect(TokenKind::Identifier)?.into_parts();
    Ok((value.to_string(), span))
}

fn keyword(cx: &mut ParseContext<'_>, keyword: Keyword) -> SyntaxResult<SyntaxNode> {
    let token = cx.expect(TokenKind::Keyword(keyword))?;
    Ok(leaf(token))
}

fn literal(cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
    match cx.peek_kind()? {
        Some(kind) if kind.is_literal() => match cx.next_token()? {
            Some(token) => Ok(leaf(token)),
            None => Err(cx.unexpected(["literal"])),
        },
        _ => Err(cx.unexpected(["literal"])),
    }
}

fn leaf(token: Token) -> SyntaxNode {
    let (value, span) = token.into_parts();
    Node::new(value, span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::SyntaxError;
    use etapa_ast::SymbolError;
    use etapa_tokens::{LocationTracker, SourceId};
    use test_log::test;

    fn reduce(src: &str) -> Result<(SyntaxNode, SymbolTable), SyntaxError> {
        let mut input = src.as_bytes();
        let mut lexer = Lexer::new();
        let mut location = LocationTracker::new(SourceId::anonymous());
        let mut cx = ParseContext::new(&mut input, &mut lexer, &mut location);
        let tree = Grammar::new().reduce(&mut cx)?;
        Ok((tree, cx.into_symbols()))
    }

    fn pre_order(tree: &SyntaxNode) -> Vec<String> {
        let mut values = vec![];
        tree.for_each(|v| values.push(v.format()));
        values
    }

    #[test]
    fn test_empty_program() {
        let (tree, symbols) = reduce("").unwrap();
        assert!(tree.value().is_empty());
        assert_eq!(tree.len(), 1);
        assert!(symbols.is_empty());
    }

    #[test]
    fn test_functions_are_chained_on_root() {
        let (tree, symbols) = reduce("int f() {} float g(int a, char b) {} bool h() {}").unwrap();
        let names = tree
            .sequence()
            .iter()
            .map(|n| n.value().format())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["f", "g", "h"]);
        assert!(tree.children().is_empty());
        assert_eq!(symbols.lookup("g").unwrap().kind, SymbolKind::Function);
        assert_eq!(symbols.lookup("g").unwrap().ty, TypeName::Float);
        // parameters live in the scope of their function
        assert!(!symbols.contains("a"));
    }

    #[test]
    fn test_globals() {
        let (tree, symbols) = reduce("int x, v[10]; char m[2^3^4]; bool b;").unwrap();
        assert_eq!(tree.len(), 1);
        let v = symbols.lookup("v").unwrap();
        assert_eq!((v.kind, v.size), (SymbolKind::Array, 40));
        let m = symbols.lookup("m").unwrap();
        assert_eq!((m.kind, m.ty, m.size), (SymbolKind::Array, TypeName::Char, 24));
        assert_eq!(symbols.lookup("x").unwrap().size, 4);
        assert_eq!(symbols.lookup("b").unwrap().kind, SymbolKind::Variable);
        assert_eq!(
            symbols.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            vec!["x", "v", "m", "b"]
        );
    }

    #[test]
    fn test_invalid_dimension() {
        let err = reduce("int v[0];").unwrap_err();
        assert!(matches!(
            err.error_kind(),
            ErrorKind::InvalidDimension { dimension: 0, .. }
        ));
    }

    #[test]
    fn test_dimension_must_be_integer_literal() {
        for src in ["int v[-1];", "int v[2^x];", "int v[1.5];"] {
            let err = reduce(src).unwrap_err();
            match err.error_kind() {
                ErrorKind::ParseFailure { expected, .. } => {
                    assert_eq!(expected, &vec!["integer literal".to_string()], "{src}")
                }
                other => panic!("unexpected error kind {other:?} for {src}"),
            }
        }
    }

    #[test]
    fn test_statement_chain() {
        let src = "int main() {
            int x <= 1, y, z <= 2;
            y = x + z * 3;
            output y;
            return 0;
        }";
        let (tree, _) = reduce(src).unwrap();
        let main = tree.next().unwrap();
        let body = main.child(0).unwrap();
        assert_eq!(body.chain_len(), 5);
        assert_eq!(
            pre_order(main),
            vec![
                "main", "<=", "x", "1", "<=", "z", "2", "=", "y", "+", "x", "*", "z", "3",
                "output", "y", "return", "0"
            ]
        );
        assert_eq!(body.value(), &LexicalValue::Operator(Operator::Initialization));
        assert_eq!(
            body.sequence()[1].value(),
            &LexicalValue::Operator(Operator::Attribution)
        );
    }

    #[test]
    fn test_less_equal_is_comparison_outside_declarations() {
        let (tree, _) = reduce("int f(int a) { if (a <= 2) { return 1; } return 0; }").unwrap();
        let body = tree.next().unwrap().child(0).unwrap();
        let condition = body.child(0).unwrap();
        assert_eq!(condition.value(), &LexicalValue::Operator(Operator::LessEqual));
    }

    #[test]
    fn test_if_else_shapes() {
        let (tree, _) = reduce(
            "int f(int a) { if (a) { output 1; } else { output 2; } if (a) {} else { output 3; } if (a) {} }",
        )
        .unwrap();
        let body = tree.next().unwrap().child(0).unwrap();
        assert_eq!(body.children().len(), 3);
        let second = &body.sequence()[0];
        assert_eq!(second.children().len(), 3);
        assert!(second.child(1).unwrap().value().is_empty());
        let third = &body.sequence()[1];
        assert_eq!(third.children().len(), 1);
    }

    #[test]
    fn test_while_and_input() {
        let (tree, _) = reduce("int f() { int i; while (!(i >= 10)) { input i; } }").unwrap();
        let body = tree.next().unwrap().child(0).unwrap();
        assert_eq!(pre_order(body), vec!["while", "!", ">=", "i", "10", "input", "i"]);
    }

    #[test]
    fn test_calls() {
        let (tree, _) = reduce("int g(int a, int b) { return a; } int f() { g(1, 2 + 3); output g(4, 5); }").unwrap();
        let f = &tree.sequence()[1];
        let call = f.child(0).unwrap();
        assert_eq!(call.value(), &LexicalValue::string("g"));
        let first = call.child(0).unwrap();
        assert_eq!(first.value(), &LexicalValue::IntLiteral(1));
        assert_eq!(first.chain_len(), 2);
        assert_eq!(first.sequence()[0].value(), &LexicalValue::Operator(Operator::Positive));
        assert_eq!(pre_order(&call.sequence()[0]), vec!["output", "g", "4", "5"]);
    }

    #[test]
    fn test_indexing() {
        let (tree, _) = reduce("int m[2^3]; int f() { m[1^2] = m[0^0] - 1; }").unwrap();
        let body = tree.next().unwrap().child(0).unwrap();
        assert_eq!(
            pre_order(body),
            vec!["=", "[]", "m", "^", "1", "2", "-", "[]", "m", "^", "0", "0", "1"]
        );
    }

    #[test]
    fn test_nested_block_scope() {
        let err = reduce("int f() { { int x; } x = 1; }").unwrap_err();
        assert!(matches!(
            err.error_kind(),
            ErrorKind::Symbol(SymbolError::UndeclaredIdentifier { name, .. }) if name == "x"
        ));
        // shadowing an outer name is allowed
        reduce("int x; int f() { int x; { int x; } }").unwrap();
    }

    #[test]
    fn test_undeclared_identifier_is_located() {
        let err = reduce("int f() {\n  output y;\n}").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::Symbol(_)));
        let location = err.location().unwrap();
        assert_eq!(location.begin(), Position::new(2, 10));
        assert!(err.non_terminal_stack.as_ref().unwrap().contains(&"output"));
    }

    #[test]
    fn test_redeclaration() {
        let err = reduce("int f(int a) { int a; }").unwrap_err();
        assert!(matches!(
            err.error_kind(),
            ErrorKind::Symbol(SymbolError::Redeclaration { .. })
        ));
        let err = reduce("int f() {} char f;").unwrap_err();
        assert!(matches!(
            err.error_kind(),
            ErrorKind::Symbol(SymbolError::Redeclaration { .. })
        ));
    }

    #[test]
    fn test_parse_failures() {
        let err = reduce("int f() { output 1 }").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::ParseFailure { .. }));
        let err = reduce("int f() {").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::UnexpectedEof { .. }));
        let err = reduce("f() {}").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::ParseFailure { .. }));
        let err = reduce("int f() { int x <= y; }").unwrap_err();
        assert!(matches!(err.error_kind(), ErrorKind::ParseFailure { .. }));
    }
}
