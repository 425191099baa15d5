//! Expressions, by precedence climbing

use crate::parser::grammar::{identifier, leaf, Grammar};
use crate::parser::{ParseContext, SyntaxResult};
use etapa_ast::SyntaxNode;
use etapa_tokens::TokenKind;

/// Binary operators from the loosest to the tightest binding. All of them are left
/// associative.
const LEVELS: &[&[TokenKind]] = &[
    &[TokenKind::Or],
    &[TokenKind::And],
    &[TokenKind::Eq, TokenKind::Neq],
    &[TokenKind::Lt, TokenKind::Gt, TokenKind::Lte, TokenKind::Gte],
    &[TokenKind::Plus, TokenKind::Minus],
    &[TokenKind::Star, TokenKind::Div, TokenKind::Rem],
];

const UNARY: &[TokenKind] = &[TokenKind::Bang, TokenKind::Minus, TokenKind::Plus];

impl Grammar {
    pub(super) fn expression(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        cx.parse("expression", |cx| self.binary(cx, 0))
    }

    fn binary(&mut self, cx: &mut ParseContext<'_>, level: usize) -> SyntaxResult<SyntaxNode> {
        let Some(operators) = LEVELS.get(level) else {
            return self.unary(cx);
        };
        let mut left = self.binary(cx, level + 1)?;
        while let Some(kind) = cx.peek_kind()? {
            if !operators.contains(&kind) {
                break;
            }
            let Some(operator) = cx.next_token()? else {
                break;
            };
            let right = self.binary(cx, level + 1)?;
            left = leaf(operator).with_child(left).with_child(right);
        }
        Ok(left)
    }

    fn unary(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        match cx.peek_kind()? {
            Some(kind) if UNARY.contains(&kind) => {
                let operator = cx.next_token()?;
                let operand = cx.parse("unary", |cx| self.unary(cx))?;
                match operator {
                    Some(operator) => Ok(leaf(operator).with_child(operand)),
                    None => Ok(operand),
                }
            }
            _ => self.primary(cx),
        }
    }

    fn primary(&mut self, cx: &mut ParseContext<'_>) -> SyntaxResult<SyntaxNode> {
        match cx.peek_kind()? {
            Some(kind) if kind.is_literal() => match cx.next_token()? {
                Some(token) => Ok(leaf(token)),
                None => Err(cx.unexpected(["expression"])),
            },
            Some(TokenKind::Identifier) => {
                let (name, span) = identifier(cx)?;
                if cx.check(TokenKind::LParen)? {
                    self.call(cx, name, span)
                } else {
                    self.lvalue(cx, name, span)
                }
            }
            Some(TokenKind::LParen) => {
                cx.next_token()?;
                let inner = self.expression(cx)?;
                cx.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            _ => Err(cx.unexpected(["expression"])),
        }
    }
}
