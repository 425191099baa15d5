use etapa_tokens::{Keyword, TokenKind, TypeName};
use nom::branch::alt;
use nom::bytes::complete::{tag, take_till, take_until};
use nom::character::complete::{alpha1, alphanumeric1, char, digit1, multispace1, none_of, not_line_ending, one_of};
use nom::combinator::{map, opt, recognize};
use nom::error::{context, VerboseError};
use nom::multi::many0_count;
use nom::sequence::{delimited, pair, tuple};
use nom::IResult;
use strum::IntoEnumIterator;

type Result<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Recognizes a single token at the start of `src`, returning its kind and the text it was
/// read from.
pub fn parse_token(src: &str) -> Result<(TokenKind, &str)> {
    context(
        "token",
        alt((parse_word, parse_literal, parse_operator, parse_punctuation)),
    )(src)
}

/// Recognizes whitespace and complete comments. Never fails, but may recognize nothing.
///
/// An unterminated block comment is left unconsumed.
pub fn parse_insignificant(src: &str) -> Result<&str> {
    recognize(many0_count(alt((
        multispace1,
        parse_line_comment,
        parse_block_comment,
    ))))(src)
}

fn parse_line_comment(src: &str) -> Result<&str> {
    context("line comment", recognize(pair(tag("//"), not_line_ending)))(src)
}

fn parse_block_comment(src: &str) -> Result<&str> {
    context(
        "block comment",
        recognize(tuple((tag("/*"), take_until("*/"), tag("*/")))),
    )(src)
}

fn recognize_identifier(src: &str) -> Result<&str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(src)
}

fn parse_word(src: &str) -> Result<(TokenKind, &str)> {
    context(
        "word",
        map(recognize_identifier, |word| (classify_word(word), word)),
    )(src)
}

fn classify_word(word: &str) -> TokenKind {
    if let Some(ty) = TypeName::iter().find(|ty| ty.as_str() == word) {
        return TokenKind::Type(ty);
    }
    if let Some(keyword) = Keyword::iter().find(|keyword| keyword.as_str() == word) {
        return TokenKind::Keyword(keyword);
    }
    match word {
        "else" => TokenKind::Else,
        "true" | "false" => TokenKind::Boolean,
        _ => TokenKind::Identifier,
    }
}

fn parse_literal(src: &str) -> Result<(TokenKind, &str)> {
    context(
        "literal",
        alt((
            map(recognize_float, |f| (TokenKind::Float, f)),
            map(digit1, |i| (TokenKind::Integer, i)),
            map(
                recognize(delimited(char('\''), none_of("'\n"), char('\''))),
                |c| (TokenKind::Char, c),
            ),
            map(
                recognize(delimited(
                    char('"'),
                    take_till(|c| c == '"' || c == '\n'),
                    char('"'),
                )),
                |s| (TokenKind::String, s),
            ),
        )),
    )(src)
}

fn recognize_float(src: &str) -> Result<&str> {
    recognize(tuple((
        digit1,
        char('.'),
        digit1,
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(src)
}

fn with_text<'a>(
    kind: TokenKind,
    mut parser: impl FnMut(&'a str) -> Result<'a, &'a str>,
) -> impl FnMut(&'a str) -> Result<'a, (TokenKind, &'a str)> {
    move |src| {
        let (rest, text) = parser(src)?;
        Ok((rest, (kind, text)))
    }
}

fn parse_operator(src: &str) -> Result<(TokenKind, &str)> {
    context(
        "operator",
        alt((
            alt((
                with_text(TokenKind::Lte, tag("<=")),
                with_text(TokenKind::Gte, tag(">=")),
                with_text(TokenKind::Eq, tag("==")),
                with_text(TokenKind::Neq, tag("!=")),
                with_text(TokenKind::And, tag("&&")),
                with_text(TokenKind::Or, tag("||")),
            )),
            alt((
                with_text(TokenKind::Lt, tag("<")),
                with_text(TokenKind::Gt, tag(">")),
                with_text(TokenKind::Assign, tag("=")),
                with_text(TokenKind::Bang, tag("!")),
                with_text(TokenKind::Plus, tag("+")),
                with_text(TokenKind::Minus, tag("-")),
                with_text(TokenKind::Star, tag("*")),
                with_text(TokenKind::Div, tag("/")),
                with_text(TokenKind::Rem, tag("%")),
                with_text(TokenKind::Caret, tag("^")),
            )),
        )),
    )(src)
}

fn parse_punctuation(src: &str) -> Result<(TokenKind, &str)> {
    context(
        "punctuation",
        alt((
            with_text(TokenKind::LParen, tag("(")),
            with_text(TokenKind::RParen, tag(")")),
            with_text(TokenKind::LBracket, tag("[")),
            with_text(TokenKind::RBracket, tag("]")),
            with_text(TokenKind::LCurly, tag("{")),
            with_text(TokenKind::RCurly, tag("}")),
            with_text(TokenKind::Comma, tag(",")),
            with_text(TokenKind::SemiColon, tag(";")),
        )),
    )(src)
}
