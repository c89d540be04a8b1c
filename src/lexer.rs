//! Tokenizer using nom.
//!
//! Splits query text into the tokens the parser matches against. Every
//! token keeps its byte offset and length so that [`crate::transpiler`] can
//! splice rewritten calls back into the original text.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{is_not, tag},
    character::complete::{alpha1, alphanumeric1, anychar, char, digit0, digit1, one_of},
    combinator::{map, opt, recognize, value},
    multi::{fold_many0, many0_count},
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::error::{DateFmtError, DateFmtResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    QuotedIdentifier,
    String,
    Integer,
    Float,
    InputParameter,
    OpenParen,
    CloseParen,
    Comma,
    Dot,
    Plus,
    Minus,
    Multiply,
    Divide,
    /// Any other single character (operators, semicolons, ...).
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text, except for string literals which hold the unescaped value.
    pub value: String,
    /// Byte offset in the source.
    pub position: usize,
    /// Byte length in the source.
    pub len: usize,
}

impl Token {
    /// Byte offset just past this token.
    pub fn end(&self) -> usize {
        self.position + self.len
    }

    /// Short description used in syntax errors.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::String => format!("string literal '{}'", self.value),
            TokenKind::Identifier | TokenKind::QuotedIdentifier => {
                format!("identifier {}", self.value)
            }
            _ => format!("'{}'", self.value),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Identifier | TokenKind::QuotedIdentifier => "identifier",
            TokenKind::String => "string literal",
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::InputParameter => "input parameter",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Multiply => "'*'",
            TokenKind::Divide => "'/'",
            TokenKind::Other => "symbol",
        };
        f.write_str(s)
    }
}

/// Tokenize a complete query string.
pub fn tokenize(input: &str) -> DateFmtResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = skip_trivia(input);

    while !rest.is_empty() {
        let position = input.len() - rest.len();

        if rest.starts_with('\'') && string_literal(rest).is_err() {
            return Err(DateFmtError::lex(position, "unterminated string literal"));
        }
        if rest.starts_with('"') && quoted_identifier(rest).is_err() {
            return Err(DateFmtError::lex(position, "unterminated quoted identifier"));
        }

        let (remaining, (kind, value)) = match parse_token(rest) {
            Ok(ok) => ok,
            Err(e) => {
                return Err(DateFmtError::lex(position, format!("unexpected input: {:?}", e)));
            }
        };

        tokens.push(Token {
            kind,
            value,
            position,
            len: rest.len() - remaining.len(),
        });
        rest = skip_trivia(remaining);
    }

    Ok(tokens)
}

/// Skip whitespace, `-- line` comments and `/* block */` comments.
fn skip_trivia(mut input: &str) -> &str {
    loop {
        let trimmed = input.trim_start();
        if let Some(comment) = trimmed.strip_prefix("--") {
            input = comment.find('\n').map_or("", |i| &comment[i..]);
        } else if let Some(comment) = trimmed.strip_prefix("/*") {
            input = comment.find("*/").map_or("", |i| &comment[i + 2..]);
        } else {
            return trimmed;
        }
    }
}

fn parse_token(input: &str) -> IResult<&str, (TokenKind, String)> {
    alt((
        map(string_literal, |s| (TokenKind::String, s)),
        map(number, |n: &str| {
            let kind = if n.contains(['.', 'e', 'E']) {
                TokenKind::Float
            } else {
                TokenKind::Integer
            };
            (kind, n.to_string())
        }),
        map(input_parameter, |p: &str| (TokenKind::InputParameter, p.to_string())),
        map(identifier, |s: &str| (TokenKind::Identifier, s.to_string())),
        map(quoted_identifier, |s: &str| {
            (TokenKind::QuotedIdentifier, s.to_string())
        }),
        map(anychar, |c| (punctuation(c), c.to_string())),
    ))(input)
}

fn punctuation(c: char) -> TokenKind {
    match c {
        '(' => TokenKind::OpenParen,
        ')' => TokenKind::CloseParen,
        ',' => TokenKind::Comma,
        '.' => TokenKind::Dot,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Multiply,
        '/' => TokenKind::Divide,
        _ => TokenKind::Other,
    }
}

/// `'...'` with `''` as an escaped quote.
fn string_literal(input: &str) -> IResult<&str, String> {
    delimited(
        char('\''),
        fold_many0(
            alt((value("'", tag("''")), is_not("'"))),
            String::new,
            |mut acc, part: &str| {
                acc.push_str(part);
                acc
            },
        ),
        char('\''),
    )(input)
}

/// `12`, `1.5`, `1e9`, `2.5E-3`.
fn number(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        digit1,
        opt(pair(char('.'), digit1)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)
}

/// `?`, `?1` or `:name`.
fn input_parameter(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(pair(char('?'), digit0)),
        recognize(pair(char(':'), identifier)),
    ))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// `` `name` `` or `"name"` with `""` as an escaped quote.
fn quoted_identifier(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(char('`'), is_not("`"), char('`'))),
        recognize(delimited(
            char('"'),
            many0_count(alt((tag("\"\""), is_not("\"")))),
            char('"'),
        )),
    ))(input)
}
