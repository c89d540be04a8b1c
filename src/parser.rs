//! Token-level parser for arithmetic expressions.
//!
//! [`QueryParser`] is the contract a function node parses itself against:
//! match one token of an expected kind, or parse one arithmetic expression.
//! [`Parser`] is the implementation used by this crate.
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := ('+' | '-')? primary
//! primary := '(' expr ')' | STRING | NUMBER | PARAM
//!          | IDENT '(' [expr (',' expr)*] ')'
//!          | IDENT ('.' IDENT)*
//! ```

use crate::ast::{ArithmeticOp, Expr, Param};
use crate::error::{DateFmtError, DateFmtResult};
use crate::function::{DateFormatFunction, FunctionNames};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parsing primitives available to function nodes.
pub trait QueryParser {
    /// Consume the next token if it has the given kind, otherwise fail with a
    /// syntax error at that token.
    fn match_token(&mut self, kind: TokenKind) -> DateFmtResult<Token>;

    /// Parse one arithmetic expression.
    fn arithmetic_expression(&mut self) -> DateFmtResult<Expr>;
}

pub struct Parser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    functions: &'a FunctionNames,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], functions: &'a FunctionNames) -> Self {
        Self {
            tokens,
            cursor: 0,
            functions,
        }
    }

    /// Start parsing at the given token index.
    pub fn at(tokens: &'a [Token], cursor: usize, functions: &'a FunctionNames) -> Self {
        Self {
            tokens,
            cursor,
            functions,
        }
    }

    /// Index of the next unconsumed token.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Fail unless every token has been consumed.
    pub fn expect_end(&self) -> DateFmtResult<()> {
        if self.is_finished() {
            Ok(())
        } else {
            Err(self.unexpected("end of input"))
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn peek_kind_at(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.cursor + offset).map(|t| t.kind)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Byte offset of the next token, or the end of the last one.
    fn offset(&self) -> usize {
        match self.peek() {
            Some(tok) => tok.position,
            None => self.tokens.last().map_or(0, Token::end),
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> DateFmtError {
        let found = self
            .peek()
            .map_or_else(|| "end of input".to_string(), Token::describe);
        DateFmtError::syntax(self.offset(), expected, found)
    }

    fn term(&mut self) -> DateFmtResult<Expr> {
        let mut left = self.factor()?;
        while let Some(op) = self.multiplicative_op() {
            self.advance();
            let right = self.factor()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn factor(&mut self) -> DateFmtResult<Expr> {
        if let Some(op) = self.additive_op() {
            self.advance();
            let expr = self.primary()?;
            return Ok(Expr::Unary {
                op,
                expr: Box::new(expr),
            });
        }
        self.primary()
    }

    fn primary(&mut self) -> DateFmtResult<Expr> {
        let Some(tok) = self.peek().cloned() else {
            return Err(self.unexpected("arithmetic expression"));
        };

        match tok.kind {
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.arithmetic_expression()?;
                self.match_token(TokenKind::CloseParen)?;
                Ok(Expr::Nested(Box::new(inner)))
            }
            TokenKind::String => {
                self.advance();
                Ok(Expr::Literal(tok.value))
            }
            TokenKind::Integer | TokenKind::Float => {
                self.advance();
                Ok(Expr::Number(tok.value))
            }
            TokenKind::InputParameter => {
                let param = parse_param(&tok.value)
                    .ok_or_else(|| self.unexpected("parameter index within u32 range"))?;
                self.advance();
                Ok(Expr::Param(param))
            }
            TokenKind::Identifier if self.peek_kind_at(1) == Some(TokenKind::OpenParen) => {
                if self.functions.contains(&tok.value) {
                    // The function node matches its own name token.
                    let call = DateFormatFunction::parse(self)?;
                    Ok(Expr::DateFormat(Box::new(call)))
                } else {
                    self.function_call()
                }
            }
            TokenKind::Identifier | TokenKind::QuotedIdentifier => self.path(),
            _ => Err(self.unexpected("arithmetic expression")),
        }
    }

    fn function_call(&mut self) -> DateFmtResult<Expr> {
        let name = self.match_token(TokenKind::Identifier)?.value;
        self.match_token(TokenKind::OpenParen)?;

        let mut args = Vec::new();
        if self.peek_kind_at(0) == Some(TokenKind::Multiply)
            && self.peek_kind_at(1) == Some(TokenKind::CloseParen)
        {
            self.advance();
            args.push(Expr::Path(vec!["*".to_string()]));
        } else if self.peek_kind_at(0) != Some(TokenKind::CloseParen) {
            loop {
                args.push(self.arithmetic_expression()?);
                if self.peek_kind_at(0) == Some(TokenKind::Comma) {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        self.match_token(TokenKind::CloseParen)?;
        Ok(Expr::Function { name, args })
    }

    fn path(&mut self) -> DateFmtResult<Expr> {
        let mut segments = vec![self.peek().map(|t| t.value.clone()).unwrap_or_default()];
        self.advance();

        while self.peek_kind_at(0) == Some(TokenKind::Dot)
            && matches!(
                self.peek_kind_at(1),
                Some(TokenKind::Identifier | TokenKind::QuotedIdentifier)
            )
        {
            self.advance();
            if let Some(tok) = self.peek() {
                segments.push(tok.value.clone());
            }
            self.advance();
        }

        Ok(Expr::Path(segments))
    }

    fn additive_op(&self) -> Option<ArithmeticOp> {
        match self.peek_kind_at(0)? {
            TokenKind::Plus => Some(ArithmeticOp::Add),
            TokenKind::Minus => Some(ArithmeticOp::Sub),
            _ => None,
        }
    }

    fn multiplicative_op(&self) -> Option<ArithmeticOp> {
        match self.peek_kind_at(0)? {
            TokenKind::Multiply => Some(ArithmeticOp::Mul),
            TokenKind::Divide => Some(ArithmeticOp::Div),
            _ => None,
        }
    }
}

impl QueryParser for Parser<'_> {
    fn match_token(&mut self, kind: TokenKind) -> DateFmtResult<Token> {
        match self.peek() {
            Some(tok) if tok.kind == kind => {
                let tok = tok.clone();
                self.advance();
                Ok(tok)
            }
            _ => Err(self.unexpected(kind.to_string())),
        }
    }

    fn arithmetic_expression(&mut self) -> DateFmtResult<Expr> {
        let mut left = self.term()?;
        while let Some(op) = self.additive_op() {
            self.advance();
            let right = self.term()?;
            left = Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }
}

/// `None` when a `?N` index does not fit in a `u32`.
fn parse_param(raw: &str) -> Option<Param> {
    if let Some(name) = raw.strip_prefix(':') {
        return Some(Param::Named(name.to_string()));
    }
    match &raw[1..] {
        "" => Some(Param::Positional(None)),
        index => index.parse().ok().map(|n| Param::Positional(Some(n))),
    }
}

/// Parse a complete string as a single arithmetic expression.
pub fn parse_expression(input: &str, functions: &FunctionNames) -> DateFmtResult<Expr> {
    let tokens = tokenize(input)?;
    let mut parser = Parser::new(&tokens, functions);
    let expr = parser.arithmetic_expression()?;
    parser.expect_end()?;
    Ok(expr)
}
