//! Expression tree produced by the parser.
//!
//! Only the shapes that can appear as `DATE_FORMAT` operands are modelled:
//! literals, bound parameters, column paths, function calls and plain
//! arithmetic over those.

use std::fmt;

use crate::function::DateFormatFunction;

/// An arithmetic expression operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal, stored unescaped.
    Literal(String),
    /// Integer or decimal literal, stored as written.
    Number(String),
    /// Bound parameter whose value is only known at execution time.
    Param(Param),
    /// Column or alias path, e.g. `orders.created_at`.
    Path(Vec<String>),
    /// Any function call the translator does not rewrite.
    Function { name: String, args: Vec<Expr> },
    /// A `DATE_FORMAT(date, format)` call, already converted.
    DateFormat(Box<DateFormatFunction>),
    /// Unary sign.
    Unary { op: ArithmeticOp, expr: Box<Expr> },
    /// Binary arithmetic.
    Binary {
        left: Box<Expr>,
        op: ArithmeticOp,
        right: Box<Expr>,
    },
    /// Parenthesised sub-expression.
    Nested(Box<Expr>),
}

/// Parameter placeholder styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// `?` or `?N`.
    Positional(Option<u32>),
    /// `:name`.
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl Expr {
    /// Build a string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Expr::Literal(value.into())
    }

    /// Build a dotted column path from `a.b.c`.
    pub fn path(dotted: &str) -> Self {
        Expr::Path(dotted.split('.').map(str::to_string).collect())
    }

    /// The string value of a string literal.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::Literal(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Positional(None) => write!(f, "?"),
            Param::Positional(Some(n)) => write!(f, "?{}", n),
            Param::Named(name) => write!(f, ":{}", name),
        }
    }
}

impl fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        };
        f.write_str(op)
    }
}
