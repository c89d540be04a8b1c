//! Rendering of expressions back into SQLite SQL text.

use crate::ast::Expr;

/// Turns an expression into a SQL fragment.
pub trait SqlWalker {
    fn walk_arithmetic_primary(&self, expr: &Expr) -> String;
}

/// SQLite renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteWalker;

impl SqlWalker for SqliteWalker {
    fn walk_arithmetic_primary(&self, expr: &Expr) -> String {
        match expr {
            Expr::Literal(s) => quote_literal(s),
            Expr::Number(n) => n.clone(),
            Expr::Param(p) => p.to_string(),
            Expr::Path(segments) => segments.join("."),
            Expr::Function { name, args } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|a| self.walk_arithmetic_primary(a))
                    .collect();
                format!("{}({})", name, args.join(", "))
            }
            Expr::DateFormat(call) => call.sql(self),
            Expr::Unary { op, expr } => format!("{}{}", op, self.walk_arithmetic_primary(expr)),
            Expr::Binary { left, op, right } => format!(
                "{} {} {}",
                self.walk_arithmetic_primary(left),
                op,
                self.walk_arithmetic_primary(right)
            ),
            Expr::Nested(inner) => format!("({})", self.walk_arithmetic_primary(inner)),
        }
    }
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
