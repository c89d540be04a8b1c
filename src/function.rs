//! The `DATE_FORMAT(date, format)` function node.

use std::collections::BTreeSet;

use crate::ast::Expr;
use crate::directive::convert_format_expr;
use crate::error::DateFmtResult;
use crate::lexer::TokenKind;
use crate::parser::QueryParser;
use crate::walker::SqlWalker;

/// Name of the MySQL function being replaced.
pub const SOURCE_FUNCTION: &str = "DATE_FORMAT";

/// Name of the SQLite function emitted instead.
pub const TARGET_FUNCTION: &str = "STRFTIME";

/// A parsed `DATE_FORMAT()` call whose format operand has already been
/// converted to SQLite directives.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormatFunction {
    date: Expr,
    format: Expr,
}

impl DateFormatFunction {
    /// Build a call from MySQL-style operands.
    pub fn new(date: Expr, format: Expr) -> Self {
        Self {
            date,
            format: convert_format_expr(format),
        }
    }

    /// Parse `IDENT '(' date ',' format ')'`, matching each token strictly in
    /// that order.
    pub fn parse<P: QueryParser + ?Sized>(parser: &mut P) -> DateFmtResult<Self> {
        parser.match_token(TokenKind::Identifier)?;
        parser.match_token(TokenKind::OpenParen)?;
        let date = parser.arithmetic_expression()?;
        parser.match_token(TokenKind::Comma)?;
        let format = convert_format_expr(parser.arithmetic_expression()?);
        parser.match_token(TokenKind::CloseParen)?;

        Ok(Self { date, format })
    }

    pub fn date(&self) -> &Expr {
        &self.date
    }

    /// The converted format operand.
    pub fn format(&self) -> &Expr {
        &self.format
    }

    /// Render as `STRFTIME(<format>, <date>)`.
    pub fn sql<W: SqlWalker + ?Sized>(&self, walker: &W) -> String {
        format!(
            "{}({}, {})",
            TARGET_FUNCTION,
            walker.walk_arithmetic_primary(&self.format),
            walker.walk_arithmetic_primary(&self.date)
        )
    }
}

/// Function names that are parsed as `DATE_FORMAT()` calls.
///
/// Names are compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNames {
    names: BTreeSet<String>,
}

impl Default for FunctionNames {
    fn default() -> Self {
        Self::new([SOURCE_FUNCTION])
    }
}

impl FunctionNames {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            names: names
                .into_iter()
                .map(|n| n.as_ref().to_ascii_uppercase())
                .collect(),
        }
    }

    /// Register an additional alias.
    pub fn register(&mut self, name: &str) {
        self.names.insert(name.to_ascii_uppercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_uppercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Param;
    use crate::error::DateFmtError;
    use crate::lexer::Token;
    use crate::walker::SqliteWalker;

    /// Records the order in which the function node asks for tokens and
    /// expressions, and fails the step named in `fail_on`.
    struct ScriptedParser {
        calls: Vec<String>,
        expressions: Vec<Expr>,
        fail_on: Option<TokenKind>,
    }

    impl ScriptedParser {
        fn new(expressions: Vec<Expr>) -> Self {
            Self {
                calls: Vec::new(),
                expressions,
                fail_on: None,
            }
        }
    }

    impl QueryParser for ScriptedParser {
        fn match_token(&mut self, kind: TokenKind) -> DateFmtResult<Token> {
            self.calls.push(kind.to_string());
            if self.fail_on == Some(kind) {
                return Err(DateFmtError::syntax(0, kind.to_string(), "end of input"));
            }
            Ok(Token {
                kind,
                value: String::new(),
                position: 0,
                len: 0,
            })
        }

        fn arithmetic_expression(&mut self) -> DateFmtResult<Expr> {
            self.calls.push("expr".to_string());
            Ok(self.expressions.remove(0))
        }
    }

    #[test]
    fn test_parse_matches_tokens_in_order() {
        let mut parser =
            ScriptedParser::new(vec![Expr::path("o.created_at"), Expr::literal("%d.%c.%Y")]);
        let call = DateFormatFunction::parse(&mut parser).unwrap();

        assert_eq!(
            parser.calls,
            vec!["identifier", "'('", "expr", "','", "expr", "')'"]
        );
        assert_eq!(call.date(), &Expr::path("o.created_at"));
        assert_eq!(call.format(), &Expr::literal("%d.%m.%Y"));
    }

    #[test]
    fn test_parse_stops_at_failing_comma() {
        let mut parser = ScriptedParser::new(vec![Expr::path("d"), Expr::literal("%Y")]);
        parser.fail_on = Some(TokenKind::Comma);

        assert!(DateFormatFunction::parse(&mut parser).is_err());
        assert_eq!(parser.calls, vec!["identifier", "'('", "expr", "','"]);
    }

    #[test]
    fn test_sql_swaps_argument_order() {
        let call = DateFormatFunction::new(Expr::path("orders.created_at"), Expr::literal("%Y-%m-%d"));
        assert_eq!(
            call.sql(&SqliteWalker),
            "STRFTIME('%Y-%m-%d', orders.created_at)"
        );
    }

    #[test]
    fn test_bound_format_is_not_converted() {
        let format = Expr::Param(Param::Named("fmt".to_string()));
        let call = DateFormatFunction::new(Expr::path("d"), format.clone());
        assert_eq!(call.format(), &format);
        assert_eq!(call.sql(&SqliteWalker), "STRFTIME(:fmt, d)");
    }

    #[test]
    fn test_function_names() {
        let mut names = FunctionNames::default();
        assert!(names.contains("date_format"));
        assert!(!names.contains("mysql_date_format"));

        names.register("mysql_date_format");
        assert!(names.contains("MYSQL_DATE_FORMAT"));
        assert_eq!(names.iter().count(), 2);
    }
}
