//! Query rewriting.
//!
//! Turns MySQL-flavoured SQL into SQLite SQL by replacing every
//! `DATE_FORMAT(date, format)` call with `STRFTIME(format, date)`.

use crate::ast::Expr;
use crate::config::Config;
use crate::error::DateFmtResult;
use crate::function::{DateFormatFunction, FunctionNames};
use crate::lexer::{tokenize, TokenKind};
use crate::parser::{parse_expression, Parser};
use crate::walker::{SqlWalker, SqliteWalker};

/// Trait for converting parsed nodes to SQLite SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for Expr {
    fn to_sql(&self) -> String {
        SqliteWalker.walk_arithmetic_primary(self)
    }
}

impl ToSql for DateFormatFunction {
    fn to_sql(&self) -> String {
        self.sql(&SqliteWalker)
    }
}

/// Rewrites `DATE_FORMAT()` calls, recognising a configurable set of names.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    functions: FunctionNames,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_functions(functions: FunctionNames) -> Self {
        Self { functions }
    }

    /// `DATE_FORMAT` plus any aliases listed in the config.
    pub fn from_config(config: &Config) -> Self {
        Self::with_functions(config.function_names())
    }

    pub fn functions(&self) -> &FunctionNames {
        &self.functions
    }

    /// Translate a single call given the SQL text of its two operands.
    ///
    /// ```
    /// use datefmt::transpiler::Translator;
    ///
    /// let sql = Translator::new()
    ///     .translate("orders.created_at", "'%Y-%m-%d'")
    ///     .unwrap();
    /// assert_eq!(sql, "STRFTIME('%Y-%m-%d', orders.created_at)");
    /// ```
    pub fn translate(&self, date: &str, format: &str) -> DateFmtResult<String> {
        let date = parse_expression(date, &self.functions)?;
        let format = parse_expression(format, &self.functions)?;
        Ok(DateFormatFunction::new(date, format).to_sql())
    }

    /// Parse and render one arithmetic expression.
    pub fn compile(&self, expr: &str) -> DateFmtResult<String> {
        Ok(parse_expression(expr, &self.functions)?.to_sql())
    }

    /// Rewrite every `DATE_FORMAT()` call in a statement.
    ///
    /// Text outside the calls is copied unchanged, including whitespace,
    /// comments, string literals and quoted identifiers. Each call itself is
    /// re-rendered from its parsed operands, so comments and spacing inside
    /// the parentheses are not kept.
    pub fn rewrite(&self, sql: &str) -> DateFmtResult<String> {
        let tokens = tokenize(sql)?;
        let mut out = String::with_capacity(sql.len());
        let mut copied = 0;
        let mut rewrites = 0usize;
        let mut i = 0;

        while let Some(tok) = tokens.get(i) {
            let is_call = tok.kind == TokenKind::Identifier
                && self.functions.contains(&tok.value)
                && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::OpenParen)
                && (i == 0 || tokens[i - 1].kind != TokenKind::Dot);
            if !is_call {
                i += 1;
                continue;
            }

            let mut parser = Parser::at(&tokens, i, &self.functions);
            let call = DateFormatFunction::parse(&mut parser)?;
            let end = tokens[parser.cursor() - 1].end();

            out.push_str(&sql[copied..tok.position]);
            out.push_str(&call.to_sql());
            copied = end;
            rewrites += 1;
            i = parser.cursor();
        }

        out.push_str(&sql[copied..]);
        if rewrites > 0 {
            tracing::debug!(rewrites, sql = %out, "rewrote DATE_FORMAT calls");
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DateFmtError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_translate_end_to_end() {
        let sql = Translator::new()
            .translate("orders.created_at", "'%Y-%m-%d'")
            .unwrap();
        assert_eq!(sql, "STRFTIME('%Y-%m-%d', orders.created_at)");
    }

    #[test]
    fn test_translate_bound_format() {
        let sql = Translator::new().translate("o.ts", "?1").unwrap();
        assert_eq!(sql, "STRFTIME(?1, o.ts)");
    }

    #[test]
    fn test_compile_nested_calls() {
        let sql = Translator::new()
            .compile("DATE_FORMAT(DATE_FORMAT(d, '%Y-%c-%e'), '%y')")
            .unwrap();
        assert_eq!(sql, "STRFTIME('%Y', STRFTIME('%Y-%m-%d', d))");
    }

    #[test]
    fn test_rewrite_statement() {
        let sql = "SELECT DATE_FORMAT(o.created_at, '%d/%m/%Y') AS day, COUNT(*) \
                   FROM orders o WHERE date_format(o.created_at, '%Y') = :year GROUP BY day";
        assert_eq!(
            Translator::new().rewrite(sql).unwrap(),
            "SELECT STRFTIME('%d/%m/%Y', o.created_at) AS day, COUNT(*) \
             FROM orders o WHERE STRFTIME('%Y', o.created_at) = :year GROUP BY day"
        );
    }

    #[test]
    fn test_rewrite_leaves_non_literal_format() {
        let sql = "SELECT DATE_FORMAT(DATE(o.ts), CONCAT('%Y', '-%c')) FROM o";
        assert_eq!(
            Translator::new().rewrite(sql).unwrap(),
            "SELECT STRFTIME(CONCAT('%Y', '-%c'), DATE(o.ts)) FROM o"
        );
    }

    #[test]
    fn test_rewrite_ignores_strings_and_bare_names() {
        let sql = "SELECT 'DATE_FORMAT(x, ''%i'')', date_format FROM t -- DATE_FORMAT(";
        assert_eq!(Translator::new().rewrite(sql).unwrap(), sql);
    }

    #[test]
    fn test_rewrite_passes_double_quoted_text_through() {
        let sql = r#"SELECT "o'brien", "a""b" FROM t WHERE x = 'it''s'"#;
        assert_eq!(Translator::new().rewrite(sql).unwrap(), sql);
    }

    #[test]
    fn test_rewrite_quoted_identifier_operand() {
        assert_eq!(
            Translator::new()
                .rewrite(r#"SELECT DATE_FORMAT(o."created at", '%c') FROM o"#)
                .unwrap(),
            r#"SELECT STRFTIME('%m', o."created at") FROM o"#
        );
    }

    #[test]
    fn test_rewrite_exponent_operand() {
        assert_eq!(
            Translator::new().rewrite("SELECT DATE_FORMAT(1e9, '%Y')").unwrap(),
            "SELECT STRFTIME('%Y', 1e9)"
        );
    }

    #[test]
    fn test_rewrite_drops_comments_inside_call() {
        assert_eq!(
            Translator::new()
                .rewrite("SELECT DATE_FORMAT(d, -- fmt\n '%y') -- kept\n")
                .unwrap(),
            "SELECT STRFTIME('%Y', d) -- kept\n"
        );
    }

    #[test]
    fn test_rewrite_oversized_param_index() {
        let err = Translator::new()
            .rewrite("SELECT DATE_FORMAT(d, ?4294967296)")
            .unwrap_err();
        assert!(matches!(err, DateFmtError::Syntax { position: 22, .. }));
    }

    #[test]
    fn test_rewrite_malformed_call() {
        let err = Translator::new()
            .rewrite("SELECT DATE_FORMAT(o.ts '%Y') FROM o")
            .unwrap_err();
        assert!(matches!(
            err,
            DateFmtError::Syntax { position: 24, ref expected, .. } if expected == "','"
        ));
    }

    #[test]
    fn test_rewrite_with_alias() {
        let translator = Translator::with_functions(FunctionNames::new(["DATE_FORMAT", "DF"]));
        assert_eq!(
            translator.rewrite("SELECT DF(d, '%H:%i')").unwrap(),
            "SELECT STRFTIME('%H:%M', d)"
        );
    }
}
