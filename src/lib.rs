//! # datefmt
//!
//! Rewrites MySQL `DATE_FORMAT(date, format)` calls into SQLite
//! `STRFTIME(format, date)` calls, converting the `%` directives of literal
//! format strings on the way.
//!
//! ## Quick Example
//!
//! ```rust
//! let sql = datefmt::rewrite(
//!     "SELECT DATE_FORMAT(o.created_at, '%d/%c/%Y %H:%i') FROM orders o",
//! )
//! .unwrap();
//! assert_eq!(sql, "SELECT STRFTIME('%d/%m/%Y %H:%M', o.created_at) FROM orders o");
//! ```
//!
//! ## Conversion
//!
//! | MySQL                         | SQLite      |
//! |-------------------------------|-------------|
//! | `%a` `%W` `%w`                | `%w`        |
//! | `%b` `%c` `%M` `%m`           | `%m`        |
//! | `%D` `%d` `%e`                | `%d`        |
//! | `%H` `%h` `%I` `%k` `%l`      | `%H`        |
//! | `%i`                          | `%M`        |
//! | `%S` `%s`                     | `%S`        |
//! | `%U` `%u` `%V` `%v`           | `%W`        |
//! | `%X` `%x` `%Y` `%y`           | `%Y`        |
//! | `%r` `%T`                     | `%H:%M:%S`  |
//! | `%p`                          | (dropped)   |
//!
//! Format strings passed as bound parameters are not converted.

pub mod ast;
pub mod config;
pub mod directive;
pub mod engine;
pub mod error;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod transpiler;
pub mod walker;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::config::Config;
    pub use crate::directive::{convert_format, explain_format, CONVERSION_TABLE};
    pub use crate::engine::{QueryValue, SqliteEngine};
    pub use crate::error::*;
    pub use crate::function::{DateFormatFunction, FunctionNames};
    pub use crate::transpiler::{ToSql, Translator};
}

/// Translate one `DATE_FORMAT()` call from the SQL text of its operands.
///
/// # Example
///
/// ```
/// let sql = datefmt::translate("orders.created_at", "'%Y-%m-%d'").unwrap();
/// assert_eq!(sql, "STRFTIME('%Y-%m-%d', orders.created_at)");
/// ```
pub fn translate(date: &str, format: &str) -> error::DateFmtResult<String> {
    transpiler::Translator::new().translate(date, format)
}

/// Rewrite every `DATE_FORMAT()` call in a SQL statement.
pub fn rewrite(sql: &str) -> error::DateFmtResult<String> {
    transpiler::Translator::new().rewrite(sql)
}
