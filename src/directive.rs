//! MySQL `DATE_FORMAT()` to SQLite `STRFTIME()` directive conversion.
//!
//! The table is applied entry by entry, in order, as plain substring
//! replacement over the whole format string. `%r` and `%T` expand to
//! `%H:%M:%S` and therefore sit at the end: applying them earlier would let
//! the `%M` and `%S` rules rewrite their output.
//!
//! Several entries collapse distinct MySQL directives onto one SQLite
//! directive (12h and 24h hours, 2 and 4 digit years) and `%p` is dropped
//! with no hour adjustment. Those entries are flagged `lossy`.

use serde::Serialize;

use crate::ast::Expr;

/// One row of the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Directive {
    pub source: &'static str,
    pub target: &'static str,
    pub description: &'static str,
    /// The SQLite output cannot reproduce what MySQL would print.
    pub lossy: bool,
}

const fn directive(
    source: &'static str,
    target: &'static str,
    description: &'static str,
    lossy: bool,
) -> Directive {
    Directive {
        source,
        target,
        description,
        lossy,
    }
}

pub const CONVERSION_TABLE: &[Directive] = &[
    directive("%a", "%w", "abbreviated weekday name (Sun..Sat) -> day of week (0..6)", true),
    directive("%b", "%m", "abbreviated month name (Jan..Dec) -> month (01..12)", true),
    directive("%c", "%m", "month, numeric (0..12) -> month (01..12)", true),
    directive("%D", "%d", "day of month with English suffix (1st, 2nd) -> day of month (01..31)", true),
    directive("%d", "%d", "day of month (00..31) -> day of month (01..31)", false),
    directive("%e", "%d", "day of month (0..31) -> day of month (01..31)", true),
    directive("%f", "%f", "microseconds (000000..999999) -> fractional seconds (SS.SSS)", true),
    directive("%H", "%H", "hour (00..23) -> hour (00..23)", false),
    directive("%h", "%H", "hour (01..12) -> hour (00..23)", true),
    directive("%I", "%H", "hour (01..12) -> hour (00..23)", true),
    directive("%j", "%j", "day of year (001..366) -> day of year (001..366)", false),
    directive("%k", "%H", "hour (0..23) -> hour (00..23)", true),
    directive("%l", "%H", "hour (1..12) -> hour (00..23)", true),
    directive("%M", "%m", "month name (January..December) -> month (01..12)", true),
    directive("%m", "%m", "month (00..12) -> month (01..12)", false),
    directive("%i", "%M", "minutes (00..59) -> minutes (00..59)", false),
    directive("%p", "", "AM or PM -> dropped", true),
    directive("%S", "%S", "seconds (00..59) -> seconds (00..59)", false),
    directive("%s", "%S", "seconds (00..59) -> seconds (00..59)", false),
    directive("%W", "%w", "weekday name (Sunday..Saturday) -> day of week (0..6)", true),
    directive("%U", "%W", "week (00..53), Sunday first -> week of year (00..53)", true),
    directive("%u", "%W", "week (00..53), Monday first -> week of year (00..53)", false),
    directive("%V", "%W", "week (01..53), Sunday first, with %X -> week of year (00..53)", true),
    directive("%v", "%W", "week (01..53), Monday first, with %x -> week of year (00..53)", true),
    directive("%w", "%w", "day of week (0=Sunday..6) -> day of week (0..6)", false),
    directive("%X", "%Y", "week year, Sunday first -> year (four digits)", true),
    directive("%x", "%Y", "week year, Monday first -> year (four digits)", true),
    directive("%Y", "%Y", "year (four digits) -> year (four digits)", false),
    directive("%y", "%Y", "year (two digits) -> year (four digits)", true),
    directive("%r", "%H:%M:%S", "time, 12-hour (hh:mm:ss AM) -> time, 24-hour", true),
    directive("%T", "%H:%M:%S", "time, 24-hour (hh:mm:ss) -> time, 24-hour", false),
];

/// A table entry that fired while converting a format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Substitution {
    pub source: &'static str,
    pub target: &'static str,
    pub occurrences: usize,
    pub lossy: bool,
}

/// Convert a MySQL format string into its SQLite equivalent.
pub fn convert_format(format: &str) -> String {
    CONVERSION_TABLE
        .iter()
        .fold(format.to_string(), |acc, d| acc.replace(d.source, d.target))
}

/// Same conversion as [`convert_format`], also reporting every entry that
/// changed the string. Identity entries such as `%Y -> %Y` are not reported.
pub fn explain_format(format: &str) -> (String, Vec<Substitution>) {
    let mut current = format.to_string();
    let mut hits = Vec::new();

    for d in CONVERSION_TABLE {
        if d.source == d.target {
            continue;
        }
        let occurrences = current.matches(d.source).count();
        if occurrences == 0 {
            continue;
        }
        current = current.replace(d.source, d.target);
        hits.push(Substitution {
            source: d.source,
            target: d.target,
            occurrences,
            lossy: d.lossy,
        });
    }

    (current, hits)
}

/// Convert the format operand of a `DATE_FORMAT()` call.
///
/// Only string literals are rewritten. Bound parameters and every other
/// expression are returned as-is: their value is not known until execution
/// and SQLite will interpret it verbatim.
pub fn convert_format_expr(expr: Expr) -> Expr {
    let Some(format) = expr.as_literal().filter(|f| !f.is_empty()) else {
        return expr;
    };

    let converted = convert_format(format);
    if converted != format {
        tracing::debug!(from = %format, to = %converted, "converted date format");
    }
    Expr::Literal(converted)
}
