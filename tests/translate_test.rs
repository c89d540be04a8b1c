use datefmt::directive::{convert_format, CONVERSION_TABLE};
use datefmt::error::DateFmtError;
use datefmt::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_end_to_end_call() {
    let sql = datefmt::translate("orders.created_at", "'%Y-%m-%d'").expect("translate failed");
    assert_eq!(sql, "STRFTIME('%Y-%m-%d', orders.created_at)");
}

#[test]
fn test_every_table_entry_in_isolation() {
    for d in CONVERSION_TABLE {
        let sql = datefmt::translate("d", &format!("'[{}]'", d.source)).unwrap();
        assert_eq!(sql, format!("STRFTIME('[{}]', d)", d.target), "{}", d.source);
    }
}

#[test]
fn test_literal_text_between_directives() {
    assert_eq!(
        convert_format("Week %v of %x, day %j (%a)"),
        "Week %W of %Y, day %j (%w)"
    );
}

#[test]
fn test_time_formats() {
    assert_eq!(convert_format("%H:%i:%S"), "%H:%M:%S");
    assert_eq!(convert_format("%r"), "%H:%M:%S");
    assert_eq!(convert_format("%l:%i %p"), "%H:%M ");
}

#[test]
fn test_bound_format_passes_through() {
    let named = datefmt::translate("o.ts", ":fmt").unwrap();
    assert_eq!(named, "STRFTIME(:fmt, o.ts)");

    let positional = datefmt::translate("o.ts", "?").unwrap();
    assert_eq!(positional, "STRFTIME(?, o.ts)");
}

#[test]
fn test_literal_with_quote_is_requoted() {
    let sql = datefmt::translate("d", "'%Y''s %c'").unwrap();
    assert_eq!(sql, "STRFTIME('%Y''s %m', d)");
}

#[test]
fn test_rewrite_multiline_statement() {
    let query = r#"
        SELECT DATE_FORMAT(o.created_at, '%Y-%m') AS month, -- grouped by month
               SUM(o.total) AS total
        FROM orders o
        WHERE DATE_FORMAT(o.created_at, '%Y') = ?
        GROUP BY month
    "#;
    let expected = r#"
        SELECT STRFTIME('%Y-%m', o.created_at) AS month, -- grouped by month
               SUM(o.total) AS total
        FROM orders o
        WHERE STRFTIME('%Y', o.created_at) = ?
        GROUP BY month
    "#;
    assert_eq!(datefmt::rewrite(query).unwrap(), expected);
}

#[test]
fn test_rewrite_arithmetic_operand() {
    let sql = datefmt::rewrite("SELECT DATE_FORMAT(o.ts + 3600, '%k') FROM o").unwrap();
    assert_eq!(sql, "SELECT STRFTIME('%H', o.ts + 3600) FROM o");
}

#[test]
fn test_translator_from_config_aliases() {
    let config = Config::from_toml_str("functions = [\"MYSQL_DATE_FORMAT\"]").unwrap();
    let translator = Translator::from_config(&config);
    assert_eq!(
        translator
            .rewrite("SELECT mysql_date_format(d, '%e.%c.%y'), DATE_FORMAT(d, '%T')")
            .unwrap(),
        "SELECT STRFTIME('%d.%m.%Y', d), STRFTIME('%H:%M:%S', d)"
    );
}

#[test]
fn test_missing_comma_is_a_syntax_error() {
    let err = datefmt::rewrite("SELECT DATE_FORMAT(d '%Y')").unwrap_err();
    match err {
        DateFmtError::Syntax { expected, .. } => assert_eq!(expected, "','"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_unterminated_literal_is_a_lex_error() {
    let err = datefmt::rewrite("SELECT DATE_FORMAT(d, '%Y)").unwrap_err();
    assert!(matches!(err, DateFmtError::Lex { position: 22, .. }));
}
