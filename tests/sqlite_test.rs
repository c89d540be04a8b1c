use chrono::NaiveDate;
use datefmt::prelude::*;
use serde_json::json;

const TS: &str = "'2024-03-05 14:07:09'";

async fn engine() -> SqliteEngine {
    SqliteEngine::connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database")
}

async fn format_ts(engine: &SqliteEngine, format: &str) -> serde_json::Value {
    let sql = format!("SELECT DATE_FORMAT({}, '{}') AS v", TS, format);
    let row = engine.query(&sql).fetch_one().await.expect("query failed");
    row["v"].clone()
}

#[tokio::test]
async fn test_converted_formats_run_on_sqlite() {
    let engine = engine().await;

    assert_eq!(format_ts(&engine, "%Y-%m-%d %H:%i:%s").await, json!("2024-03-05 14:07:09"));
    assert_eq!(format_ts(&engine, "%d/%c/%Y").await, json!("05/03/2024"));
    assert_eq!(format_ts(&engine, "%T").await, json!("14:07:09"));
    assert_eq!(format_ts(&engine, "%j").await, json!("065"));
}

#[tokio::test]
async fn test_lossy_conversions_run_on_sqlite() {
    let engine = engine().await;

    // Two digit year comes out with four digits.
    assert_eq!(format_ts(&engine, "%y").await, json!("2024"));
    // AM/PM is dropped and the hour stays on the 24 hour clock.
    assert_eq!(format_ts(&engine, "%h:%i %p").await, json!("14:07 "));
}

#[tokio::test]
async fn test_bound_format_is_used_verbatim() {
    let engine = engine().await;

    let row = engine
        .query(&format!("SELECT DATE_FORMAT({}, ?) AS v", TS))
        .bind("%Y")
        .fetch_one()
        .await
        .unwrap();
    assert_eq!(row["v"], json!("2024"));
}

#[tokio::test]
async fn test_bound_chrono_date() {
    let engine = engine().await;
    let ts = NaiveDate::from_ymd_opt(2024, 3, 5)
        .and_then(|d| d.and_hms_opt(14, 7, 9))
        .unwrap();

    let row = engine
        .query("SELECT DATE_FORMAT(?, '%Y-%m') AS v")
        .bind(ts)
        .fetch_one()
        .await
        .unwrap();
    assert_eq!(row["v"], json!("2024-03"));
}

#[tokio::test]
async fn test_table_roundtrip() {
    let engine = engine().await;

    engine
        .query("CREATE TABLE orders (id INTEGER PRIMARY KEY, created_at TEXT NOT NULL)")
        .execute()
        .await
        .unwrap();

    for (id, created_at) in [(1, "2024-01-31 08:00:00"), (2, "2023-12-24 18:30:00")] {
        let affected = engine
            .query("INSERT INTO orders (id, created_at) VALUES (?, ?)")
            .bind(id)
            .bind(created_at)
            .execute()
            .await
            .unwrap();
        assert_eq!(affected, 1);
    }

    let rows = engine
        .query("SELECT id, DATE_FORMAT(created_at, '%e.%c.%Y') AS day FROM orders ORDER BY id")
        .fetch_all()
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["id"], json!(1));
    assert_eq!(rows[0]["day"], json!("31.01.2024"));
    assert_eq!(rows[1]["day"], json!("24.12.2023"));

    let count = engine
        .query("SELECT COUNT(*) AS n FROM orders WHERE DATE_FORMAT(created_at, '%Y') = ?")
        .bind("2024")
        .fetch_one()
        .await
        .unwrap();
    assert_eq!(count["n"], json!(1));
}

#[tokio::test]
async fn test_malformed_call_fails_before_execution() {
    let engine = engine().await;
    let err = engine
        .query("SELECT DATE_FORMAT(created_at '%Y') FROM orders")
        .fetch_all()
        .await
        .unwrap_err();
    assert!(matches!(err, DateFmtError::Syntax { .. }));
}
