//! SQLite execution engine.
//!
//! Runs MySQL-flavoured statements against SQLite through sqlx, rewriting
//! `DATE_FORMAT()` calls on the way in.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};

use crate::config::Config;
use crate::error::{DateFmtError, DateFmtResult};
use crate::transpiler::Translator;

/// A SQLite connection pool that rewrites queries before running them.
#[derive(Clone)]
pub struct SqliteEngine {
    pool: SqlitePool,
    translator: Translator,
}

impl SqliteEngine {
    /// Connect using the default configuration.
    ///
    /// Supported URL formats:
    /// - `sqlite://path/to/db.sqlite`
    /// - `sqlite::memory:`
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let engine = SqliteEngine::connect("sqlite::memory:").await?;
    /// ```
    pub async fn connect(url: &str) -> DateFmtResult<Self> {
        Self::connect_with(url, &Config::default()).await
    }

    /// Connect with the pool size and function aliases from `config`.
    pub async fn connect_with(url: &str, config: &Config) -> DateFmtResult<Self> {
        let mut options = SqlitePoolOptions::new();

        // Every connection to `:memory:` is its own database.
        if url.contains(":memory:") {
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        } else {
            options = options.max_connections(config.sqlite.max_connections.max(1));
        }

        tracing::info!(url, "connecting to sqlite");
        let pool = options
            .connect(url)
            .await
            .map_err(|e| DateFmtError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            translator: Translator::from_config(config),
        })
    }

    /// Create a new query from MySQL-flavoured SQL.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let rows = engine
    ///     .query("SELECT DATE_FORMAT(created_at, '%Y') AS year FROM orders WHERE id = ?")
    ///     .bind(7)
    ///     .fetch_all()
    ///     .await?;
    /// ```
    pub fn query(&self, sql: &str) -> PreparedQuery {
        PreparedQuery {
            pool: self.pool.clone(),
            translator: self.translator.clone(),
            sql: sql.to_string(),
            bindings: Vec::new(),
        }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// A query with its parameter bindings.
pub struct PreparedQuery {
    pool: SqlitePool,
    translator: Translator,
    sql: String,
    bindings: Vec<QueryValue>,
}

/// Dynamic value type for query bindings.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
}

impl PreparedQuery {
    /// Bind the next positional parameter.
    pub fn bind<T: Into<QueryValue>>(mut self, value: T) -> Self {
        self.bindings.push(value.into());
        self
    }

    /// The SQL that will be sent to SQLite.
    pub fn sql(&self) -> DateFmtResult<String> {
        self.translator.rewrite(&self.sql)
    }

    /// Fetch all rows as JSON-like maps.
    pub async fn fetch_all(&self) -> DateFmtResult<Vec<HashMap<String, serde_json::Value>>> {
        let sql = self.sql()?;
        tracing::debug!(sql = %sql, bindings = self.bindings.len(), "fetch_all");

        let rows: Vec<SqliteRow> = bind_values(sqlx::query(&sql), &self.bindings)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DateFmtError::Execution(e.to_string()))?;

        Ok(rows.iter().map(row_to_map).collect())
    }

    /// Fetch a single row as a JSON-like map.
    pub async fn fetch_one(&self) -> DateFmtResult<HashMap<String, serde_json::Value>> {
        let sql = self.sql()?;
        tracing::debug!(sql = %sql, bindings = self.bindings.len(), "fetch_one");

        let row: SqliteRow = bind_values(sqlx::query(&sql), &self.bindings)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DateFmtError::Execution(e.to_string()))?;

        Ok(row_to_map(&row))
    }

    /// Execute a statement that returns no rows.
    /// Returns the number of affected rows.
    pub async fn execute(&self) -> DateFmtResult<u64> {
        let sql = self.sql()?;
        tracing::debug!(sql = %sql, bindings = self.bindings.len(), "execute");

        let result = bind_values(sqlx::query(&sql), &self.bindings)
            .execute(&self.pool)
            .await
            .map_err(|e| DateFmtError::Execution(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    values: &'q [QueryValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in values {
        query = match value {
            QueryValue::Null => query.bind(None::<String>),
            QueryValue::Bool(v) => query.bind(*v),
            QueryValue::Int(v) => query.bind(*v),
            QueryValue::Float(v) => query.bind(*v),
            QueryValue::String(v) => query.bind(v.as_str()),
            QueryValue::DateTime(v) => query.bind(*v),
        };
    }
    query
}

/// Convert a row to a map keyed by column name.
///
/// SQLite is dynamically typed, so the storage class of each value decides
/// the JSON type rather than the declared column type.
fn row_to_map(row: &SqliteRow) -> HashMap<String, serde_json::Value> {
    let mut map = HashMap::new();

    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name().to_string();
        let storage = match row.try_get_raw(i) {
            Ok(raw) if raw.is_null() => None,
            Ok(raw) => Some(raw.type_info().name().to_string()),
            Err(_) => None,
        };

        let value = match storage.as_deref() {
            None => serde_json::Value::Null,
            Some("INTEGER") => row
                .try_get::<i64, _>(i)
                .map(|v| serde_json::Value::Number(v.into()))
                .unwrap_or(serde_json::Value::Null),
            Some("REAL") => row
                .try_get::<f64, _>(i)
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Some("BOOLEAN") => row
                .try_get::<bool, _>(i)
                .map(serde_json::Value::Bool)
                .unwrap_or(serde_json::Value::Null),
            Some(_) => row
                .try_get::<String, _>(i)
                .map(serde_json::Value::String)
                .unwrap_or(serde_json::Value::Null),
        };

        map.insert(name, value);
    }

    map
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v as i64)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::String(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::String(v)
    }
}

impl From<NaiveDateTime> for QueryValue {
    fn from(v: NaiveDateTime) -> Self {
        QueryValue::DateTime(v)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(QueryValue::Null, Into::into)
    }
}

impl QueryValue {
    /// Guess a binding from command-line text: integer, float, boolean,
    /// `null`, `YYYY-MM-DD HH:MM:SS`, else string.
    pub fn parse_cli(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<i64>() {
            QueryValue::Int(n)
        } else if let Ok(f) = raw.parse::<f64>() {
            QueryValue::Float(f)
        } else if raw == "true" || raw == "false" {
            QueryValue::Bool(raw == "true")
        } else if raw.eq_ignore_ascii_case("null") {
            QueryValue::Null
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            QueryValue::DateTime(dt)
        } else {
            QueryValue::String(raw.to_string())
        }
    }
}
