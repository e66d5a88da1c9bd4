//! DuckDB connection wrapper with query execution and row conversion.
//!
//! Every driver value is converted to a `serde_json::Value` so rows can be
//! deserialized straight into the typed records in [`crate::models`]:
//! - DATE and TIMESTAMP values become ISO-8601 strings
//! - DECIMAL and unsigned integers become JSON numbers

use crate::error::{DashboardError, Result};
use chrono::{DateTime, NaiveDate};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::{AccessMode, Config, Connection as DuckDbConnection};
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Days between 0001-01-01 (CE day 1) and the Unix epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Wraps a DuckDB connection to the dashboard database.
pub struct Connection {
    conn: DuckDbConnection,
    location: PathBuf,
}

impl Connection {
    /// Open (or create) a database file.
    ///
    /// With `read_only` set the file must already exist and no statement can
    /// modify it.
    pub fn open<P: AsRef<Path>>(path: P, read_only: bool) -> Result<Self> {
        let location = path.as_ref().to_path_buf();
        let connect_err = |source| DashboardError::Connect {
            path: location.clone(),
            source,
        };

        let conn = if read_only {
            let config = Config::default()
                .access_mode(AccessMode::ReadOnly)
                .map_err(connect_err)?;
            DuckDbConnection::open_with_flags(&location, config).map_err(connect_err)?
        } else {
            DuckDbConnection::open(&location).map_err(connect_err)?
        };

        Ok(Self { conn, location })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let location = PathBuf::from(":memory:");
        let conn = DuckDbConnection::open_in_memory().map_err(|source| DashboardError::Connect {
            path: location.clone(),
            source,
        })?;
        Ok(Self { conn, location })
    }

    /// Where this connection points (`:memory:` for in-memory databases).
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Run `SELECT 1` to check the database answers.
    pub fn ping(&self) -> Result<()> {
        self.execute_scalar("SELECT 1", &[])?;
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        debug!("execute: {} {:?}", sql.trim(), params);
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let column_names: Vec<String> = match rows_result.as_ref() {
            Some(stmt) => stmt
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            None => return Ok(Vec::new()),
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(
                row.into_iter().collect::<serde_json::Map<String, serde_json::Value>>(),
            );
            let item: T = serde_json::from_value(value)?;
            results.push(item);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Option<serde_json::Value>> {
        debug!("execute_scalar: {} {:?}", sql.trim(), params);
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            let value = convert_value_ref(row.get_ref(0)?);
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Names of the tables in the main schema (`SHOW TABLES`), sorted.
    pub fn tables(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .execute("SHOW TABLES", &[])?
            .into_iter()
            .filter_map(|row| {
                row.get("name")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
            .collect();
        names.sort();
        Ok(names)
    }

    /// Whether a table with this name exists.
    pub fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables()?.iter().any(|t| t == name))
    }

    /// Create (or replace) a table from a newline-delimited JSON file.
    ///
    /// Used by setup scripts and test fixtures to seed the database; the
    /// dashboard passes themselves only ever read.
    pub fn register_table_from_ndjson(&self, table_name: &str, ndjson_path: &str) -> Result<()> {
        if !is_identifier(table_name) {
            return Err(DashboardError::InvalidArgument(format!(
                "Invalid table name: {}",
                table_name
            )));
        }
        let path_fwd = ndjson_path.replace('\\', "/").replace('\'', "''");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        debug!("Seeded table {} from {}", table_name, path_fwd);
        Ok(())
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

fn float_value(f: f64) -> serde_json::Value {
    serde_json::Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn timestamp_micros(unit: TimeUnit, value: i64) -> i64 {
    match unit {
        TimeUnit::Second => value.saturating_mul(1_000_000),
        TimeUnit::Millisecond => value.saturating_mul(1_000),
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value / 1_000,
    }
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    match val {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::SmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::Int(n) => serde_json::Value::Number(n.into()),
        ValueRef::BigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UTinyInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::USmallInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::UBigInt(n) => serde_json::Value::Number(n.into()),
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; fall back to a string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => float_value(f as f64),
        ValueRef::Double(f) => float_value(f),
        ValueRef::Decimal(d) => d
            .to_string()
            .parse::<f64>()
            .map(float_value)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        ValueRef::Date32(days) => days
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
            .map(|d| serde_json::Value::String(d.format("%Y-%m-%d").to_string()))
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Timestamp(unit, value) => {
            DateTime::from_timestamp_micros(timestamp_micros(unit, value))
                .map(|ts| {
                    serde_json::Value::String(
                        ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
                    )
                })
                .unwrap_or(serde_json::Value::Null)
        }
        ValueRef::Blob(bytes) => serde_json::Value::String(format!(
            "blob:{}",
            bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
        )),
        // Intervals, lists, structs and the like never appear in dashboard rows
        _ => serde_json::Value::Null,
    }
}
