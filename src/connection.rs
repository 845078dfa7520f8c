//! DuckDB connection wrapper with table loading and query execution.
//!
//! Exports are NDJSON, so tables are materialized (not views): the stats
//! writer needs UPDATE, and read_json_auto is a one-shot scan anyway.
//! Datetime columns are introspected per table and cast to TIMESTAMP at load.

use crate::config;
use crate::error::Result;
use crate::store::StoreManager;
use chrono::{DateTime, SecondsFormat};
use duckdb::types::{TimeUnit, ValueRef};
use duckdb::Connection as DuckDbConnection;
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Wraps a DuckDB database holding the telemetry tables.
///
/// Tables are loaded lazily from NDJSON exports on first use. A file-backed
/// database keeps loaded tables (and any persisted stats) across sessions;
/// an in-memory database starts empty every time.
pub struct Connection {
    conn: DuckDbConnection,
    /// The store manager used to download/locate export files.
    pub store: RefCell<StoreManager>,
    loaded_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Create a connection backed by the given store.
    ///
    /// Opens an in-memory database when `in_memory` is true, otherwise the
    /// `triplog.duckdb` file inside the store's data directory.
    pub fn new(store: StoreManager, in_memory: bool) -> Result<Self> {
        let conn = if in_memory {
            DuckDbConnection::open_in_memory()?
        } else {
            DuckDbConnection::open(store.data_dir.join(config::DATABASE_FILE))?
        };
        Ok(Self {
            conn,
            store: RefCell::new(store),
            loaded_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more tables are loaded, downloading exports if needed.
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.loaded_tables.borrow().contains(*name) {
                self.ensure_table(name)?;
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows_result = stmt.query(param_values.as_slice())?;

        // Get column metadata AFTER query execution (calling before panics in duckdb-rs)
        let column_names: Vec<String> = rows_result
            .as_ref()
            .unwrap()
            .column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        let column_count = rows_result.as_ref().unwrap().column_count();

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows_result.next()? {
            let mut map = HashMap::new();
            for i in 0..column_count {
                let col_name = &column_names[i];
                let value = convert_value_ref(row.get_ref(i)?);
                map.insert(col_name.clone(), value);
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    ///
    /// First executes the query as `HashMap` rows, then deserializes each
    /// row using `serde_json`.
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

    /// Execute a write statement (UPDATE/INSERT/DELETE) and return the number
    /// of affected rows.
    pub fn execute_update(&self, sql: &str, params: &[String]) -> Result<usize> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();
        let changed = stmt.execute(param_values.as_slice())?;
        Ok(changed)
    }

    /// Create a DuckDB table from a newline-delimited JSON file.
    ///
    /// Applies the configured TIMESTAMP casts for the table (columns missing
    /// from the file are skipped). More memory-efficient than loading data
    /// into a Rust structure first, since data is streamed from disk by DuckDB.
    pub fn register_table_from_ndjson(
        &self,
        table_name: &str,
        ndjson_path: &str,
    ) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/");
        let replace_clause = self.build_timestamp_replace(&path_fwd, table_name)?;
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT *{} FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, replace_clause, path_fwd
        ))?;
        self.loaded_tables.borrow_mut().insert(table_name.to_string());
        Ok(())
    }

    /// Check whether a table has been loaded.
    pub fn has_table(&self, name: &str) -> bool {
        self.loaded_tables.borrow().contains(name)
    }

    /// Return a list of all loaded table names.
    pub fn tables(&self) -> Vec<String> {
        self.loaded_tables.borrow().iter().cloned().collect()
    }

    /// Drop all loaded tables so they will be re-created on next access.
    pub fn reset_tables(&self) {
        for name in self.loaded_tables.borrow().iter() {
            let _ = self
                .conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {}", name));
        }
        self.loaded_tables.borrow_mut().clear();
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }

    /// Lazily load an export file into a DuckDB table.
    ///
    /// A table already present in a file-backed database (from a previous
    /// session) is adopted as-is, preserving persisted stats updates.
    fn ensure_table(&self, table_name: &str) -> Result<()> {
        if self.loaded_tables.borrow().contains(table_name) {
            return Ok(());
        }

        if self.table_in_database(table_name)? {
            self.loaded_tables.borrow_mut().insert(table_name.to_string());
            return Ok(());
        }

        let path = self.store.borrow_mut().ensure_export(table_name)?;
        // Use forward slashes for DuckDB compatibility
        let path_str = path.to_string_lossy().replace('\\', "/");

        let replace_clause = self.build_timestamp_replace(&path_str, table_name)?;

        self.conn.execute_batch(&format!(
            "CREATE TABLE {} AS SELECT *{} FROM read_json_auto('{}', format='newline_delimited')",
            table_name, replace_clause, path_str
        ))?;
        self.loaded_tables.borrow_mut().insert(table_name.to_string());
        eprintln!("Loaded table: {} <- {}", table_name, path_str);

        Ok(())
    }

    /// Check the database catalog for an already-materialized table.
    fn table_in_database(&self, table_name: &str) -> Result<bool> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
        )?;
        let count: i64 = stmt.query_row([table_name], |row| row.get(0))?;
        Ok(count > 0)
    }

    /// Build a REPLACE clause casting the table's datetime columns to TIMESTAMP.
    ///
    /// Introspects the file schema (DESCRIBE reads only a sample, no full
    /// scan) and emits a cast for each configured column that is present but
    /// not already typed as TIMESTAMP. read_json_auto usually infers
    /// ISO-8601 strings correctly on its own; the cast covers exports where
    /// a datetime column survived as VARCHAR.
    fn build_timestamp_replace(&self, path_str: &str, table_name: &str) -> Result<String> {
        let configured = config::timestamp_columns();
        let wanted = match configured.get(table_name) {
            Some(cols) => *cols,
            None => return Ok(String::new()),
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name, column_type FROM \
             (DESCRIBE SELECT * FROM read_json_auto('{}', format='newline_delimited'))",
            path_str
        ))?;

        let mut rows = stmt.query([])?;
        let mut schema_map: HashMap<String, String> = HashMap::new();

        while let Some(row) = rows.next()? {
            let col_name: String = row.get(0)?;
            let col_type: String = row.get(1)?;
            schema_map.insert(col_name, col_type);
        }

        let mut exprs: Vec<String> = Vec::new();
        for col in wanted {
            match schema_map.get(*col) {
                Some(dtype) if dtype != "TIMESTAMP" => {
                    exprs.push(format!(
                        "TRY_CAST(\"{}\" AS TIMESTAMP) AS \"{}\"",
                        col, col
                    ));
                }
                _ => {}
            }
        }

        if exprs.is_empty() {
            Ok(String::new())
        } else {
            Ok(format!(" REPLACE ({})", exprs.join(", ")))
        }
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
        ValueRef::HugeInt(n) => {
            // HugeInt may not fit in i64; try i64, fallback to string
            if let Ok(i) = i64::try_from(n) {
                serde_json::Value::Number(i.into())
            } else {
                serde_json::Value::String(n.to_string())
            }
        }
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            let s = String::from_utf8_lossy(bytes).to_string();
            serde_json::Value::String(s)
        }
        ValueRef::Timestamp(unit, v) => {
            // Render as RFC 3339 so chrono's serde can parse it back into
            // DateTime<Utc> during execute_into.
            let dt = match unit {
                TimeUnit::Second => DateTime::from_timestamp(v, 0),
                TimeUnit::Millisecond => DateTime::from_timestamp_millis(v),
                TimeUnit::Microsecond => DateTime::from_timestamp_micros(v),
                TimeUnit::Nanosecond => DateTime::from_timestamp_micros(v / 1_000),
            };
            match dt {
                Some(dt) => serde_json::Value::String(
                    dt.to_rfc3339_opts(SecondsFormat::Secs, true),
                ),
                None => serde_json::Value::Null,
            }
        }
        ValueRef::Blob(bytes) => {
            // Encode blob as hex string
            serde_json::Value::String(format!(
                "blob:{}",
                bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>()
            ))
        }
        _ => {
            // For other types (Date, Time, Interval, List, etc.),
            // convert to null rather than guessing a representation
            serde_json::Value::Null
        }
    }
}
