//! DuckDB connection wrapper for the primary results store.
//!
//! Opens either a file-backed or in-memory database, creates the
//! `auction_results` table on first use, and converts query rows into
//! `serde_json` values so callers can deserialize them into typed records.

use crate::config;
use crate::error::{AuctionError, Result};
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Wraps a DuckDB connection holding the captured auction results.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open (or create) a file-backed database at `path`.
    ///
    /// Parent directories are created as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = DuckDbConnection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened results store.");
        Ok(Self { conn })
    }

    /// Open an empty in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Create the results table if it does not exist yet.
    pub fn ensure_results_table(&self) -> Result<()> {
        let schema: Vec<String> = config::RESULTS_COLUMNS
            .iter()
            .map(|(name, ty)| format!("{name} {ty}"))
            .collect();
        self.conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            config::RESULTS_TABLE,
            schema.join(", ")
        ))?;
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
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> = params
            .iter()
            .map(|p| p as &dyn duckdb::ToSql)
            .collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run.
        let column_names: Vec<String> = match rows.as_ref() {
            Some(stmt) => stmt
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
            None => Vec::new(),
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                map.insert(name.clone(), convert_value_ref(row.get_ref(i)?));
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
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
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
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Replace `table_name` with the contents of a newline-delimited JSON file.
    ///
    /// Data is streamed from disk by DuckDB, with column types inferred
    /// from the file.
    pub fn register_table_from_ndjson(
        &self,
        table_name: &str,
        ndjson_path: &str,
    ) -> Result<()> {
        let path_fwd = ndjson_path.replace('\\', "/").replace('\'', "''");
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {}; \
             CREATE TABLE {} AS SELECT * FROM read_json_auto('{}', format='newline_delimited')",
            table_name, table_name, path_fwd
        ))?;
        tracing::info!(table = table_name, path = ndjson_path, "Loaded table from NDJSON.");
        Ok(())
    }

    /// Replace the contents of the results table with a newline-delimited
    /// JSON file, keeping the table's schema.
    ///
    /// Known columns present in the file are cast to the schema's types;
    /// columns the file lacks are left NULL and unknown ones are ignored.
    /// Returns the number of rows loaded.
    pub fn import_results_ndjson(&self, ndjson_path: &str) -> Result<usize> {
        let staging = format!("{}_import", config::RESULTS_TABLE);
        self.ensure_results_table()?;
        self.register_table_from_ndjson(&staging, ndjson_path)?;

        let present = self.table_columns(&staging)?;
        let (names, casts): (Vec<&str>, Vec<String>) = config::RESULTS_COLUMNS
            .iter()
            .filter(|(name, _)| present.iter().any(|c| c.as_str() == *name))
            .map(|(name, ty)| (*name, format!("CAST({name} AS {ty})")))
            .unzip();

        if names.is_empty() {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {staging}"))?;
            return Err(AuctionError::InvalidArgument(format!(
                "{ndjson_path} has none of the result columns"
            )));
        }
        let skipped = present.len() - names.len();

        let load = format!(
            "BEGIN TRANSACTION; \
             DELETE FROM {table}; \
             INSERT INTO {table} ({cols}) SELECT {casts} FROM {staging}; \
             COMMIT;",
            table = config::RESULTS_TABLE,
            cols = names.join(", "),
            casts = casts.join(", "),
        );
        let loaded = self.conn.execute_batch(&load);
        if loaded.is_err() {
            // Leave the previous contents in place.
            let _ = self.conn.execute_batch("ROLLBACK");
        }
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {staging}"))?;
        loaded?;

        let rows = self
            .execute_scalar(&format!("SELECT COUNT(*) FROM {}", config::RESULTS_TABLE), &[])?
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;
        tracing::info!(
            path = ndjson_path,
            rows,
            columns = names.len(),
            skipped,
            "Imported auction results."
        );
        Ok(rows)
    }

    /// Column names of `table`, in declaration order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = self.execute(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? ORDER BY ordinal_position",
            &[table.to_string()],
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|mut r| match r.remove("column_name") {
                Some(serde_json::Value::String(s)) => Some(s),
                _ => None,
            })
            .collect())
    }

    /// Check whether a table exists in the main schema.
    pub fn has_table(&self, name: &str) -> Result<bool> {
        let count = self.execute_scalar(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            &[name.to_string()],
        )?;
        Ok(count.and_then(|v| v.as_i64()).unwrap_or(0) > 0)
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
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
        // SUM over integer columns comes back as HUGEINT.
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => serde_json::Value::Number(i.into()),
            Err(_) => serde_json::Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(bytes) => {
            serde_json::Value::String(String::from_utf8_lossy(bytes).to_string())
        }
        ValueRef::Date32(days) => date32_to_value(days),
        _ => serde_json::Value::Null,
    }
}

/// DuckDB stores DATE as days since the Unix epoch.
fn date32_to_value(days: i32) -> serde_json::Value {
    const UNIX_EPOCH_JULIAN_DAY: i32 = 2_440_588;
    match time::Date::from_julian_day(UNIX_EPOCH_JULIAN_DAY + days) {
        Ok(date) => serde_json::Value::String(date.to_string()),
        Err(_) => serde_json::Value::Null,
    }
}
