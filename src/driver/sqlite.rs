// SQLite driver, backed by rusqlite

use super::{prepare_sql, returns_rows, ConnectOptions, DatabaseDriver, EngineType};
use crate::error::DatabaseError;
use crate::generator::{SqlGenerator, SqliteGenerator};
use crate::options::QueryOptions;
use crate::result::{CellValue, QueryResult};
use rusqlite::{Connection as RusqliteConnection, OpenFlags};
use std::path::Path;
use tracing::{debug, info};

/// SQLite driver implementation. The rusqlite connection lives behind a
/// tokio mutex so the driver can be shared across tasks; statement results
/// are fully materialized before the lock is released.
pub struct SqliteDriver {
    conn: tokio::sync::Mutex<Option<RusqliteConnection>>,
    generator: SqliteGenerator,
}

impl SqliteDriver {
    pub fn new() -> Self {
        Self {
            conn: tokio::sync::Mutex::new(None),
            generator: SqliteGenerator,
        }
    }

    /// Extract the database path, expanding a leading `~/`.
    fn database_path(options: &ConnectOptions) -> String {
        if let Some(rest) = options.database.strip_prefix("~/") {
            if let Some(home) = std::env::var_os("HOME") {
                return Path::new(&home).join(rest).to_string_lossy().to_string();
            }
        }
        options.database.clone()
    }

    fn read_row(row: &rusqlite::Row<'_>, column_count: usize) -> Vec<CellValue> {
        (0..column_count)
            .map(|idx| match row.get_ref(idx) {
                Ok(rusqlite::types::ValueRef::Null) => CellValue::Null,
                Ok(rusqlite::types::ValueRef::Integer(value)) => CellValue::Int(value),
                Ok(rusqlite::types::ValueRef::Real(value)) => CellValue::Float(value),
                Ok(rusqlite::types::ValueRef::Text(bytes)) => {
                    CellValue::String(String::from_utf8_lossy(bytes).to_string())
                }
                Ok(rusqlite::types::ValueRef::Blob(bytes)) => CellValue::Binary(bytes.to_vec()),
                Err(_) => CellValue::Null,
            })
            .collect()
    }

    /// Wraps a rusqlite error into a failed result, mirroring how the
    /// engine reports errors through its result rather than a thrown
    /// failure.
    fn error_result(error: rusqlite::Error) -> QueryResult {
        let (code, message) = match &error {
            rusqlite::Error::SqliteFailure(ffi_error, message) => (
                ffi_error.extended_code as i64,
                message.clone().unwrap_or_else(|| ffi_error.to_string()),
            ),
            other => (rusqlite::ffi::SQLITE_ERROR as i64, other.to_string()),
        };
        QueryResult::ack(false).with_error(code, Some(message))
    }
}

impl Default for SqliteDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DatabaseDriver for SqliteDriver {
    fn engine(&self) -> EngineType {
        EngineType::Sqlite
    }

    fn generator(&self) -> &dyn SqlGenerator {
        &self.generator
    }

    async fn connect(&self, options: &ConnectOptions) -> Result<bool, DatabaseError> {
        options.validate(EngineType::Sqlite)?;
        let path = Self::database_path(options);

        let conn = RusqliteConnection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| {
            DatabaseError::ConnectionFailed(format!("Failed to open SQLite database: {}", e))
        })?;

        info!(path = %path, "connected to SQLite database");
        *self.conn.lock().await = Some(conn);
        Ok(true)
    }

    async fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError> {
        let sql = prepare_sql(&self.generator, options)?;
        debug!(sql = %sql, "executing SQLite query");

        let guard = self.conn.lock().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| DatabaseError::ConnectionFailed("not connected".to_string()))?;

        if returns_rows(options, &sql) {
            let outcome = (|| -> Result<(Vec<String>, Vec<Vec<CellValue>>), rusqlite::Error> {
                let mut stmt = conn.prepare(&sql)?;
                let columns: Vec<String> =
                    stmt.column_names().iter().map(|name| name.to_string()).collect();

                let mut collected = Vec::new();
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    collected.push(Self::read_row(row, columns.len()));
                }
                Ok((columns, collected))
            })();

            match outcome {
                Ok((columns, rows)) => Ok(QueryResult::rows(columns, rows).with_query(sql)),
                Err(error) => Ok(Self::error_result(error).with_query(sql)),
            }
        } else {
            match conn.execute(&sql, []) {
                Ok(affected) => Ok(QueryResult::ack(true)
                    .with_affected_rows(affected as u64)
                    .with_insert_id(conn.last_insert_rowid().max(0) as u64)
                    .with_query(sql)),
                Err(error) => Ok(Self::error_result(error).with_query(sql)),
            }
        }
    }
}
