// MySQL driver, backed by mysql_async

use super::{prepare_sql, returns_rows, ConnectOptions, DatabaseDriver, EngineType};
use crate::error::DatabaseError;
use crate::generator::{MysqlGenerator, SqlGenerator};
use crate::options::QueryOptions;
use crate::result::{CellValue, QueryResult};
use mysql_async::prelude::Queryable;
use tracing::{debug, info};

/// MySQL driver implementation, holding one live `mysql_async` connection.
pub struct MysqlDriver {
    conn: tokio::sync::Mutex<Option<mysql_async::Conn>>,
    generator: MysqlGenerator,
}

impl MysqlDriver {
    pub fn new() -> Self {
        Self {
            conn: tokio::sync::Mutex::new(None),
            generator: MysqlGenerator,
        }
    }

    fn row_cells(row: mysql_async::Row) -> Vec<CellValue> {
        row.unwrap().into_iter().map(Self::cell_value).collect()
    }

    fn cell_value(value: mysql_async::Value) -> CellValue {
        use mysql_async::Value;

        match value {
            Value::NULL => CellValue::Null,
            Value::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => CellValue::String(text),
                Err(err) => CellValue::Binary(err.into_bytes()),
            },
            Value::Int(value) => CellValue::Int(value),
            Value::UInt(value) => CellValue::Int(value as i64),
            Value::Float(value) => CellValue::Float(value as f64),
            Value::Double(value) => CellValue::Float(value),
            Value::Date(year, month, day, hour, minute, second, _micros) => CellValue::DateTime(
                format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"),
            ),
            Value::Time(negative, days, hours, minutes, seconds, _micros) => {
                let sign = if negative { "-" } else { "" };
                let total_hours = u32::from(hours) + days * 24;
                CellValue::String(format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}"))
            }
        }
    }

    /// Server-reported errors (bad SQL, constraint violations) become a
    /// failed result carrying the server's code and message; anything else
    /// (I/O, protocol) is a hard error for the call.
    fn handle_error(sql: &str, error: mysql_async::Error) -> Result<QueryResult, DatabaseError> {
        match error {
            mysql_async::Error::Server(server) => Ok(QueryResult::ack(false)
                .with_error(i64::from(server.code), Some(server.message))
                .with_query(sql.to_string())),
            other => Err(DatabaseError::QueryError(other.to_string())),
        }
    }
}

impl Default for MysqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DatabaseDriver for MysqlDriver {
    fn engine(&self) -> EngineType {
        EngineType::Mysql
    }

    fn generator(&self) -> &dyn SqlGenerator {
        &self.generator
    }

    async fn connect(&self, options: &ConnectOptions) -> Result<bool, DatabaseError> {
        options.validate(EngineType::Mysql)?;

        let opts = mysql_async::OptsBuilder::default()
            .ip_or_hostname(options.host.clone().unwrap_or_default())
            .tcp_port(options.get_port(EngineType::Mysql))
            .user(options.username.clone())
            .pass(Some(options.password.clone()))
            .db_name(Some(options.database.clone()));

        let conn = mysql_async::Conn::new(opts)
            .await
            .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

        info!(database = %options.database, "connected to MySQL database");
        *self.conn.lock().await = Some(conn);
        Ok(true)
    }

    async fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError> {
        let sql = prepare_sql(&self.generator, options)?;
        debug!(sql = %sql, "executing MySQL query");

        let mut guard = self.conn.lock().await;
        let conn = guard
            .as_mut()
            .ok_or_else(|| DatabaseError::ConnectionFailed("not connected".to_string()))?;

        if returns_rows(options, &sql) {
            match conn.query::<mysql_async::Row, _>(sql.as_str()).await {
                Ok(rows) => {
                    let columns: Vec<String> = rows
                        .first()
                        .map(|row| {
                            row.columns_ref()
                                .iter()
                                .map(|column| column.name_str().into_owned())
                                .collect()
                        })
                        .unwrap_or_default();
                    let rows = rows.into_iter().map(Self::row_cells).collect();
                    Ok(QueryResult::rows(columns, rows).with_query(sql))
                }
                Err(error) => Self::handle_error(&sql, error),
            }
        } else {
            match conn.query_drop(sql.as_str()).await {
                Ok(()) => Ok(QueryResult::ack(true)
                    .with_affected_rows(conn.affected_rows())
                    .with_insert_id(conn.last_insert_id().unwrap_or(0))
                    .with_query(sql)),
                Err(error) => Self::handle_error(&sql, error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_reports_its_engine() {
        let driver = MysqlDriver::new();
        assert_eq!(driver.engine(), EngineType::Mysql);
        assert_eq!(driver.sanitize("it's"), "it\\'s");
    }

    #[test]
    fn cell_values_map_client_types() {
        assert_eq!(MysqlDriver::cell_value(mysql_async::Value::NULL), CellValue::Null);
        assert_eq!(
            MysqlDriver::cell_value(mysql_async::Value::Int(-7)),
            CellValue::Int(-7)
        );
        assert_eq!(
            MysqlDriver::cell_value(mysql_async::Value::Bytes(b"abc".to_vec())),
            CellValue::String("abc".to_string())
        );
        assert_eq!(
            MysqlDriver::cell_value(mysql_async::Value::Date(2024, 5, 1, 12, 30, 0, 0)),
            CellValue::DateTime("2024-05-01 12:30:00".to_string())
        );
    }

    #[tokio::test]
    async fn executing_before_connecting_fails() {
        let driver = MysqlDriver::new();
        let options = QueryOptions::Delete(crate::options::DeleteOptions {
            table: Some("users".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            driver.execute(&options).await,
            Err(DatabaseError::ConnectionFailed(_))
        ));
    }
}
