// Database Drivers
// The per-engine contract binding generator + substitution + client into
// one executable unit. A driver owns at most one live connection for its
// whole lifetime; there is no modeled disconnect.

pub mod mysql;
pub mod sqlite;

pub use mysql::MysqlDriver;
pub use sqlite::SqliteDriver;

use crate::error::DatabaseError;
use crate::generator::SqlGenerator;
use crate::options::QueryOptions;
use crate::result::QueryResult;
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Supported database engines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EngineType {
    Mysql,
    Sqlite,
}

impl EngineType {
    /// Resolves an engine name to its driver implementation. This is the
    /// fixed naming convention used by the facade; unknown names fail with
    /// `DriverNotFound`.
    pub fn from_name(name: &str) -> Result<Self, DatabaseError> {
        match name.to_lowercase().as_str() {
            "mysql" => Ok(EngineType::Mysql),
            "sqlite" | "sqlite3" => Ok(EngineType::Sqlite),
            _ => Err(DatabaseError::DriverNotFound(name.to_string())),
        }
    }

    /// Canonical lower-case engine name, also the key native queries are
    /// filed under.
    pub fn name(&self) -> &'static str {
        match self {
            EngineType::Mysql => "mysql",
            EngineType::Sqlite => "sqlite",
        }
    }

    /// Display name for messages
    pub fn display_name(&self) -> &'static str {
        match self {
            EngineType::Mysql => "MySQL",
            EngineType::Sqlite => "SQLite",
        }
    }

    /// Default port for the engine
    pub fn default_port(&self) -> u16 {
        match self {
            EngineType::Mysql => 3306,
            EngineType::Sqlite => 0, // File-based, no port
        }
    }
}

/// Connection options, passed through opaquely to the chosen driver.
/// For SQLite, `database` is the database file path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
}

impl ConnectOptions {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, engine: EngineType) -> Result<(), DatabaseError> {
        match engine {
            EngineType::Sqlite => {
                if self.database.is_empty() {
                    return Err(DatabaseError::InvalidConfig(
                        "SQLite database path is required".to_string(),
                    ));
                }
            }
            EngineType::Mysql => {
                if self.host.as_deref().map(str::is_empty).unwrap_or(true) {
                    return Err(DatabaseError::InvalidConfig("Host is required".to_string()));
                }
                if self.username.as_deref().map(str::is_empty).unwrap_or(true) {
                    return Err(DatabaseError::InvalidConfig("Username is required".to_string()));
                }
                if self.database.is_empty() {
                    return Err(DatabaseError::InvalidConfig(
                        "Database name is required".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn get_port(&self, engine: EngineType) -> u16 {
        self.port.unwrap_or_else(|| engine.default_port())
    }
}

/// Database driver trait - every engine implements this.
///
/// `execute` is synchronous per call: each invocation is independent, no
/// transaction state spans calls. Generation and substitution failures are
/// `Err`; SQL errors reported by the client are embedded in the returned
/// cursor instead.
#[async_trait::async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// The engine this driver connects to.
    fn engine(&self) -> EngineType;

    /// The dialect generator used to compile options into SQL.
    fn generator(&self) -> &dyn SqlGenerator;

    /// Establishes the driver's connection. Fails with `ConnectionFailed`
    /// when the underlying client cannot connect.
    async fn connect(&self, options: &ConnectOptions) -> Result<bool, DatabaseError>;

    /// Compiles, substitutes and runs one statement.
    async fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError>;

    /// Escapes a string for safe embedding into a query.
    fn sanitize(&self, text: &str) -> String {
        self.generator().escape_string(text)
    }

    /// A timestamp literal in the engine's native format
    /// (`YYYY-MM-DD HH:MM:SS` for both supported engines). Defaults to
    /// the current time.
    fn timestamp(&self, epoch_seconds: Option<i64>) -> String {
        let time = match epoch_seconds {
            Some(seconds) => Local
                .timestamp_opt(seconds, 0)
                .single()
                .unwrap_or_else(Local::now),
            None => Local::now(),
        };
        time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Compiles options into final SQL: dialect generation followed by
/// placeholder substitution.
pub(crate) fn prepare_sql(
    generator: &dyn SqlGenerator,
    options: &QueryOptions,
) -> Result<String, DatabaseError> {
    let sql = generator.generate(options)?;
    crate::vars::replace_variables(&sql, options.variables(), generator)
}

/// Whether an executed statement should be read as a row set. Native
/// queries carry no statement kind, so the SQL text is sniffed.
pub(crate) fn returns_rows(options: &QueryOptions, sql: &str) -> bool {
    match options {
        QueryOptions::Native(_) => sql.trim_start().to_uppercase().starts_with("SELECT"),
        _ => options.returns_rows(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{NativeOptions, SelectOptions};

    #[test]
    fn engine_names_resolve() {
        assert_eq!(EngineType::from_name("mysql").unwrap(), EngineType::Mysql);
        assert_eq!(EngineType::from_name("MySQL").unwrap(), EngineType::Mysql);
        assert_eq!(EngineType::from_name("sqlite").unwrap(), EngineType::Sqlite);
        assert_eq!(EngineType::from_name("sqlite3").unwrap(), EngineType::Sqlite);

        match EngineType::from_name("oracle") {
            Err(DatabaseError::DriverNotFound(name)) => assert_eq!(name, "oracle"),
            other => panic!("expected DriverNotFound, got {:?}", other),
        }
    }

    #[test]
    fn sqlite_options_require_a_path() {
        let options = ConnectOptions::default();
        assert!(options.validate(EngineType::Sqlite).is_err());
        assert!(ConnectOptions::new("/tmp/test.db").validate(EngineType::Sqlite).is_ok());
    }

    #[test]
    fn mysql_options_require_host_user_and_database() {
        let mut options = ConnectOptions::new("app");
        assert!(options.validate(EngineType::Mysql).is_err());

        options.host = Some("localhost".to_string());
        options.username = Some("root".to_string());
        assert!(options.validate(EngineType::Mysql).is_ok());
        assert_eq!(options.get_port(EngineType::Mysql), 3306);
    }

    #[test]
    fn prepare_sql_generates_then_substitutes() {
        let options = QueryOptions::Select(SelectOptions {
            table: Some("users".to_string()),
            condition: Some("user_id = {int:user_id}".to_string()),
            variables: [("user_id".to_string(), crate::options::Value::Int(1))]
                .into_iter()
                .collect(),
            ..Default::default()
        });
        let sql = prepare_sql(&crate::generator::MysqlGenerator, &options).unwrap();
        assert_eq!(sql, "SELECT * FROM users WHERE user_id = 1");
    }

    #[test]
    fn native_statements_sniff_for_select() {
        let native = QueryOptions::Native(NativeOptions::default());
        assert!(returns_rows(&native, "  select 1"));
        assert!(!returns_rows(&native, "DELETE FROM users"));

        let select = QueryOptions::Select(SelectOptions::default());
        assert!(returns_rows(&select, "irrelevant"));
    }

    struct FormatOnly;

    #[async_trait::async_trait]
    impl DatabaseDriver for FormatOnly {
        fn engine(&self) -> EngineType {
            EngineType::Sqlite
        }

        fn generator(&self) -> &dyn crate::generator::SqlGenerator {
            &crate::generator::SqliteGenerator
        }

        async fn connect(&self, _options: &ConnectOptions) -> Result<bool, DatabaseError> {
            Ok(false)
        }

        async fn execute(&self, _options: &QueryOptions) -> Result<QueryResult, DatabaseError> {
            Err(DatabaseError::QueryError("not a real driver".to_string()))
        }
    }

    #[test]
    fn timestamp_formats_epoch_seconds() {
        // 2021-01-01T00:00:00Z, rendered in local time; check shape and
        // a fixed-width layout rather than the exact wall-clock value.
        let formatted = FormatOnly.timestamp(Some(1_609_459_200));
        assert_eq!(formatted.len(), 19);
        assert_eq!(&formatted[4..5], "-");
        assert_eq!(&formatted[10..11], " ");
        assert_eq!(&formatted[13..14], ":");
    }
}
