// Database Facade
// A `Database` owns one connected driver and is normally passed around
// explicitly. For application boundaries that want a single process-wide
// database, a default instance can be configured once and resolved lazily
// through `Database::instance`.

use crate::driver::{ConnectOptions, DatabaseDriver, EngineType, MysqlDriver, SqliteDriver};
use crate::error::DatabaseError;
use crate::options::QueryOptions;
use crate::result::QueryResult;
use std::sync::{Arc, RwLock};
use tracing::info;

static CONFIG: RwLock<Option<(String, ConnectOptions)>> = RwLock::new(None);
static ACTIVE: RwLock<Option<Arc<Database>>> = RwLock::new(None);

fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A connected database: one driver, selected by engine, ready to execute
/// built queries.
pub struct Database {
    driver: Box<dyn DatabaseDriver>,
}

impl Database {
    /// Connects the driver for `engine` with the given options.
    pub async fn connect(
        engine: EngineType,
        options: &ConnectOptions,
    ) -> Result<Self, DatabaseError> {
        let driver: Box<dyn DatabaseDriver> = match engine {
            EngineType::Mysql => Box::new(MysqlDriver::new()),
            EngineType::Sqlite => Box::new(SqliteDriver::new()),
        };
        driver.connect(options).await?;
        Ok(Self { driver })
    }

    /// Connects by engine name (`"mysql"`, `"sqlite"`). Unknown names fail
    /// with `DriverNotFound` before any connection is attempted.
    pub async fn connect_by_name(
        name: &str,
        options: &ConnectOptions,
    ) -> Result<Self, DatabaseError> {
        Self::connect(EngineType::from_name(name)?, options).await
    }

    /// Direct access to the driver.
    pub fn driver(&self) -> &dyn DatabaseDriver {
        self.driver.as_ref()
    }

    pub fn engine(&self) -> EngineType {
        self.driver.engine()
    }

    /// Runs a built query against the driver. Callers normally go through
    /// a builder's `execute` instead.
    pub async fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError> {
        self.driver.execute(options).await
    }

    /// Escapes a string using the driver's dialect rules.
    pub fn sanitize(&self, text: &str) -> String {
        self.driver.sanitize(text)
    }

    /// A timestamp literal in the engine's native format; defaults to now.
    pub fn timestamp(&self, epoch_seconds: Option<i64>) -> String {
        self.driver.timestamp(epoch_seconds)
    }

    // --- Process-wide default instance ---

    /// Configures the engine the default instance will connect to on first
    /// use. Does not connect by itself.
    pub fn set_engine(name: impl Into<String>, options: ConnectOptions) {
        *write(&CONFIG) = Some((name.into(), options));
    }

    /// The configured engine name, if any.
    pub fn engine_name() -> Option<String> {
        read(&CONFIG).as_ref().map(|(name, _)| name.clone())
    }

    /// Forgets the `set_engine` configuration. An already-connected
    /// default instance is unaffected; pair with `clear_instance` for a
    /// full reset.
    pub fn clear_engine() {
        *write(&CONFIG) = None;
    }

    /// Returns the process-wide default instance, connecting it on first
    /// use from the configuration given to `set_engine`. Fails with
    /// `EngineNotSpecified` when nothing was configured.
    pub async fn instance() -> Result<Arc<Database>, DatabaseError> {
        if let Some(database) = read(&ACTIVE).clone() {
            return Ok(database);
        }

        let (name, options) = read(&CONFIG)
            .clone()
            .ok_or(DatabaseError::EngineNotSpecified)?;

        let database = Arc::new(Self::connect_by_name(&name, &options).await?);
        info!(engine = %name, "default database instance connected");

        let mut active = write(&ACTIVE);
        // Two racing first uses both connect; the first install wins.
        if let Some(existing) = active.clone() {
            return Ok(existing);
        }
        *active = Some(Arc::clone(&database));
        Ok(database)
    }

    /// Installs an already-connected database as the default instance.
    /// The dependency-injection entry point for tests and embedders.
    pub fn set_instance(database: Arc<Database>) {
        *write(&ACTIVE) = Some(database);
    }

    /// Drops the default instance so the next `instance` call reconnects.
    /// Primarily for test isolation.
    pub fn clear_instance() {
        *write(&ACTIVE) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_engine_name_is_driver_not_found() {
        let result = Database::connect_by_name("mongodb", &ConnectOptions::default()).await;
        assert!(matches!(result, Err(DatabaseError::DriverNotFound(_))));
    }
}
