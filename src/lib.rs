//! A thin database-access layer: a fluent query builder, per-dialect
//! SQL generators (MySQL, SQLite), typed placeholder substitution, and
//! a uniform result cursor over interchangeable drivers.
//!
//! Queries are described once as [`QueryOptions`] and rendered per
//! engine, so the same builder chain runs against MySQL and SQLite:
//!
//! ```no_run
//! use sqlforge::{ConnectOptions, Database, Query};
//!
//! # async fn demo() -> Result<(), sqlforge::DatabaseError> {
//! Database::set_engine("sqlite", ConnectOptions::new("app.db"));
//!
//! let mut result = Query::select()
//!     .from("users")
//!     .where_clause("user_name = {string:name}")
//!     .variable("name", "dana")
//!     .execute()
//!     .await?;
//!
//! while let Some(row) = result.fetch_assoc() {
//!     println!("{row:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! For tests, install a [`QueryMocker`] and no connection is touched at
//! all; the builders hand their options straight to the mocker.

pub mod database;
pub mod driver;
pub mod error;
pub mod generator;
pub mod mock;
pub mod options;
pub mod query;
pub mod result;
pub mod vars;

pub use database::Database;
pub use driver::{ConnectOptions, DatabaseDriver, EngineType};
pub use error::DatabaseError;
pub use generator::{MysqlGenerator, SqlGenerator, SqliteGenerator};
pub use mock::{QueryMock, QueryMocker};
pub use options::{
    DeleteOptions, InsertOptions, JoinClause, NativeOptions, QueryOptions, SelectOptions,
    UpdateOptions, Value, Variables,
};
pub use query::{
    DeleteQuery, GenericQuery, InsertQuery, NativeQuery, Query, SelectQuery, UpdateQuery,
};
pub use result::{CellValue, QueryResult, NO_ERROR};
