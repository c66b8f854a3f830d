// Query Builders
// Fluent, mutable builders that carry a statement type fixed at
// construction, assemble `QueryOptions`, and hand them to the active
// database (or the installed mocker) on `execute`.

mod delete;
mod generic;
mod insert;
mod native;
mod select;
mod update;

pub use delete::DeleteQuery;
pub use generic::GenericQuery;
pub use insert::InsertQuery;
pub use native::NativeQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

use crate::database::Database;
use crate::error::DatabaseError;
use crate::mock::{self, QueryMock};
use crate::options::QueryOptions;
use crate::result::QueryResult;
use std::sync::Arc;

/// Entry point for building queries.
///
/// ```no_run
/// use sqlforge::Query;
///
/// # async fn demo() -> Result<(), sqlforge::DatabaseError> {
/// let result = Query::select()
///     .from("users")
///     .where_clause("user_id = {int:user_id}")
///     .variable("user_id", 1)
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct Query;

impl Query {
    pub fn select() -> SelectQuery {
        SelectQuery::new()
    }

    pub fn insert() -> InsertQuery {
        InsertQuery::insert()
    }

    pub fn replace() -> InsertQuery {
        InsertQuery::replace()
    }

    pub fn update() -> UpdateQuery {
        UpdateQuery::new()
    }

    pub fn delete() -> DeleteQuery {
        DeleteQuery::new()
    }

    pub fn native() -> NativeQuery {
        NativeQuery::new()
    }

    /// Builds a generic query from a statement type name such as
    /// `"select"` or `"INSERT"`.
    pub fn create(type_name: &str) -> Result<GenericQuery, DatabaseError> {
        GenericQuery::new(type_name)
    }

    /// Routes every subsequent `execute` to `mocker` instead of the
    /// active database.
    pub fn set_mocker(mocker: Arc<dyn QueryMock>) {
        mock::set_mocker(mocker);
    }

    pub fn mocker() -> Option<Arc<dyn QueryMock>> {
        mock::current_mocker()
    }

    pub fn clear_mocker() {
        mock::clear_mocker();
    }
}

/// Shared execution path for every builder. The mocker is consulted at
/// execute time, so installing or clearing one between building and
/// executing takes effect.
pub(crate) async fn run(options: QueryOptions) -> Result<QueryResult, DatabaseError> {
    if let Some(mocker) = mock::current_mocker() {
        return mocker.execute(&options);
    }
    Database::instance().await?.execute(&options).await
}
