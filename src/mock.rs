// Mocking Layer
// An alternate execution target implementing the same
// "execute(options) -> result" contract as a driver, backed by canned
// fixtures. Builders consult the installed mocker at execute time, so a
// mocker can be installed or cleared at any point between building and
// executing.

use crate::error::DatabaseError;
use crate::options::QueryOptions;
use crate::result::QueryResult;
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

static MOCKER: RwLock<Option<Arc<dyn QueryMock>>> = RwLock::new(None);

/// The contract a mock execution target implements. Fixture results are
/// plain `QueryResult` values, built with the same constructors the
/// drivers use.
pub trait QueryMock: Send + Sync {
    fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError>;
}

/// Installs a mocker; every subsequent builder `execute` goes to it
/// instead of the active database.
pub fn set_mocker(mocker: Arc<dyn QueryMock>) {
    *MOCKER.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(mocker);
}

/// The currently installed mocker, if any.
pub fn current_mocker() -> Option<Arc<dyn QueryMock>> {
    MOCKER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Removes the installed mocker; builders go back to the active database.
pub fn clear_mocker() {
    *MOCKER.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}

enum Fixtures {
    /// Every execution returns a clone of the same result.
    Single(QueryResult),
    /// Executions consume results strictly in order.
    Queued { results: Vec<QueryResult>, next: usize },
}

struct MockerState {
    fixtures: Fixtures,
    executed: Vec<QueryOptions>,
}

/// The default `QueryMock` implementation.
///
/// Starts in single-result mode returning a failed acknowledgement, so a
/// freshly constructed mocker never panics or blocks a test that forgot
/// to program it. `set_result` and `add_result` are mutually exclusive:
/// each clears the other mode's fixtures.
pub struct QueryMocker {
    state: Mutex<MockerState>,
}

impl QueryMocker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockerState {
                fixtures: Fixtures::Single(QueryResult::ack(false)),
                executed: Vec::new(),
            }),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Back to the initial state: failed-ack single result, empty log.
    pub fn reset(&self) {
        let mut state = self.state();
        state.fixtures = Fixtures::Single(QueryResult::ack(false));
        state.executed.clear();
    }

    /// Single-result mode: every execution returns `result`. Clears any
    /// queued results.
    pub fn set_result(&self, result: QueryResult) {
        self.state().fixtures = Fixtures::Single(result);
    }

    /// Queued mode: appends one result to be consumed by one execution.
    /// The first call switches out of single-result mode.
    pub fn add_result(&self, result: QueryResult) {
        let mut state = self.state();
        match &mut state.fixtures {
            Fixtures::Queued { results, .. } => results.push(result),
            Fixtures::Single(_) => {
                state.fixtures = Fixtures::Queued {
                    results: vec![result],
                    next: 0,
                };
            }
        }
    }

    /// Number of executions recorded so far.
    pub fn executed_count(&self) -> usize {
        self.state().executed.len()
    }

    /// The options of the most recent execution, if any.
    pub fn last_executed(&self) -> Option<QueryOptions> {
        self.state().executed.last().cloned()
    }

    /// The options of the execution at `index` (0-based), if any.
    pub fn executed(&self, index: usize) -> Option<QueryOptions> {
        self.state().executed.get(index).cloned()
    }

    /// Every recorded execution, in order.
    pub fn all_executed(&self) -> Vec<QueryOptions> {
        self.state().executed.clone()
    }
}

impl Default for QueryMocker {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryMock for QueryMocker {
    fn execute(&self, options: &QueryOptions) -> Result<QueryResult, DatabaseError> {
        let mut state = self.state();
        state.executed.push(options.clone());
        debug!(statement = options.type_name(), "mocked query execution");

        match &mut state.fixtures {
            Fixtures::Single(result) => Ok(result.clone()),
            Fixtures::Queued { results, next } => {
                let result = results.get(*next).ok_or(DatabaseError::NotEnoughResults)?;
                *next += 1;
                Ok(result.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DeleteOptions, SelectOptions};
    use crate::result::CellValue;

    fn select_options(table: &str) -> QueryOptions {
        QueryOptions::Select(SelectOptions {
            table: Some(table.to_string()),
            ..Default::default()
        })
    }

    #[test]
    fn default_result_is_a_failed_ack() {
        let mocker = QueryMocker::new();
        let result = mocker.execute(&select_options("users")).unwrap();
        assert!(!result.success());
    }

    #[test]
    fn single_result_repeats_for_every_execution() {
        let mocker = QueryMocker::new();
        mocker.set_result(QueryResult::ack(true).with_affected_rows(2));

        for _ in 0..3 {
            let result = mocker.execute(&select_options("users")).unwrap();
            assert!(result.success());
            assert_eq!(result.affected_rows(), 2);
        }
        assert_eq!(mocker.executed_count(), 3);
    }

    #[test]
    fn queued_results_are_consumed_in_order_then_exhausted() {
        let mocker = QueryMocker::new();
        mocker.add_result(QueryResult::ack(true).with_insert_id(1));
        mocker.add_result(QueryResult::ack(true).with_insert_id(2));

        let options = select_options("users");
        assert_eq!(mocker.execute(&options).unwrap().insert_id(), 1);
        assert_eq!(mocker.execute(&options).unwrap().insert_id(), 2);
        assert!(matches!(
            mocker.execute(&options),
            Err(DatabaseError::NotEnoughResults)
        ));
        // The exhausted execution is still logged.
        assert_eq!(mocker.executed_count(), 3);
    }

    #[test]
    fn set_result_clears_the_queue_and_vice_versa() {
        let mocker = QueryMocker::new();
        mocker.add_result(QueryResult::ack(true).with_insert_id(9));
        mocker.set_result(QueryResult::ack(true).with_insert_id(1));

        let options = select_options("users");
        // Queue is gone; the single result repeats.
        assert_eq!(mocker.execute(&options).unwrap().insert_id(), 1);
        assert_eq!(mocker.execute(&options).unwrap().insert_id(), 1);

        mocker.add_result(QueryResult::ack(true).with_insert_id(5));
        assert_eq!(mocker.execute(&options).unwrap().insert_id(), 5);
        assert!(mocker.execute(&options).is_err());
    }

    #[test]
    fn execution_log_is_queryable() {
        let mocker = QueryMocker::new();
        mocker.execute(&select_options("users")).unwrap();
        mocker
            .execute(&QueryOptions::Delete(DeleteOptions {
                table: Some("sessions".to_string()),
                ..Default::default()
            }))
            .unwrap();

        assert_eq!(mocker.executed_count(), 2);
        assert_eq!(mocker.executed(0), Some(select_options("users")));
        assert_eq!(mocker.executed(5), None);
        assert_eq!(mocker.last_executed().map(|o| o.type_name()), Some("DELETE"));
        assert_eq!(mocker.all_executed().len(), 2);
    }

    #[test]
    fn row_fixtures_come_back_as_cursors() {
        let mocker = QueryMocker::new();
        mocker.set_result(QueryResult::rows(
            vec!["user_id".to_string()],
            vec![vec![CellValue::Int(1)], vec![CellValue::Int(2)]],
        ));

        let mut result = mocker.execute(&select_options("users")).unwrap();
        assert!(result.success());
        assert_eq!(result.num_rows(), 2);
        assert_eq!(result.fetch_row(), Some(vec![CellValue::Int(1)]));
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let mocker = QueryMocker::new();
        mocker.add_result(QueryResult::ack(true));
        mocker.execute(&select_options("users")).unwrap();

        mocker.reset();
        assert_eq!(mocker.executed_count(), 0);
        assert!(!mocker.execute(&select_options("users")).unwrap().success());
    }
}
