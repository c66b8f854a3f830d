use crate::error::DatabaseError;
use crate::options::{NativeOptions, QueryOptions, Value, Variables};
use crate::result::QueryResult;

/// Builder for native (raw SQL) statements.
///
/// Carries one SQL text per engine name; at generation time the active
/// engine picks its own entry. `using` selects the engine the next
/// `sql` call applies to, so several engines can be programmed on one
/// builder.
#[derive(Debug, Clone, Default)]
pub struct NativeQuery {
    options: NativeOptions,
    current_engine: Option<String>,
    /// First misuse seen while building, reported at execute time so the
    /// fluent chain never has to return mid-stream.
    pending_error: Option<String>,
}

impl NativeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the engine the following `sql` calls apply to. Engine
    /// names are matched case-insensitively.
    pub fn using(mut self, engine: impl Into<String>) -> Self {
        self.current_engine = Some(engine.into().to_lowercase());
        self
    }

    /// Sets the raw SQL for the engine selected by `using`. Calling it
    /// with no engine selected poisons the builder.
    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        match &self.current_engine {
            Some(engine) => {
                self.options.queries.insert(engine.clone(), sql.into());
            }
            None => {
                if self.pending_error.is_none() {
                    self.pending_error =
                        Some("sql() called before using() selected an engine".to_string());
                }
            }
        }
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.options.variables.extend(variables);
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.variables.insert(name.into(), value.into());
        self
    }

    pub fn options(&self) -> QueryOptions {
        QueryOptions::Native(self.options.clone())
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        if let Some(message) = &self.pending_error {
            return Err(DatabaseError::InvalidQuery(message.clone()));
        }
        super::run(self.options()).await
    }
}
