use crate::error::DatabaseError;
use crate::options::{DeleteOptions, QueryOptions, Value, Variables};
use crate::result::QueryResult;

/// Builder for DELETE statements.
///
/// A DELETE without a condition deletes every row in the table; the
/// builder does not second-guess that.
#[derive(Debug, Clone, Default)]
pub struct DeleteQuery {
    options: DeleteOptions,
}

impl DeleteQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.options.condition = Some(condition.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.options.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Option<u64>>) -> Self {
        self.options.limit = limit.into();
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
        QueryOptions::Delete(self.options.clone())
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        super::run(self.options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_delete_options() {
        let query = DeleteQuery::new()
            .from("sessions")
            .where_clause("expires_at < {string:now}")
            .variable("now", "2024-01-01 00:00:00")
            .limit(100);

        let QueryOptions::Delete(options) = query.options() else {
            panic!("expected DELETE options");
        };
        assert_eq!(options.table.as_deref(), Some("sessions"));
        assert_eq!(options.limit, Some(100));
        assert!(options.variables.contains_key("now"));
    }
}
