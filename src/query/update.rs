use crate::error::DatabaseError;
use crate::options::{QueryOptions, UpdateOptions, Value, Variables};
use crate::result::QueryResult;

/// Builder for UPDATE statements.
#[derive(Debug, Clone, Default)]
pub struct UpdateQuery {
    options: UpdateOptions,
}

impl UpdateQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    /// UPDATE IGNORE. Only MySQL renders it; other dialects drop it.
    pub fn ignore(mut self) -> Self {
        self.options.ignore = true;
        self
    }

    /// Appends one column assignment. The value is a SQL fragment and
    /// may contain placeholders.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.set.push((column.into(), Some(value.into())));
        self
    }

    /// Appends a `column = NULL` assignment.
    pub fn set_null(mut self, column: impl Into<String>) -> Self {
        self.options.set.push((column.into(), None));
        self
    }

    /// WHERE condition. Without one the update touches every row, on
    /// purpose.
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
        QueryOptions::Update(self.options.clone())
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        super::run(self.options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_accumulate_in_order() {
        let query = UpdateQuery::new()
            .table("users")
            .set("user_name", "{string:name}")
            .set_null("deleted_at")
            .where_clause("user_id = {int:user_id}");

        let QueryOptions::Update(options) = query.options() else {
            panic!("expected UPDATE options");
        };
        assert_eq!(options.set.len(), 2);
        assert_eq!(options.set[0].1.as_deref(), Some("{string:name}"));
        assert_eq!(options.set[1], ("deleted_at".to_string(), None));
    }

    #[test]
    fn missing_condition_stays_missing() {
        let query = UpdateQuery::new().table("users").set("a", "1");
        let QueryOptions::Update(options) = query.options() else {
            panic!("expected UPDATE options");
        };
        assert_eq!(options.condition, None);
    }
}
