use crate::error::DatabaseError;
use crate::options::{JoinClause, QueryOptions, SelectOptions, Value, Variables};
use crate::result::QueryResult;

/// Builder for SELECT statements.
///
/// Every method mutates and returns the builder, so clauses can be set
/// in any order and revised before `execute`.
#[derive(Debug, Clone, Default)]
pub struct SelectQuery {
    options: SelectOptions,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds DISTINCT to the select expression.
    pub fn distinct(mut self) -> Self {
        self.options.distinct = true;
        self
    }

    /// Select expression. Defaults to `*` when never set.
    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.options.expr = Some(expr.into());
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    /// Table alias, rendered as `FROM table AS alias`.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.options.alias = Some(alias.into());
        self
    }

    /// Appends a join; joins render in the order they were added.
    pub fn join(
        mut self,
        join_type: impl Into<String>,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.options.joins.push(JoinClause {
            join_type: join_type.into(),
            table: table.into(),
            alias: alias.into(),
            condition: condition.into(),
        });
        self
    }

    pub fn inner_join(
        self,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.join("INNER", table, alias, condition)
    }

    pub fn left_join(
        self,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.join("LEFT", table, alias, condition)
    }

    /// WHERE condition, written with placeholders for anything dynamic.
    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.options.condition = Some(condition.into());
        self
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.options.group_by = Some(group_by.into());
        self
    }

    /// HAVING condition; only rendered when GROUP BY is also set.
    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.options.having = Some(having.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.options.order_by = Some(order_by.into());
        self
    }

    /// Maximum row count. `limit(None)` leaves the query unlimited.
    pub fn limit(mut self, limit: impl Into<Option<u64>>) -> Self {
        self.options.limit = limit.into();
        self
    }

    /// Row offset; only rendered together with a limit.
    pub fn offset(mut self, offset: impl Into<Option<u64>>) -> Self {
        self.options.offset = offset.into();
        self
    }

    /// Merges a whole variables map; existing names are overwritten.
    pub fn variables(mut self, variables: Variables) -> Self {
        self.options.variables.extend(variables);
        self
    }

    /// Binds one variable.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.variables.insert(name.into(), value.into());
        self
    }

    /// The accumulated options, ready for a generator.
    pub fn options(&self) -> QueryOptions {
        QueryOptions::Select(self.options.clone())
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        super::run(self.options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_clauses_in_any_order() {
        let query = SelectQuery::new()
            .limit(10)
            .where_clause("user_id = {int:user_id}")
            .variable("user_id", 7)
            .from("users")
            .offset(20);

        let QueryOptions::Select(options) = query.options() else {
            panic!("expected SELECT options");
        };
        assert_eq!(options.table.as_deref(), Some("users"));
        assert_eq!(options.condition.as_deref(), Some("user_id = {int:user_id}"));
        assert_eq!(options.limit, Some(10));
        assert_eq!(options.offset, Some(20));
        assert_eq!(options.variables.get("user_id"), Some(&Value::Int(7)));
    }

    #[test]
    fn limit_none_is_a_no_op() {
        let query = SelectQuery::new().from("users").limit(None);
        let QueryOptions::Select(options) = query.options() else {
            panic!("expected SELECT options");
        };
        assert_eq!(options.limit, None);
    }

    #[test]
    fn joins_preserve_insertion_order() {
        let query = SelectQuery::new()
            .from("users")
            .left_join("sessions", "s", "s.user_id = users.user_id")
            .inner_join("roles", "r", "r.role_id = users.role_id");

        let QueryOptions::Select(options) = query.options() else {
            panic!("expected SELECT options");
        };
        assert_eq!(options.joins.len(), 2);
        assert_eq!(options.joins[0].join_type, "LEFT");
        assert_eq!(options.joins[1].table, "roles");
    }

    #[test]
    fn later_variable_bindings_overwrite_earlier_ones() {
        let query = SelectQuery::new()
            .variable("user_id", 1)
            .variable("user_id", 2);
        assert_eq!(
            query.options().variables().get("user_id"),
            Some(&Value::Int(2))
        );
    }
}
