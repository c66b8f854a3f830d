use crate::error::DatabaseError;
use crate::options::{InsertOptions, QueryOptions, Row, Value, Variables};
use crate::result::QueryResult;

/// Builder for INSERT and REPLACE statements. Which of the two it emits
/// is fixed at construction and cannot change afterwards.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    replace: bool,
    options: InsertOptions,
}

impl InsertQuery {
    pub fn insert() -> Self {
        Self {
            replace: false,
            options: InsertOptions::default(),
        }
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            options: InsertOptions::default(),
        }
    }

    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.options.table = Some(table.into());
        self
    }

    /// Turns duplicate-key errors into no-ops. Ignored by REPLACE,
    /// which overwrites instead.
    pub fn ignore(mut self) -> Self {
        self.options.ignore = true;
        self
    }

    /// Appends one row as (column, value-fragment) pairs. Every row must
    /// carry the same columns in the same order; the generator rejects
    /// mismatches.
    pub fn values<C, V>(mut self, row: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        let row: Row = row
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        self.options.rows.push(row);
        self
    }

    /// Primary/unique key columns, for engines that emulate REPLACE.
    pub fn keys<K: Into<String>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.options.keys = keys.into_iter().map(Into::into).collect();
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
        if self.replace {
            QueryOptions::Replace(self.options.clone())
        } else {
            QueryOptions::Insert(self.options.clone())
        }
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        super::run(self.options()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_additive() {
        let query = InsertQuery::insert()
            .into("users")
            .values([("user_id", "{int:id1}"), ("user_name", "{string:name1}")])
            .values([("user_id", "{int:id2}"), ("user_name", "{string:name2}")]);

        let QueryOptions::Insert(options) = query.options() else {
            panic!("expected INSERT options");
        };
        assert_eq!(options.rows.len(), 2);
        assert_eq!(options.rows[0][0], ("user_id".to_string(), "{int:id1}".to_string()));
    }

    #[test]
    fn replace_constructor_fixes_the_statement_kind() {
        let query = InsertQuery::replace().into("users").keys(["user_id"]);
        let options = query.options();
        assert_eq!(options.type_name(), "REPLACE");
        let QueryOptions::Replace(options) = options else {
            panic!("expected REPLACE options");
        };
        assert_eq!(options.keys, vec!["user_id".to_string()]);
    }

    #[test]
    fn ignore_flag_is_carried() {
        let query = InsertQuery::insert().into("users").ignore();
        let QueryOptions::Insert(options) = query.options() else {
            panic!("expected INSERT options");
        };
        assert!(options.ignore);
    }
}
