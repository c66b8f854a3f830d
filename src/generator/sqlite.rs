// SQLite SQL generator

use super::{delete_sql, insert_sql, native_sql, select_sql, update_sql, SqlGenerator};
use crate::driver::EngineType;
use crate::error::DatabaseError;
use crate::options::QueryOptions;

/// Generates SQLite-flavored SQL. SQLite has no native REPLACE statement
/// of the MySQL kind, so REPLACE becomes `INSERT OR REPLACE` and the
/// ignore flag becomes `INSERT OR IGNORE`. A SELECT without a condition
/// simply has no WHERE clause, and UPDATE IGNORE is not a thing here.
pub struct SqliteGenerator;

impl SqlGenerator for SqliteGenerator {
    fn engine(&self) -> EngineType {
        EngineType::Sqlite
    }

    fn generate(&self, options: &QueryOptions) -> Result<String, DatabaseError> {
        match options {
            QueryOptions::Select(select) => select_sql(select, None),
            QueryOptions::Update(update) => update_sql(update, false),
            QueryOptions::Insert(insert) => {
                let verb = if insert.ignore { "INSERT OR IGNORE" } else { "INSERT" };
                insert_sql(insert, verb)
            }
            QueryOptions::Replace(replace) => insert_sql(replace, "INSERT OR REPLACE"),
            QueryOptions::Delete(delete) => delete_sql(delete),
            QueryOptions::Native(native) => native_sql(native, EngineType::Sqlite),
        }
    }

    /// SQLite escapes by doubling single quotes; backslashes are not
    /// special.
    fn escape_string(&self, input: &str) -> String {
        input.replace('\'', "''")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{InsertOptions, SelectOptions, UpdateOptions};

    fn generate(options: &QueryOptions) -> String {
        SqliteGenerator.generate(options).unwrap()
    }

    fn one_row() -> Vec<crate::options::Row> {
        vec![vec![("user_id".to_string(), "1".to_string())]]
    }

    #[test]
    fn select_without_condition_has_no_where() {
        let options = QueryOptions::Select(SelectOptions {
            table: Some("users".to_string()),
            ..Default::default()
        });
        assert_eq!(generate(&options), "SELECT * FROM users");
    }

    #[test]
    fn select_with_condition_matches_mysql_shape() {
        let options = QueryOptions::Select(SelectOptions {
            table: Some("users".to_string()),
            condition: Some("user_id = 1".to_string()),
            limit: Some(3),
            offset: Some(6),
            ..Default::default()
        });
        assert_eq!(
            generate(&options),
            "SELECT * FROM users WHERE user_id = 1 LIMIT 6, 3"
        );
    }

    #[test]
    fn replace_becomes_insert_or_replace() {
        let options = QueryOptions::Replace(InsertOptions {
            table: Some("users".to_string()),
            rows: one_row(),
            ..Default::default()
        });
        assert_eq!(
            generate(&options),
            "INSERT OR REPLACE INTO users (`user_id`) VALUES (1)"
        );
    }

    #[test]
    fn insert_ignore_becomes_insert_or_ignore() {
        let options = QueryOptions::Insert(InsertOptions {
            table: Some("users".to_string()),
            ignore: true,
            rows: one_row(),
            ..Default::default()
        });
        assert!(generate(&options).starts_with("INSERT OR IGNORE INTO users"));
    }

    #[test]
    fn update_ignore_flag_is_dropped() {
        let options = QueryOptions::Update(UpdateOptions {
            table: Some("users".to_string()),
            ignore: true,
            set: vec![("a".to_string(), Some("1".to_string()))],
            ..Default::default()
        });
        assert!(generate(&options).starts_with("UPDATE users SET"));
    }

    #[test]
    fn escape_string_doubles_quotes() {
        let generator = SqliteGenerator;
        assert_eq!(generator.escape_string("it's"), "it''s");
        assert_eq!(generator.escape_string("a\\b"), "a\\b");
    }
}
