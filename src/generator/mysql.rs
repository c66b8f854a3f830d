// MySQL SQL generator

use super::{delete_sql, insert_sql, native_sql, select_sql, update_sql, SqlGenerator};
use crate::driver::EngineType;
use crate::error::DatabaseError;
use crate::options::QueryOptions;

/// Generates MySQL-flavored SQL. REPLACE and INSERT IGNORE are native
/// syntax here; a SELECT without a condition gets a `WHERE 1 = 1`.
pub struct MysqlGenerator;

impl SqlGenerator for MysqlGenerator {
    fn engine(&self) -> EngineType {
        EngineType::Mysql
    }

    fn generate(&self, options: &QueryOptions) -> Result<String, DatabaseError> {
        match options {
            QueryOptions::Select(select) => select_sql(select, Some("1 = 1")),
            QueryOptions::Update(update) => update_sql(update, true),
            QueryOptions::Insert(insert) => {
                let verb = if insert.ignore { "INSERT IGNORE" } else { "INSERT" };
                insert_sql(insert, verb)
            }
            QueryOptions::Replace(replace) => insert_sql(replace, "REPLACE"),
            QueryOptions::Delete(delete) => delete_sql(delete),
            QueryOptions::Native(native) => native_sql(native, EngineType::Mysql),
        }
    }

    /// Backslash-style escaping over the character set the MySQL client
    /// library escapes: NUL, newline, carriage return, backslash, both
    /// quotes and Ctrl-Z.
    fn escape_string(&self, input: &str) -> String {
        let mut escaped = String::with_capacity(input.len());
        for c in input.chars() {
            match c {
                '\0' => escaped.push_str("\\0"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\\' => escaped.push_str("\\\\"),
                '\'' => escaped.push_str("\\'"),
                '"' => escaped.push_str("\\\""),
                '\u{1a}' => escaped.push_str("\\Z"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
