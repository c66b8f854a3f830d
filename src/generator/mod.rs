// SQL Generators
// Pure option-map to SQL text compilation, one implementation per dialect.
// Generators never touch a connection; escaping is string-level and the
// drivers call them right before substitution.

mod mysql;
mod sqlite;

pub use mysql::MysqlGenerator;
pub use sqlite::SqliteGenerator;

use crate::driver::EngineType;
use crate::error::DatabaseError;
use crate::options::{DeleteOptions, InsertOptions, NativeOptions, SelectOptions, UpdateOptions};
use crate::options::{QueryOptions, Row};

/// One dialect's SQL generation and string escaping.
pub trait SqlGenerator: Send + Sync {
    /// The engine this generator produces SQL for.
    fn engine(&self) -> EngineType;

    /// Compiles the accumulated options into a single SQL statement.
    /// Placeholders in the options survive into the output; substitution
    /// is a separate pass.
    fn generate(&self, options: &QueryOptions) -> Result<String, DatabaseError>;

    /// Escapes a string for safe embedding between single quotes.
    fn escape_string(&self, input: &str) -> String;
}

fn required_table<'a>(table: &'a Option<String>, statement: &str) -> Result<&'a str, DatabaseError> {
    table
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DatabaseError::InvalidQuery(format!("a {statement} query requires a table")))
}

/// SELECT shared across dialects. `default_condition` is the dialect's
/// stand-in for a missing WHERE: MySQL emits `1 = 1`, SQLite drops the
/// clause.
pub(crate) fn select_sql(
    options: &SelectOptions,
    default_condition: Option<&str>,
) -> Result<String, DatabaseError> {
    let table = required_table(&options.table, "SELECT")?;

    let mut sql = String::from("SELECT");
    if options.distinct {
        sql.push_str(" DISTINCT");
    }
    sql.push(' ');
    sql.push_str(options.expr.as_deref().unwrap_or("*"));
    sql.push_str(" FROM ");
    sql.push_str(table);
    if let Some(alias) = &options.alias {
        sql.push_str(" AS ");
        sql.push_str(alias);
    }

    for join in &options.joins {
        sql.push_str(&format!(
            " {} JOIN {} AS {} ON {}",
            join.join_type.to_uppercase(),
            join.table,
            join.alias,
            join.condition
        ));
    }

    match (&options.condition, default_condition) {
        (Some(condition), _) => {
            sql.push_str(" WHERE ");
            sql.push_str(condition);
        }
        (None, Some(default)) => {
            sql.push_str(" WHERE ");
            sql.push_str(default);
        }
        (None, None) => {}
    }

    if let Some(group_by) = &options.group_by {
        sql.push_str(" GROUP BY ");
        sql.push_str(group_by);

        // HAVING rides along with GROUP BY only; a HAVING set on its own
        // is dropped. Pinned by tests in both dialects.
        if let Some(having) = &options.having {
            sql.push_str(" HAVING ");
            sql.push_str(having);
        }
    }

    if let Some(order_by) = &options.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }

    if let Some(limit) = options.limit {
        sql.push_str(" LIMIT ");
        if let Some(offset) = options.offset {
            sql.push_str(&format!("{offset}, "));
        }
        sql.push_str(&limit.to_string());
    }

    Ok(sql)
}

pub(crate) fn update_sql(
    options: &UpdateOptions,
    allow_ignore: bool,
) -> Result<String, DatabaseError> {
    let table = required_table(&options.table, "UPDATE")?;

    if options.set.is_empty() {
        return Err(DatabaseError::InvalidQuery(
            "an UPDATE query requires at least one SET value".to_string(),
        ));
    }

    let mut sql = String::from("UPDATE ");
    if options.ignore && allow_ignore {
        sql.push_str("IGNORE ");
    }
    sql.push_str(table);
    sql.push_str(" SET ");

    let assignments: Vec<String> = options
        .set
        .iter()
        .map(|(column, value)| match value {
            Some(value) => format!("{column} = {value}"),
            None => format!("{column} = NULL"),
        })
        .collect();
    sql.push_str(&assignments.join(", "));

    if let Some(condition) = &options.condition {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
    if let Some(order_by) = &options.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok(sql)
}

/// INSERT/REPLACE shared across dialects; the dialect supplies the verb
/// (`INSERT IGNORE`, `REPLACE`, `INSERT OR REPLACE`, ...).
pub(crate) fn insert_sql(options: &InsertOptions, verb: &str) -> Result<String, DatabaseError> {
    let table = required_table(&options.table, "INSERT or REPLACE")?;
    let columns = insert_columns(&options.rows)?;

    let tuples: Vec<String> = options
        .rows
        .iter()
        .map(|row| {
            let values: Vec<&str> = row.iter().map(|(_, value)| value.as_str()).collect();
            format!("({})", values.join(", "))
        })
        .collect();

    Ok(format!(
        "{verb} INTO {table} (`{}`) VALUES {}",
        columns.join("`, `"),
        tuples.join(", ")
    ))
}

pub(crate) fn delete_sql(options: &DeleteOptions) -> Result<String, DatabaseError> {
    let table = required_table(&options.table, "DELETE")?;

    // No condition means every row goes. Deliberate; see DeleteQuery docs.
    let mut sql = format!("DELETE FROM {table}");
    if let Some(condition) = &options.condition {
        sql.push_str(" WHERE ");
        sql.push_str(condition);
    }
    if let Some(order_by) = &options.order_by {
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok(sql)
}

pub(crate) fn native_sql(options: &NativeOptions, engine: EngineType) -> Result<String, DatabaseError> {
    options
        .queries
        .get(engine.name())
        .cloned()
        .ok_or_else(|| {
            DatabaseError::InvalidQuery(format!(
                "no native query specified for engine {}",
                engine.name()
            ))
        })
}

/// Validates that every row shares the first row's column set and returns
/// those columns. Mismatches are reported for every offending row at once,
/// by 1-based position.
fn insert_columns(rows: &[Row]) -> Result<Vec<&str>, DatabaseError> {
    if rows.is_empty() {
        return Err(DatabaseError::InvalidQuery(
            "there must be at least one row specified to insert or replace".to_string(),
        ));
    }

    let columns: Vec<&str> = rows[0].iter().map(|(column, _)| column.as_str()).collect();

    let mismatched: Vec<usize> = rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| {
            row.len() != columns.len()
                || row.iter().zip(&columns).any(|((column, _), expected)| column != expected)
        })
        .map(|(index, _)| index + 1)
        .collect();

    if !mismatched.is_empty() {
        return Err(DatabaseError::InvalidQuery(format!(
            "row keys do not match, found at row values {}",
            position_list(&mismatched)
        )));
    }

    Ok(columns)
}

/// Renders positions as "2", "2 and 3" or "2, 3 and 5".
fn position_list(positions: &[usize]) -> String {
    match positions {
        [only] => only.to_string(),
        [head @ .., last] => format!(
            "{} and {}",
            head.iter().map(usize::to_string).collect::<Vec<_>>().join(", "),
            last
        ),
        [] => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn position_list_formats() {
        assert_eq!(position_list(&[2]), "2");
        assert_eq!(position_list(&[2, 3]), "2 and 3");
        assert_eq!(position_list(&[2, 3, 5]), "2, 3 and 5");
    }

    #[test]
    fn insert_columns_takes_first_row() {
        let rows = vec![row(&[("a", "1"), ("b", "2")]), row(&[("a", "3"), ("b", "4")])];
        assert_eq!(insert_columns(&rows).unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn insert_columns_rejects_empty_row_list() {
        assert!(matches!(
            insert_columns(&[]),
            Err(DatabaseError::InvalidQuery(_))
        ));
    }

    #[test]
    fn insert_columns_enumerates_every_mismatch() {
        let rows = vec![
            row(&[("a", "1")]),
            row(&[("b", "2")]),
            row(&[("a", "3")]),
            row(&[("c", "4")]),
        ];
        match insert_columns(&rows) {
            Err(DatabaseError::InvalidQuery(message)) => {
                assert_eq!(message, "row keys do not match, found at row values 2 and 4");
            }
            other => panic!("expected InvalidQuery, got {:?}", other),
        }
    }

    #[test]
    fn insert_columns_requires_matching_order() {
        // Same columns, different order, is still a mismatch.
        let rows = vec![row(&[("a", "1"), ("b", "2")]), row(&[("b", "3"), ("a", "4")])];
        assert!(insert_columns(&rows).is_err());
    }
}
