// Query Option Model
// The central value object: one variant per statement kind, accumulated by
// the builders in `query` and consumed by the per-dialect generators.
// Options carry no SQL knowledge of their own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A variable value supplied for placeholder substitution.
///
/// Values are untyped on purpose: the `{type:name}` placeholder declares the
/// expected type, and the substitution engine validates the value against it
/// at replacement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    Str(String),
    Array(Vec<Value>),
}

impl Value {
    /// Human-readable name of the value's runtime shape, used in
    /// `TypeMismatch` messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "integer",
            Value::Double(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Variable name to value map attached to every statement.
pub type Variables = HashMap<String, Value>;

/// One row of an INSERT or REPLACE: column name to SQL value fragment,
/// in insertion order. Fragments may themselves contain placeholders.
pub type Row = Vec<(String, String)>;

/// A single JOIN descriptor on a SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    /// Join type (LEFT, RIGHT, INNER, ...). Case-normalized by the
    /// generator, not here.
    pub join_type: String,
    pub table: String,
    pub alias: String,
    pub condition: String,
}

/// Options for a SELECT statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    pub variables: Variables,
    pub distinct: bool,
    /// SELECT expression; `None` renders as `*`.
    pub expr: Option<String>,
    pub table: Option<String>,
    pub alias: Option<String>,
    pub joins: Vec<JoinClause>,
    pub condition: Option<String>,
    pub group_by: Option<String>,
    pub having: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Options for an INSERT or REPLACE statement. Which of the two it is
/// lives in the `QueryOptions` variant wrapping this struct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertOptions {
    pub variables: Variables,
    pub table: Option<String>,
    /// Duplicate-key errors become no-ops (INSERT IGNORE / INSERT OR IGNORE).
    pub ignore: bool,
    /// Every row must carry the same column set, in the same order.
    pub rows: Vec<Row>,
    /// Primary/unique columns, carried for engines that have to emulate
    /// REPLACE instead of supporting it natively.
    pub keys: Vec<String>,
}

/// Options for an UPDATE statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOptions {
    pub variables: Variables,
    pub table: Option<String>,
    /// MySQL-only; dropped by dialects without UPDATE IGNORE.
    pub ignore: bool,
    /// Column to SQL value fragment; `None` renders as `NULL`.
    pub set: Vec<(String, Option<String>)>,
    pub condition: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u64>,
}

/// Options for a DELETE statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteOptions {
    pub variables: Variables,
    pub table: Option<String>,
    /// A missing condition deletes every row. Intentional; see the
    /// builder docs.
    pub condition: Option<String>,
    pub order_by: Option<String>,
    pub limit: Option<u64>,
}

/// Options for a native (raw SQL) statement, one query per engine name.
/// The active engine's generator picks its own entry and ignores the rest,
/// so one built query can carry engine-specific SQL side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeOptions {
    pub variables: Variables,
    /// Lower-cased engine name to raw SQL.
    pub queries: HashMap<String, String>,
}

/// The accumulated shape of one SQL statement, tagged by statement kind.
///
/// The kind is fixed at construction by the choice of variant; there is no
/// way to rewrite a SELECT into a DELETE after the fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum QueryOptions {
    Select(SelectOptions),
    Insert(InsertOptions),
    Replace(InsertOptions),
    Update(UpdateOptions),
    Delete(DeleteOptions),
    Native(NativeOptions),
}

impl QueryOptions {
    /// Statement kind as the SQL keyword.
    pub fn type_name(&self) -> &'static str {
        match self {
            QueryOptions::Select(_) => "SELECT",
            QueryOptions::Insert(_) => "INSERT",
            QueryOptions::Replace(_) => "REPLACE",
            QueryOptions::Update(_) => "UPDATE",
            QueryOptions::Delete(_) => "DELETE",
            QueryOptions::Native(_) => "NATIVE",
        }
    }

    /// The variables map shared by every statement kind.
    pub fn variables(&self) -> &Variables {
        match self {
            QueryOptions::Select(o) => &o.variables,
            QueryOptions::Insert(o) | QueryOptions::Replace(o) => &o.variables,
            QueryOptions::Update(o) => &o.variables,
            QueryOptions::Delete(o) => &o.variables,
            QueryOptions::Native(o) => &o.variables,
        }
    }

    /// Whether executing this statement is expected to produce a row set
    /// rather than an acknowledgement.
    pub fn returns_rows(&self) -> bool {
        matches!(self, QueryOptions::Select(_))
    }
}
