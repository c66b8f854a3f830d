use crate::error::DatabaseError;
use crate::options::{
    DeleteOptions, InsertOptions, JoinClause, QueryOptions, Row, SelectOptions, UpdateOptions,
    Value, Variables,
};
use crate::result::QueryResult;

/// Statement kinds a generic query can be created as. Native statements
/// have their own builder; they are not name-creatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QueryKind {
    Select,
    Insert,
    Replace,
    Update,
    Delete,
}

impl QueryKind {
    fn from_name(name: &str) -> Result<Self, DatabaseError> {
        match name.to_lowercase().as_str() {
            "select" => Ok(QueryKind::Select),
            "insert" => Ok(QueryKind::Insert),
            "replace" => Ok(QueryKind::Replace),
            "update" => Ok(QueryKind::Update),
            "delete" => Ok(QueryKind::Delete),
            other => Err(DatabaseError::InvalidQuery(format!(
                "unknown query type '{other}'"
            ))),
        }
    }
}

/// A builder whose statement kind is chosen by name at construction.
///
/// Exposes the union of the typed builders' setters; `options` assembles
/// only the fields the constructed kind understands and ignores the
/// rest. The kind itself is fixed for the builder's lifetime.
#[derive(Debug, Clone)]
pub struct GenericQuery {
    kind: QueryKind,
    variables: Variables,
    distinct: bool,
    expr: Option<String>,
    table: Option<String>,
    alias: Option<String>,
    joins: Vec<JoinClause>,
    condition: Option<String>,
    group_by: Option<String>,
    having: Option<String>,
    order_by: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    ignore: bool,
    rows: Vec<Row>,
    keys: Vec<String>,
    set: Vec<(String, Option<String>)>,
}

impl GenericQuery {
    pub fn new(type_name: &str) -> Result<Self, DatabaseError> {
        Ok(Self {
            kind: QueryKind::from_name(type_name)?,
            variables: Variables::new(),
            distinct: false,
            expr: None,
            table: None,
            alias: None,
            joins: Vec::new(),
            condition: None,
            group_by: None,
            having: None,
            order_by: None,
            limit: None,
            offset: None,
            ignore: false,
            rows: Vec::new(),
            keys: Vec::new(),
            set: Vec::new(),
        })
    }

    /// The kind this builder was created as, as the SQL keyword.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            QueryKind::Select => "SELECT",
            QueryKind::Insert => "INSERT",
            QueryKind::Replace => "REPLACE",
            QueryKind::Update => "UPDATE",
            QueryKind::Delete => "DELETE",
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn expr(mut self, expr: impl Into<String>) -> Self {
        self.expr = Some(expr.into());
        self
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn join(
        mut self,
        join_type: impl Into<String>,
        table: impl Into<String>,
        alias: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        self.joins.push(JoinClause {
            join_type: join_type.into(),
            table: table.into(),
            alias: alias.into(),
            condition: condition.into(),
        });
        self
    }

    pub fn where_clause(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn group_by(mut self, group_by: impl Into<String>) -> Self {
        self.group_by = Some(group_by.into());
        self
    }

    pub fn having(mut self, having: impl Into<String>) -> Self {
        self.having = Some(having.into());
        self
    }

    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    pub fn limit(mut self, limit: impl Into<Option<u64>>) -> Self {
        self.limit = limit.into();
        self
    }

    pub fn offset(mut self, offset: impl Into<Option<u64>>) -> Self {
        self.offset = offset.into();
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }

    pub fn values<C, V>(mut self, row: impl IntoIterator<Item = (C, V)>) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        let row: Row = row
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        self.rows.push(row);
        self
    }

    pub fn keys<K: Into<String>>(mut self, keys: impl IntoIterator<Item = K>) -> Self {
        self.keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.set.push((column.into(), Some(value.into())));
        self
    }

    pub fn set_null(mut self, column: impl Into<String>) -> Self {
        self.set.push((column.into(), None));
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn options(&self) -> QueryOptions {
        match self.kind {
            QueryKind::Select => QueryOptions::Select(SelectOptions {
                variables: self.variables.clone(),
                distinct: self.distinct,
                expr: self.expr.clone(),
                table: self.table.clone(),
                alias: self.alias.clone(),
                joins: self.joins.clone(),
                condition: self.condition.clone(),
                group_by: self.group_by.clone(),
                having: self.having.clone(),
                order_by: self.order_by.clone(),
                limit: self.limit,
                offset: self.offset,
            }),
            QueryKind::Insert | QueryKind::Replace => {
                let options = InsertOptions {
                    variables: self.variables.clone(),
                    table: self.table.clone(),
                    ignore: self.ignore,
                    rows: self.rows.clone(),
                    keys: self.keys.clone(),
                };
                if self.kind == QueryKind::Replace {
                    QueryOptions::Replace(options)
                } else {
                    QueryOptions::Insert(options)
                }
            }
            QueryKind::Update => QueryOptions::Update(UpdateOptions {
                variables: self.variables.clone(),
                table: self.table.clone(),
                ignore: self.ignore,
                set: self.set.clone(),
                condition: self.condition.clone(),
                order_by: self.order_by.clone(),
                limit: self.limit,
            }),
            QueryKind::Delete => QueryOptions::Delete(DeleteOptions {
                variables: self.variables.clone(),
                table: self.table.clone(),
                condition: self.condition.clone(),
                order_by: self.order_by.clone(),
                limit: self.limit,
            }),
        }
    }

    pub async fn execute(&self) -> Result<QueryResult, DatabaseError> {
        super::run(self.options()).await
    }
}
