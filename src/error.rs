// Crate-wide error type
// Every failure in this layer is terminal for the call that raised it;
// nothing here retries or falls back.

/// Common database error type
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("No driver found for engine: {0}")]
    DriverNotFound(String),

    #[error("No database engine has been configured")]
    EngineNotSpecified,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("The variable {0} was not defined")]
    UndefinedVariable(String),

    #[error("Unknown data type: {0}")]
    UnknownDataType(String),

    #[error("Expected variable {variable} to be of type {expected}, got {actual}")]
    TypeMismatch {
        variable: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Not expecting any more query executions. There are not enough results specified.")]
    NotEnoughResults,

    #[error("Query execution error: {0}")]
    QueryError(String),
}

impl DatabaseError {
    /// Shorthand used by the substitution engine when a value fails the
    /// shape check for its declared placeholder type.
    pub(crate) fn type_mismatch(variable: &str, expected: &str, actual: &str) -> Self {
        DatabaseError::TypeMismatch {
            variable: variable.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}
