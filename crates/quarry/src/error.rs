//! Error types for quarry

use std::time::Duration;
use thiserror::Error;

/// Result type alias for quarry operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Error types for query construction, compilation and execution
#[derive(Debug, Error)]
pub enum QueryError {
    /// A required clause is missing or an expression received an invalid argument shape.
    ///
    /// Always reported before any SQL text is produced.
    #[error("Malformed query: {0}")]
    MalformedQuery(String),

    /// The statement uses a feature the target dialect cannot express.
    #[error("Unsupported operation for {dialect}: {message}")]
    UnsupportedOperation {
        dialect: &'static str,
        message: String,
    },

    /// Whatever the session collaborator reported, passed through untouched.
    #[error("Execution error: {0}")]
    Execution(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Statement timeout reported by a session
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),
}

impl QueryError {
    /// Create a malformed query error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery(message.into())
    }

    /// Create an unsupported operation error for a dialect
    pub fn unsupported(dialect: &'static str, message: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            dialect,
            message: message.into(),
        }
    }

    /// Wrap an error reported by the session collaborator
    pub fn execution(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Execution(err.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a malformed query error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedQuery(_))
    }

    /// Check if this is an unsupported operation error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

#[cfg(feature = "postgres")]
impl From<tokio_postgres::Error> for QueryError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::Execution(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = QueryError::malformed("update requires at least one SET entry");
        assert_eq!(
            err.to_string(),
            "Malformed query: update requires at least one SET entry"
        );

        let err = QueryError::unsupported("mysql", "RETURNING is not supported");
        assert_eq!(
            err.to_string(),
            "Unsupported operation for mysql: RETURNING is not supported"
        );
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_execution_keeps_source() {
        let io = std::io::Error::other("socket closed");
        let err = QueryError::execution(io);
        assert_eq!(err.to_string(), "Execution error: socket closed");
        assert!(std::error::Error::source(&err).is_some());
    }
}
