//! Error types for tk-sql

use thiserror::Error;

/// SQL handling errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL could not be tokenized (S001)
    #[error("[S001] SQL tokenize error: {message}")]
    TokenizeError { message: String },
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
