//! Error types for sg-db

use sg_core::CoreError;
use thiserror::Error;

/// Storage operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Insert execution error (D002)
    #[error("[D002] Insert into {storage} failed: {message}")]
    InsertError { storage: String, message: String },

    /// Table not found (D003)
    #[error("[D003] Table or collection not found: {0}")]
    TableNotFound(String),

    /// Value cannot be bound by this backend (D004)
    #[error("[D004] Unsupported value for {backend}: {value}")]
    UnsupportedValue { backend: String, value: String },

    /// Row rejected the assigned identifier (D005)
    #[error("[D005] Row error: {0}")]
    Row(#[from] CoreError),

    /// Mutex poisoned (D006)
    #[error("[D006] Database mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// SQL execution error outside of inserts (D007)
    #[error("[D007] SQL execution failed: {0}")]
    ExecutionError(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // duckdb::Error does not expose structured variants, so the catalog
        // error has to be recognised from its message.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
