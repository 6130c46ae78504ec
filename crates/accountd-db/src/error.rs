//! Store error types

use thiserror::Error;

/// Errors raised by the account and identity stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Inconsistent data: {0}")]
    Inconsistent(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
