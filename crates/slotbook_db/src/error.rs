//! Error types for the database client

use slotbook_common::{SlotbookError, StoreError};
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// A stored row could not be turned back into a model
    #[error("Database decode error: {0}")]
    DecodeError(String),

    /// The unique constraint on the slot column rejected an insert
    #[error("Slot {0} violates the unique constraint")]
    UniqueViolation(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::UniqueViolation(slot) => StoreError::SlotTaken(slot),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<DbError> for SlotbookError {
    fn from(err: DbError) -> Self {
        StoreError::from(err).into()
    }
}
