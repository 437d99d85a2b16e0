// --- File: crates/slotbook_common/src/error.rs ---
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::services::StoreError;

/// A single form field that failed validation.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Error returned by the HTTP layer.
///
/// Crates convert their own errors into this one at the handler boundary.
#[derive(Error, Debug)]
pub enum SlotbookError {
    /// Startup settings are unusable (catalog, time zone, bind address)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Admin credentials missing or wrong
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// The request itself is malformed, e.g. a slot outside the catalog
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// One or more form fields are invalid
    #[error("Validation error: {}", join_fields(.0))]
    InvalidFields(Vec<FieldError>),

    /// The store could not be read or written
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// The slot is held by another booking
    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Maps an error kind to the HTTP status it is answered with.
pub trait HttpStatusCode {
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for SlotbookError {
    fn status_code(&self) -> u16 {
        match self {
            SlotbookError::ConfigError(_) | SlotbookError::InternalError(_) => 500,
            SlotbookError::DatabaseError(_) => 500,
            SlotbookError::AuthError(_) => 401,
            SlotbookError::ValidationError(_) | SlotbookError::InvalidFields(_) => 400,
            SlotbookError::ConflictError(_) => 409,
            SlotbookError::NotFoundError(_) => 404,
        }
    }
}

impl From<StoreError> for SlotbookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotTaken(slot) => {
                SlotbookError::ConflictError(format!("slot {} is already booked", slot))
            }
            StoreError::Unauthorized => {
                SlotbookError::AuthError("invalid admin credentials".to_string())
            }
            StoreError::Backend(message) => SlotbookError::DatabaseError(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(SlotbookError::ConflictError("taken".into()).status_code(), 409);
        assert_eq!(SlotbookError::NotFoundError("nothing".into()).status_code(), 404);
        assert_eq!(SlotbookError::AuthError("nope".into()).status_code(), 401);
        assert_eq!(
            SlotbookError::InvalidFields(vec![FieldError::new("phone", "bad")]).status_code(),
            400
        );
    }

    #[test]
    fn slot_taken_becomes_conflict() {
        let err: SlotbookError = StoreError::SlotTaken("10:04".to_string()).into();
        assert!(matches!(err, SlotbookError::ConflictError(_)));
        assert!(err.to_string().contains("10:04"));
    }

    #[test]
    fn backend_failure_is_a_database_error() {
        let err: SlotbookError = StoreError::Backend("disk gone".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "Database error: disk gone");
    }

    #[test]
    fn invalid_fields_message_lists_every_field() {
        let err = SlotbookError::InvalidFields(vec![
            FieldError::new("name", "too short"),
            FieldError::new("phone", "digits only"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: name: too short; phone: digits only"
        );
    }
}
