//! Error types for the HTTP client

use slotbook_booking::FlowError;
use slotbook_common::StoreError;
use thiserror::Error;

/// Errors that can occur when talking to the slotbook API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an unexpected status
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The admin credentials were refused
    #[error("Admin credentials were rejected")]
    Unauthorized,

    /// The slot's unique constraint rejected the insert
    #[error("Slot {0} is already booked")]
    Conflict(String),

    /// A response or event body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Admin operation attempted without credentials
    #[error("No admin credentials configured")]
    MissingCredentials,

    /// Reading the terminal or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The page controller refused an action
    #[error("{0}")]
    Flow(#[from] FlowError),

    /// Standard input was closed while a value was expected
    #[error("Input closed")]
    InputClosed,

    /// Local configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Conflict(slot) => StoreError::SlotTaken(slot),
            ClientError::Unauthorized | ClientError::MissingCredentials => StoreError::Unauthorized,
            other => StoreError::Backend(other.to_string()),
        }
    }
}
