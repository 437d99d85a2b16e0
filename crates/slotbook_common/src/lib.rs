// --- File: crates/slotbook_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Data structures shared by server and client
pub mod services; // Store abstraction

// Re-export error types and utilities for easier access
pub use error::{FieldError, HttpStatusCode, SlotbookError};

// Re-export HTTP utilities for easier access
pub use http::client::{create_client, HTTP_CLIENT};

// Re-export logging utilities for easier access
pub use logging::{init_from_config, init_with_level};

pub use models::{Booking, BookingChange, NewBooking};
pub use services::{BookingStore, BoxFuture, ChangeStream, StoreError};
