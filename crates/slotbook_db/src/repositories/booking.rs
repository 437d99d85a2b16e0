//! Repository for bookings
//!
//! The `slot` column carries a UNIQUE constraint. It is the only thing that decides
//! which of several concurrent requests gets a slot.

use crate::error::DbError;

// Re-export the booking models from slotbook_common for convenience
pub use slotbook_common::models::{Booking, NewBooking};

/// Storage operations for bookings.
pub trait BookingRepository {
    /// Create the bookings table if it does not exist yet.
    fn init_schema(&self) -> impl std::future::Future<Output = Result<(), DbError>> + Send;

    /// Insert one booking with a single attempt.
    ///
    /// Returns [`DbError::UniqueViolation`] when the slot is already taken.
    fn create(
        &self,
        booking: NewBooking,
    ) -> impl std::future::Future<Output = Result<Booking, DbError>> + Send;

    /// All bookings ordered by slot ascending.
    fn find_all(&self) -> impl std::future::Future<Output = Result<Vec<Booking>, DbError>> + Send;

    /// Number of stored bookings.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;

    /// Remove every booking; returns the number of rows removed.
    fn delete_all(&self) -> impl std::future::Future<Output = Result<u64, DbError>> + Send;
}
