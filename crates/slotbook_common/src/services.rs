// --- File: crates/slotbook_common/src/services.rs ---
//! Store abstraction.
//!
//! The page controller only talks to a [`BookingStore`]. On the server it is backed
//! by the SQL repository plus the change feed; on a client it is backed by the HTTP
//! API. Slot uniqueness is never decided here: implementations forward the single
//! insert attempt and report what the database said.

use futures::Stream;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use crate::models::{Booking, BookingChange, NewBooking};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Stream of change events delivered by [`BookingStore::subscribe`].
pub type ChangeStream = Pin<Box<dyn Stream<Item = BookingChange> + Send>>;

/// Errors a store reports to its callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The slot's uniqueness constraint rejected the insert.
    #[error("slot {0} is already booked")]
    SlotTaken(String),

    /// The store refused an admin operation.
    #[error("admin credentials were rejected")]
    Unauthorized,

    /// Anything else: connectivity, unexpected responses, SQL errors.
    #[error("store error: {0}")]
    Backend(String),
}

/// Query / insert / delete-all / subscribe over the bookings table.
pub trait BookingStore: Send + Sync {
    /// All bookings ordered by slot ascending.
    fn list_bookings(&self) -> BoxFuture<'_, Vec<Booking>, StoreError>;

    /// Single insert attempt. A duplicate slot yields [`StoreError::SlotTaken`].
    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<'_, Booking, StoreError>;

    /// Number of bookings, without loading the rows.
    fn count_bookings(&self) -> BoxFuture<'_, u64, StoreError>;

    /// Removes every booking and returns how many were removed.
    fn delete_all(&self) -> BoxFuture<'_, u64, StoreError>;

    /// Push feed of changes made by any client.
    fn subscribe(&self) -> BoxFuture<'_, ChangeStream, StoreError>;
}
