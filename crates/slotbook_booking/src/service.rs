// --- File: crates/slotbook_booking/src/service.rs ---
//! Reservation protocol and the server-side [`BookingStore`].
//!
//! A reservation is one insert attempt. Whoever's insert the unique constraint
//! accepts holds the slot; everyone else gets a conflict. There is no check-then-act
//! step and no retry.

use crate::feed::ChangeFeed;
use crate::logic::{
    validate_form, BookingForm, Slot, SlotCatalog, ValidatedForm, MSG_BOOKED, MSG_BOOKING_FAILED,
    MSG_SLOT_TAKEN,
};
use slotbook_common::error::{FieldError, SlotbookError};
use slotbook_common::models::{Booking, BookingChange, NewBooking};
use slotbook_common::services::{BookingStore, BoxFuture, ChangeStream, StoreError};
use slotbook_db::BookingRepository;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// [`BookingStore`] over the SQL repository that publishes every change to the feed.
pub struct LiveBookingStore<R> {
    repository: R,
    feed: ChangeFeed,
}

impl<R> LiveBookingStore<R>
where
    R: BookingRepository + Send + Sync,
{
    pub fn new(repository: R, feed: ChangeFeed) -> Self {
        Self { repository, feed }
    }

    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }
}

impl<R> BookingStore for LiveBookingStore<R>
where
    R: BookingRepository + Send + Sync,
{
    fn list_bookings(&self) -> BoxFuture<'_, Vec<Booking>, StoreError> {
        Box::pin(async move { self.repository.find_all().await.map_err(StoreError::from) })
    }

    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<'_, Booking, StoreError> {
        Box::pin(async move {
            let stored = self.repository.create(booking).await?;
            self.feed.publish(BookingChange::Inserted {
                booking: stored.clone(),
            });
            Ok::<_, StoreError>(stored)
        })
    }

    fn count_bookings(&self) -> BoxFuture<'_, u64, StoreError> {
        Box::pin(async move { self.repository.count().await.map_err(StoreError::from) })
    }

    fn delete_all(&self) -> BoxFuture<'_, u64, StoreError> {
        Box::pin(async move {
            let removed = self.repository.delete_all().await?;
            self.feed.publish(BookingChange::Cleared { removed });
            Ok::<_, StoreError>(removed)
        })
    }

    fn subscribe(&self) -> BoxFuture<'_, ChangeStream, StoreError> {
        Box::pin(async move { Ok::<_, StoreError>(self.feed.stream()) })
    }
}

/// What a reservation attempt came to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    /// The insert was accepted; the slot is ours.
    Booked(Booking),
    /// Someone else's insert for this slot was accepted first.
    Conflict { slot: String },
}

impl ReservationOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ReservationOutcome::Booked(_) => MSG_BOOKED,
            ReservationOutcome::Conflict { .. } => MSG_SLOT_TAKEN,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    #[error("Invalid booking form")]
    Invalid(Vec<FieldError>),
    #[error("Unknown slot {0:?}")]
    UnknownSlot(String),
    #[error("Could not complete the booking: {0}")]
    Store(StoreError),
}

impl From<ReservationError> for SlotbookError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::Invalid(fields) => SlotbookError::InvalidFields(fields),
            ReservationError::UnknownSlot(slot) => {
                SlotbookError::ValidationError(format!("Unknown slot {:?}", slot))
            }
            ReservationError::Store(StoreError::Unauthorized) => {
                SlotbookError::AuthError("admin credentials were rejected".to_string())
            }
            ReservationError::Store(_) => {
                SlotbookError::InternalError(MSG_BOOKING_FAILED.to_string())
            }
        }
    }
}

/// Validates the form, checks the slot is in the catalog and makes the single insert attempt.
pub async fn reserve(
    store: &dyn BookingStore,
    catalog: &SlotCatalog,
    form: &BookingForm,
    slot: &str,
) -> Result<ReservationOutcome, ReservationError> {
    let validated = validate_form(form).map_err(ReservationError::Invalid)?;
    let slot = catalog
        .resolve(slot)
        .ok_or_else(|| ReservationError::UnknownSlot(slot.to_string()))?;
    reserve_validated(store, &validated, &slot).await
}

/// The insert attempt itself, for a form and slot already checked.
#[instrument(skip(store, form, slot), fields(slot = %slot))]
pub async fn reserve_validated(
    store: &dyn BookingStore,
    form: &ValidatedForm,
    slot: &Slot,
) -> Result<ReservationOutcome, ReservationError> {
    match store.insert_booking(form.to_new_booking(slot)).await {
        Ok(booking) => {
            info!(id = %booking.id, "Slot booked");
            Ok(ReservationOutcome::Booked(booking))
        }
        Err(StoreError::SlotTaken(_)) => {
            warn!("Slot already taken");
            Ok(ReservationOutcome::Conflict { slot: slot.label() })
        }
        Err(err) => {
            error!(error = %err, "Booking insert failed");
            Err(ReservationError::Store(err))
        }
    }
}
