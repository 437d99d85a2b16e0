// --- File: crates/slotbook_booking/src/flow.rs ---
//! Page controller: the two-step booking flow plus the admin dialog.
//!
//! Holds what a booking page shows (current step, entered form, last known
//! booking list, pending admin action) and drives a [`BookingStore`]. Front ends
//! render its state and forward user input to it.

use chrono::Utc;
use chrono_tz::Tz;
use slotbook_common::error::FieldError;
use slotbook_common::models::{Booking, BookingChange};
use slotbook_common::services::{BookingStore, StoreError};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::auth::{AdminAction, AdminCredentials, AdminGate};
use crate::export::{build_export, ExportError, ExportFile};
use crate::logic::{
    available_count, booked_slots, slot_views, validate_form, BookingForm, Slot, SlotCatalog,
    SlotView, ValidatedForm, MSG_BOOKING_FAILED, MSG_CLEAR_FAILED, MSG_INVALID_CREDENTIALS,
    MSG_LOAD_FAILED, MSG_SLOT_TAKEN,
};
use crate::service::{reserve_validated, ReservationError, ReservationOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Form,
    Time,
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("{}", MSG_LOAD_FAILED)]
    Load(StoreError),
    #[error("Fill in the form before choosing a time")]
    NoForm,
    #[error("Unknown slot {0:?}")]
    UnknownSlot(String),
    #[error("Slot {0} is not available")]
    SlotUnavailable(String),
    #[error("{}", MSG_BOOKING_FAILED)]
    Booking(StoreError),
    #[error("No admin action is waiting for credentials")]
    NoPendingAction,
    #[error("{}", MSG_INVALID_CREDENTIALS)]
    InvalidCredentials,
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("{}", MSG_CLEAR_FAILED)]
    Clear(StoreError),
}

/// Result of choosing a slot that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Booked(Booking),
    Conflict { slot: String },
}

impl SelectOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SelectOutcome::Booked(_) => crate::logic::MSG_BOOKED,
            SelectOutcome::Conflict { .. } => MSG_SLOT_TAKEN,
        }
    }
}

/// Result of an authenticated admin action.
#[derive(Debug, Clone)]
pub enum AdminOutcome {
    Exported(ExportFile),
    Cleared { removed: u64 },
}

pub struct PageController {
    store: Arc<dyn BookingStore>,
    catalog: SlotCatalog,
    gate: AdminGate,
    time_zone: Tz,
    step: Step,
    draft: BookingForm,
    form: Option<ValidatedForm>,
    bookings: Vec<Booking>,
    booked: BTreeSet<Slot>,
    loading: bool,
    submitting: bool,
    pending_admin: Option<AdminAction>,
    dialog_error: Option<String>,
}

impl PageController {
    pub fn new(
        store: Arc<dyn BookingStore>,
        catalog: SlotCatalog,
        gate: AdminGate,
        time_zone: Tz,
    ) -> Self {
        Self {
            store,
            catalog,
            gate,
            time_zone,
            step: Step::Form,
            draft: BookingForm::default(),
            form: None,
            bookings: Vec::new(),
            booked: BTreeSet::new(),
            loading: true,
            submitting: false,
            pending_admin: None,
            dialog_error: None,
        }
    }

    // --- State accessors ---

    pub fn step(&self) -> Step {
        self.step
    }

    /// Values last entered in the form, valid or not.
    pub fn draft(&self) -> &BookingForm {
        &self.draft
    }

    pub fn form(&self) -> Option<&ValidatedForm> {
        self.form.as_ref()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn pending_admin(&self) -> Option<AdminAction> {
        self.pending_admin
    }

    /// Title of the open admin dialog, if any.
    pub fn dialog_title(&self) -> Option<&'static str> {
        self.pending_admin.map(|action| action.dialog_title())
    }

    /// Error shown inside the open admin dialog.
    pub fn dialog_error(&self) -> Option<&str> {
        self.dialog_error.as_deref()
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    // --- Bookings ---

    pub async fn load(&mut self) -> Result<usize, FlowError> {
        self.refresh().await
    }

    /// Refetches the booking list. On failure the last known list is kept.
    pub async fn refresh(&mut self) -> Result<usize, FlowError> {
        self.loading = true;
        let result = self.store.list_bookings().await;
        self.loading = false;
        match result {
            Ok(bookings) => {
                self.booked = booked_slots(&bookings);
                self.bookings = bookings;
                debug!(count = self.bookings.len(), "Bookings refreshed");
                Ok(self.bookings.len())
            }
            Err(err) => {
                error!(error = %err, "Failed to load bookings");
                Err(FlowError::Load(err))
            }
        }
    }

    /// Every change event means "refetch".
    pub async fn apply_change(&mut self, change: &BookingChange) -> Result<usize, FlowError> {
        debug!(?change, "Applying booking change");
        self.refresh().await
    }

    pub fn slot_views(&self) -> Vec<SlotView> {
        slot_views(&self.catalog, &self.booked)
    }

    pub fn available_count(&self) -> usize {
        available_count(&self.catalog, &self.booked)
    }

    pub fn is_booked(&self, slot: &Slot) -> bool {
        self.booked.contains(slot)
    }

    // --- Booking flow ---

    /// Validates the form; on success the values are kept and the flow moves to slot selection.
    pub fn submit_form(&mut self, form: BookingForm) -> Result<(), Vec<FieldError>> {
        let result = validate_form(&form);
        self.draft = form;
        match result {
            Ok(validated) => {
                self.form = Some(validated);
                self.step = Step::Time;
                Ok(())
            }
            Err(errors) => {
                self.form = None;
                Err(errors)
            }
        }
    }

    /// Back to the form, keeping what was entered.
    pub fn back_to_form(&mut self) {
        self.step = Step::Form;
    }

    /// Attempts to reserve `slot` for the entered form.
    ///
    /// Slots already shown as booked are rejected without contacting the store.
    /// On success the form is cleared and the flow returns to the form step; on
    /// conflict it stays on slot selection. Both refresh the list.
    pub async fn select_slot(&mut self, slot: &str) -> Result<SelectOutcome, FlowError> {
        let form = self.form.clone().ok_or(FlowError::NoForm)?;
        let slot = self
            .catalog
            .resolve(slot)
            .ok_or_else(|| FlowError::UnknownSlot(slot.to_string()))?;
        if self.is_booked(&slot) {
            return Err(FlowError::SlotUnavailable(slot.label()));
        }

        self.submitting = true;
        let result = reserve_validated(self.store.as_ref(), &form, &slot).await;
        self.submitting = false;

        let outcome = match result {
            Ok(ReservationOutcome::Booked(booking)) => {
                info!(slot = %slot, "Reservation confirmed");
                self.form = None;
                self.draft = BookingForm::default();
                self.step = Step::Form;
                SelectOutcome::Booked(booking)
            }
            Ok(ReservationOutcome::Conflict { slot }) => SelectOutcome::Conflict { slot },
            Err(ReservationError::Store(err)) => return Err(FlowError::Booking(err)),
            Err(ReservationError::UnknownSlot(slot)) => return Err(FlowError::UnknownSlot(slot)),
            Err(ReservationError::Invalid(_)) => return Err(FlowError::NoForm),
        };

        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Refresh after reservation failed");
        }
        Ok(outcome)
    }

    // --- Admin dialog ---

    /// Opens the credential dialog for `action`.
    pub fn request_admin(&mut self, action: AdminAction) {
        self.pending_admin = Some(action);
        self.dialog_error = None;
    }

    pub fn cancel_admin(&mut self) {
        self.pending_admin = None;
        self.dialog_error = None;
    }

    /// Checks the credentials and runs the pending action.
    ///
    /// Wrong credentials keep the dialog open with an error message.
    pub async fn authenticate(
        &mut self,
        credentials: &AdminCredentials,
    ) -> Result<AdminOutcome, FlowError> {
        let action = self.pending_admin.ok_or(FlowError::NoPendingAction)?;
        if !self.gate.verify(credentials) {
            warn!(?action, "Admin dialog rejected credentials");
            self.dialog_error = Some(MSG_INVALID_CREDENTIALS.to_string());
            return Err(FlowError::InvalidCredentials);
        }
        self.pending_admin = None;
        self.dialog_error = None;

        match action {
            AdminAction::Export => self.export().await.map(AdminOutcome::Exported),
            AdminAction::Clear => self
                .clear()
                .await
                .map(|removed| AdminOutcome::Cleared { removed }),
        }
    }

    async fn export(&mut self) -> Result<ExportFile, FlowError> {
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Exporting last known bookings");
        }
        let file = build_export(&self.bookings, self.time_zone, Utc::now().date_naive())?;
        info!(file = %file.file_name, rows = self.bookings.len(), "Bookings exported");
        Ok(file)
    }

    async fn clear(&mut self) -> Result<u64, FlowError> {
        let removed = self.store.delete_all().await.map_err(|err| {
            error!(error = %err, "Failed to clear bookings");
            FlowError::Clear(err)
        })?;
        info!(removed, "Bookings cleared");
        if let Err(err) = self.refresh().await {
            warn!(error = %err, "Refresh after clear failed");
        }
        Ok(removed)
    }
}
