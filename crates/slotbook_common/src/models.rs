// --- File: crates/slotbook_common/src/models.rs ---

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored booking: one requester holding one slot.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// UUID assigned on insert
    pub id: String,

    /// Full name of the requester
    pub name: String,

    /// Birth date, ISO `YYYY-MM-DD`
    pub birth_date: String,

    /// Employee registration number
    pub registration: String,

    /// Phone, digits only
    pub phone: String,

    /// Reserved slot, `HH:MM`
    pub slot: String,

    /// When the row was inserted
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// The slot as shown to users. Stores that echo seconds (`HH:MM:SS`) are cut to `HH:MM`.
    pub fn slot_label(&self) -> &str {
        self.slot.get(..5).unwrap_or(&self.slot)
    }
}

/// A validated booking that has not been stored yet.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBooking {
    pub name: String,
    /// ISO `YYYY-MM-DD`
    pub birth_date: String,
    pub registration: String,
    pub phone: String,
    /// `HH:MM`
    pub slot: String,
}

/// Something changed in the bookings table.
///
/// Clients treat every variant as "refetch"; the payload is informative.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingChange {
    /// A slot was taken
    Inserted { booking: Booking },
    /// All bookings were removed
    Cleared { removed: u64 },
    /// The subscriber missed events and must refetch
    Resync,
}
