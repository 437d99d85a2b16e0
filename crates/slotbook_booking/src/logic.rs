// --- File: crates/slotbook_booking/src/logic.rs ---
use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use slotbook_common::error::FieldError;
use slotbook_common::models::{Booking, NewBooking};
use slotbook_config::CampaignConfig;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

// --- User-facing messages ---
pub const MSG_BOOKED: &str = "Booking confirmed!";
pub const MSG_SLOT_TAKEN: &str = "This time slot has already been booked by someone else!";
pub const MSG_BOOKING_FAILED: &str = "Could not complete the booking. Please try again.";
pub const MSG_LOAD_FAILED: &str = "Could not load bookings";
pub const MSG_NOTHING_TO_EXPORT: &str = "There are no bookings to export";
pub const MSG_EXPORTED: &str = "Excel file exported successfully!";
pub const MSG_CLEARED: &str = "Bookings cleared.";
pub const MSG_CLEAR_FAILED: &str = "Failed to clear bookings.";
pub const MSG_INVALID_CREDENTIALS: &str = "Invalid username or password.";

const SLOT_FORMAT: &str = "%H:%M";

// --- Errors ---
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
    #[error("Slot step must be at least one minute")]
    ZeroStep,
    #[error("Closing time {closes_at} must be after opening time {opens_at}")]
    EmptyDay { opens_at: String, closes_at: String },
}

// --- Slot ---

/// One bookable time of the campaign day, minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slot(NaiveTime);

impl Slot {
    /// Parses `HH:MM` or `HH:MM:SS`; seconds are dropped.
    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let trimmed = input.trim();
        NaiveTime::parse_from_str(trimmed, SLOT_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .ok()
            .and_then(|time| time.with_second(0))
            .and_then(|time| time.with_nanosecond(0))
            .map(Slot)
            .ok_or_else(|| CatalogError::InvalidTime(input.to_string()))
    }

    pub fn from_time(time: NaiveTime) -> Self {
        Slot(
            time.with_second(0)
                .and_then(|t| t.with_nanosecond(0))
                .unwrap_or(time),
        )
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }

    /// `HH:MM`
    pub fn label(&self) -> String {
        self.0.format(SLOT_FORMAT).to_string()
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SLOT_FORMAT))
    }
}

impl FromStr for Slot {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::parse(s)
    }
}

impl TryFrom<String> for Slot {
    type Error = CatalogError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Slot::parse(&value)
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.label()
    }
}

// --- Slot catalog ---

/// Builds the fixed slot list of the day.
///
/// Slots start at `opens_at` and advance by `step_minutes` while strictly before
/// `closes_at`. With `include_closing_slot`, `closes_at` is appended once.
pub fn generate_time_slots(
    opens_at: NaiveTime,
    closes_at: NaiveTime,
    step_minutes: u32,
    include_closing_slot: bool,
) -> Result<Vec<Slot>, CatalogError> {
    if step_minutes == 0 {
        return Err(CatalogError::ZeroStep);
    }
    if closes_at <= opens_at {
        return Err(CatalogError::EmptyDay {
            opens_at: opens_at.format(SLOT_FORMAT).to_string(),
            closes_at: closes_at.format(SLOT_FORMAT).to_string(),
        });
    }

    let step = Duration::minutes(i64::from(step_minutes));
    let mut slots = Vec::new();
    let mut current = opens_at;
    while current < closes_at {
        slots.push(Slot::from_time(current));
        let (next, wrapped_secs) = current.overflowing_add_signed(step);
        if wrapped_secs != 0 {
            break;
        }
        current = next;
    }

    let closing = Slot::from_time(closes_at);
    if include_closing_slot && slots.last() != Some(&closing) {
        slots.push(closing);
    }
    Ok(slots)
}

/// The bookable slots of the campaign day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
}

impl SlotCatalog {
    /// Builds the catalog from the `[campaign]` section.
    pub fn from_config(campaign: &CampaignConfig) -> Result<Self, CatalogError> {
        let opens_at = Slot::parse(&campaign.opens_at)?.time();
        let closes_at = Slot::parse(&campaign.closes_at)?.time();
        let slots = generate_time_slots(
            opens_at,
            closes_at,
            campaign.slot_minutes,
            campaign.include_closing_slot,
        )?;
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn contains(&self, slot: &Slot) -> bool {
        self.slots.binary_search(slot).is_ok()
    }

    /// Parses `input` and checks it is one of the catalog's slots.
    pub fn resolve(&self, input: &str) -> Option<Slot> {
        Slot::parse(input).ok().filter(|slot| self.contains(slot))
    }
}

/// Slots held by the given bookings. Rows whose slot cannot be parsed are skipped.
pub fn booked_slots(bookings: &[Booking]) -> BTreeSet<Slot> {
    bookings
        .iter()
        .filter_map(|booking| match Slot::parse(booking.slot_label()) {
            Ok(slot) => Some(slot),
            Err(_) => {
                warn!(id = %booking.id, slot = %booking.slot, "Ignoring booking with unparsable slot");
                None
            }
        })
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotView {
    #[cfg_attr(feature = "openapi", schema(example = "10:04"))]
    pub slot: String,
    pub booked: bool,
}

/// Every catalog slot with its booked flag, in catalog order.
pub fn slot_views(catalog: &SlotCatalog, booked: &BTreeSet<Slot>) -> Vec<SlotView> {
    catalog
        .slots()
        .iter()
        .map(|slot| SlotView {
            slot: slot.label(),
            booked: booked.contains(slot),
        })
        .collect()
}

/// Number of catalog slots nobody holds.
pub fn available_count(catalog: &SlotCatalog, booked: &BTreeSet<Slot>) -> usize {
    catalog
        .slots()
        .iter()
        .filter(|slot| !booked.contains(slot))
        .count()
}

// --- Form input ---

pub const FIELD_NAME: &str = "name";
pub const FIELD_BIRTH_DATE: &str = "birth_date";
pub const FIELD_REGISTRATION: &str = "registration";
pub const FIELD_PHONE: &str = "phone";

/// Identity fields as typed by the requester.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct BookingForm {
    #[cfg_attr(feature = "openapi", schema(example = "Maria da Silva"))]
    pub name: String,
    /// DD/MM/YYYY
    #[cfg_attr(feature = "openapi", schema(example = "01/02/1990"))]
    pub birth_date: String,
    #[cfg_attr(feature = "openapi", schema(example = "5123"))]
    pub registration: String,
    /// Digits only, 10 to 15 of them
    #[cfg_attr(feature = "openapi", schema(example = "62999998888"))]
    pub phone: String,
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedForm {
    pub name: String,
    pub birth_date: NaiveDate,
    pub registration: String,
    pub phone: String,
}

impl ValidatedForm {
    /// The row to insert for `slot`; the birth date is stored as ISO `YYYY-MM-DD`.
    pub fn to_new_booking(&self, slot: &Slot) -> NewBooking {
        NewBooking {
            name: self.name.clone(),
            birth_date: self.birth_date.format("%Y-%m-%d").to_string(),
            registration: self.registration.clone(),
            phone: self.phone.clone(),
            slot: slot.label(),
        }
    }
}

/// Checks every field and reports the first problem of each failing field.
pub fn validate_form(form: &BookingForm) -> Result<ValidatedForm, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = form.name.trim();
    let name_len = name.chars().count();
    if name_len < 3 {
        errors.push(FieldError::new(FIELD_NAME, "Name must have at least 3 characters"));
    } else if name_len > 100 {
        errors.push(FieldError::new(FIELD_NAME, "Name must have at most 100 characters"));
    }

    let birth_date = match parse_birth_date(&form.birth_date) {
        Ok(date) => Some(date),
        Err(message) => {
            errors.push(FieldError::new(FIELD_BIRTH_DATE, message));
            None
        }
    };

    let registration = form.registration.trim();
    let registration_len = registration.chars().count();
    if registration_len == 0 {
        errors.push(FieldError::new(FIELD_REGISTRATION, "Registration number is required"));
    } else if registration_len > 50 {
        errors.push(FieldError::new(
            FIELD_REGISTRATION,
            "Registration number must have at most 50 characters",
        ));
    }

    let phone = form.phone.as_str();
    let phone_len = phone.chars().count();
    if phone_len < 10 {
        errors.push(FieldError::new(FIELD_PHONE, "Phone must have at least 10 digits"));
    } else if phone_len > 15 {
        errors.push(FieldError::new(FIELD_PHONE, "Phone must have at most 15 digits"));
    } else if !phone.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(FIELD_PHONE, "Phone must contain only digits"));
    }

    match birth_date {
        Some(birth_date) if errors.is_empty() => Ok(ValidatedForm {
            name: name.to_string(),
            birth_date,
            registration: registration.to_string(),
            phone: phone.to_string(),
        }),
        _ => Err(errors),
    }
}

fn parse_birth_date(input: &str) -> Result<NaiveDate, &'static str> {
    if input.chars().count() < 10 {
        return Err("Birth date is required");
    }
    let bytes = input.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'/',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err("Birth date must be in DD/MM/YYYY format");
    }
    NaiveDate::parse_from_str(input, "%d/%m/%Y").map_err(|_| "Birth date is not a valid date")
}

/// Input mask for the birth date field.
///
/// Keeps digits only, puts a `/` after the day once two digits are present and
/// after the month once the text reaches five characters, and keeps at most four
/// year digits.
pub fn mask_birth_date(input: &str) -> String {
    let mut value: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if value.len() >= 2 {
        value = format!("{}/{}", &value[..2], &value[2..]);
    }
    if value.len() >= 5 {
        let year_end = value.len().min(9);
        value = format!("{}/{}", &value[..5], &value[5..year_end]);
    }
    value
}

/// ISO `YYYY-MM-DD` as `DD/MM/YYYY`; anything else is returned unchanged.
pub fn format_birth_date(iso: &str) -> String {
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .map(|date| date.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|_| iso.to_string())
}

// --- Request / response bodies ---

#[derive(Deserialize, Serialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReserveRequest {
    #[serde(flatten)]
    pub form: BookingForm,
    #[cfg_attr(feature = "openapi", schema(example = "10:04"))]
    pub slot: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReserveResponse {
    pub success: bool,
    pub booking: Option<Booking>,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotsResponse {
    pub slots: Vec<SlotView>,
    pub available: usize,
    pub total: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ClearResponse {
    pub removed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CampaignInfo {
    #[cfg_attr(feature = "openapi", schema(example = "Blood Donation Campaign"))]
    pub title: String,
    #[cfg_attr(feature = "openapi", schema(example = "2025-11-13"))]
    pub event_date: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:00"))]
    pub opens_at: String,
    #[cfg_attr(feature = "openapi", schema(example = "16:00"))]
    pub closes_at: String,
    pub slot_minutes: u32,
    pub total_slots: usize,
}

impl CampaignInfo {
    pub fn new(campaign: &CampaignConfig, catalog: &SlotCatalog) -> Self {
        Self {
            title: campaign.title.clone(),
            event_date: campaign.event_date.clone(),
            opens_at: campaign.opens_at.clone(),
            closes_at: campaign.closes_at.clone(),
            slot_minutes: campaign.slot_minutes,
            total_slots: catalog.len(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub bookings: u64,
}
