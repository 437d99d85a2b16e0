// --- File: crates/slotbook_booking/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
pub mod doc;
pub mod export;
pub mod feed;
pub mod flow;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
#[cfg(test)]
mod logic_test;
pub mod routes;
pub mod service;

pub use auth::{AdminAction, AdminCredentials, AdminGate};
pub use export::{build_export, ExportError, ExportFile};
pub use feed::ChangeFeed;
pub use flow::{AdminOutcome, FlowError, PageController, SelectOutcome, Step};
pub use logic::{BookingForm, Slot, SlotCatalog};
pub use routes::{build_store, router, routes};
pub use service::{reserve, LiveBookingStore, ReservationError, ReservationOutcome};
