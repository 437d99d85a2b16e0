//! Client side of slotbook
//!
//! [`RemoteBookingStore`] implements the shared store trait over the HTTP API and
//! its Server-Sent Events change feed. The `slotbook` binary drives the page
//! controller through it from a terminal.

pub mod app;
pub mod cli;
pub mod error;
pub mod remote;
pub mod render;
pub mod sse;

pub use error::ClientError;
pub use remote::RemoteBookingStore;
