//! Database integration for slotbook
//!
//! SQLx-backed storage for bookings. The crate is database agnostic through the
//! SQLx `Any` driver; SQLite is the default backend, PostgreSQL and MySQL are
//! enabled through feature flags.
//!
//! # Example
//!
//! ```rust,no_run
//! use slotbook_db::{BookingRepository, BookingRepositoryFactory, DbClient, RepositoryFactory};
//!
//! async fn setup() -> Result<(), slotbook_db::error::DbError> {
//!     let client = DbClient::from_url("sqlite::memory:").await?;
//!     let repository = BookingRepositoryFactory::new().create_repository(client);
//!     repository.init_schema().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;
pub mod repository;

pub use client::DbClient;
pub use error::DbError;
pub use repository::RepositoryFactory;

pub use repositories::{
    Booking, BookingRepository, BookingRepositoryFactory, NewBooking, SqlBookingRepository,
};
