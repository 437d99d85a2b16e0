//! Repository modules for database access

pub mod booking;
pub mod booking_factory;
pub mod booking_sql;

// Re-export the booking repository and factory for ease of use
pub use booking::{Booking, BookingRepository, NewBooking};
pub use booking_factory::BookingRepositoryFactory;
pub use booking_sql::SqlBookingRepository;
