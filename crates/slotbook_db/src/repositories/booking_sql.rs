//! SQL implementation of the booking repository

use crate::error::DbError;
use crate::repositories::booking::{Booking, BookingRepository, NewBooking};
use crate::DbClient;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// SQLSTATE / SQLite extended result codes for unique-constraint violations.
const UNIQUE_VIOLATION_CODES: [&str; 3] = ["23505", "2067", "1555"];

/// SQL implementation of the booking repository
#[derive(Debug, Clone)]
pub struct SqlBookingRepository {
    db_client: DbClient,
}

impl SqlBookingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }
}

// Timestamps are stored as RFC 3339 text: the Any driver cannot decode DateTime<Utc>.
fn row_to_booking(row: &AnyRow) -> Result<Booking, DbError> {
    let get = |column: &str| -> Result<String, DbError> {
        row.try_get::<String, _>(column)
            .map_err(|e| DbError::DecodeError(format!("column {}: {}", column, e)))
    };

    let created_at_raw = get("created_at")?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DbError::DecodeError(format!("created_at {:?}: {}", created_at_raw, e)))?;

    Ok(Booking {
        id: get("id")?,
        name: get("name")?,
        birth_date: get("birth_date")?,
        registration: get("registration")?,
        phone: get("phone")?,
        slot: get("slot")?,
        created_at,
    })
}

/// Single-attempt insert failures: a unique violation means someone else holds the slot.
fn classify_insert_error(err: sqlx::Error, slot: &str) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        let code = db_err.code();
        let code_matches = code
            .as_deref()
            .map(|c| UNIQUE_VIOLATION_CODES.contains(&c))
            .unwrap_or(false);
        if db_err.is_unique_violation() || code_matches {
            return DbError::UniqueViolation(slot.to_string());
        }
    }
    DbError::QueryError(err.to_string())
}

impl BookingRepository for SqlBookingRepository {
    async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing booking schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                birth_date TEXT NOT NULL,
                registration TEXT NOT NULL,
                phone TEXT NOT NULL,
                slot TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            )
        "#;

        self.db_client.execute(query).await?;

        info!("Booking schema initialized successfully");
        Ok(())
    }

    async fn create(&self, booking: NewBooking) -> Result<Booking, DbError> {
        debug!(slot = %booking.slot, "Inserting booking");

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let query = r#"
            INSERT INTO bookings (id, name, birth_date, registration, phone, slot, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, name, birth_date, registration, phone, slot, created_at
        "#;

        let row = sqlx::query(query)
            .bind(&id)
            .bind(&booking.name)
            .bind(&booking.birth_date)
            .bind(&booking.registration)
            .bind(&booking.phone)
            .bind(&booking.slot)
            .bind(&created_at)
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                let classified = classify_insert_error(e, &booking.slot);
                match &classified {
                    DbError::UniqueViolation(slot) => warn!(%slot, "Slot already taken"),
                    other => error!("Failed to insert booking: {}", other),
                }
                classified
            })?;

        let inserted = row_to_booking(&row)?;
        info!(slot = %inserted.slot, id = %inserted.id, "Booking created successfully");
        Ok(inserted)
    }

    async fn find_all(&self) -> Result<Vec<Booking>, DbError> {
        debug!("Finding all bookings");

        let query = r#"
            SELECT id, name, birth_date, registration, phone, slot, created_at
            FROM bookings
            ORDER BY slot ASC
        "#;

        let rows = sqlx::query(query)
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to find bookings: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn count(&self) -> Result<u64, DbError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM bookings")
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| DbError::QueryError(e.to_string()))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| DbError::DecodeError(e.to_string()))?;
        Ok(total.max(0) as u64)
    }

    async fn delete_all(&self) -> Result<u64, DbError> {
        debug!("Deleting all bookings");

        let result = sqlx::query("DELETE FROM bookings")
            .execute(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to delete bookings: {}", e);
                DbError::QueryError(e.to_string())
            })?;

        info!(removed = result.rows_affected(), "Bookings cleared");
        Ok(result.rows_affected())
    }
}
