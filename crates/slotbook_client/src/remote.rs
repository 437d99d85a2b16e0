//! [`BookingStore`] over the slotbook HTTP API.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use slotbook_booking::logic::format_birth_date;
use slotbook_booking::AdminCredentials;
use slotbook_common::models::{Booking, NewBooking};
use slotbook_common::services::{BookingStore, BoxFuture, ChangeStream, StoreError};
use slotbook_common::{create_client, HTTP_CLIENT};
use slotbook_config::ClientConfig;
use tracing::{debug, info, instrument};

use crate::error::ClientError;
use crate::sse::change_events;

/// Talks to a running slotbook server.
///
/// Inserts go to `POST /bookings`, so the server's unique constraint decides conflicts.
#[derive(Clone)]
pub struct RemoteBookingStore {
    client: Client,
    stream_client: Client,
    base_url: String,
    admin: Option<AdminCredentials>,
}

impl RemoteBookingStore {
    /// Store using the shared client and default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            stream_client: HTTP_CLIENT.clone(),
            base_url: trim_base(base_url.into()),
            admin: None,
        }
    }

    /// Store built from the `[client]` section.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            client: create_client(config.timeout_secs)?,
            // the change feed is a long-lived response
            stream_client: create_client(0)?,
            base_url: trim_base(config.base_url.clone()),
            admin: None,
        })
    }

    /// Credentials sent with admin requests.
    pub fn with_admin(mut self, credentials: AdminCredentials) -> Self {
        self.admin = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin_request(&self, builder: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let credentials = self.admin.as_ref().ok_or(ClientError::MissingCredentials)?;
        Ok(builder.basic_auth(&credentials.username, Some(&credentials.password)))
    }

    #[instrument(skip(self))]
    pub async fn fetch_bookings(&self) -> Result<Vec<Booking>, ClientError> {
        let response = self.client.get(self.url("/bookings")).send().await?;
        read_json(response).await
    }

    #[instrument(skip(self, booking), fields(slot = %booking.slot))]
    pub async fn post_booking(&self, booking: &NewBooking) -> Result<Booking, ClientError> {
        let body = json!({
            "name": booking.name,
            "birth_date": format_birth_date(&booking.birth_date),
            "registration": booking.registration,
            "phone": booking.phone,
            "slot": booking.slot,
        });
        let response = self
            .client
            .post(self.url("/bookings"))
            .json(&body)
            .send()
            .await?;

        if response.status() == StatusCode::CONFLICT {
            debug!("Server reported slot conflict");
            return Err(ClientError::Conflict(booking.slot.clone()));
        }
        let payload: Value = read_json(response).await?;
        let stored = serde_json::from_value(payload["booking"].clone())?;
        Ok(stored)
    }

    /// Booking count as reported by `GET /health`.
    #[instrument(skip(self))]
    pub async fn fetch_count(&self) -> Result<u64, ClientError> {
        let response = self.client.get(self.url("/health")).send().await?;
        let payload: Value = read_json(response).await?;
        payload["bookings"].as_u64().ok_or_else(|| ClientError::Status {
            status: 200,
            message: "response has no bookings count".to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn clear_bookings(&self) -> Result<u64, ClientError> {
        let request = self.admin_request(self.client.delete(self.url("/admin/bookings")))?;
        let payload: Value = read_json(request.send().await?).await?;
        payload["removed"].as_u64().ok_or_else(|| ClientError::Status {
            status: 200,
            message: "response has no removed count".to_string(),
        })
    }

    pub async fn changes(&self) -> Result<ChangeStream, ClientError> {
        let response = self
            .stream_client
            .get(self.url("/bookings/changes"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = check_status(response).await?;
        info!("Subscribed to change feed");
        Ok(change_events(response.bytes_stream()))
    }
}

fn trim_base(base_url: String) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Pulls the message out of the common `{"error": {"message": ..}}` body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

impl BookingStore for RemoteBookingStore {
    fn list_bookings(&self) -> BoxFuture<'_, Vec<Booking>, StoreError> {
        Box::pin(async move { self.fetch_bookings().await.map_err(StoreError::from) })
    }

    fn insert_booking(&self, booking: NewBooking) -> BoxFuture<'_, Booking, StoreError> {
        Box::pin(async move { self.post_booking(&booking).await.map_err(StoreError::from) })
    }

    fn count_bookings(&self) -> BoxFuture<'_, u64, StoreError> {
        Box::pin(async move { self.fetch_count().await.map_err(StoreError::from) })
    }

    fn delete_all(&self) -> BoxFuture<'_, u64, StoreError> {
        Box::pin(async move { self.clear_bookings().await.map_err(StoreError::from) })
    }

    fn subscribe(&self) -> BoxFuture<'_, ChangeStream, StoreError> {
        Box::pin(async move { self.changes().await.map_err(StoreError::from) })
    }
}
