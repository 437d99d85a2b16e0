// --- File: crates/slotbook_booking/src/handlers.rs ---
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use chrono::Utc;
use chrono_tz::Tz;
use futures::{Stream, StreamExt};
use slotbook_common::error::SlotbookError;
use slotbook_common::models::Booking;
use slotbook_common::services::{BookingStore, StoreError};
use slotbook_config::AppConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::export::{build_export, XLSX_CONTENT_TYPE};
use crate::logic::{
    available_count, booked_slots, slot_views, CampaignInfo, ClearResponse, HealthResponse,
    ReserveRequest, ReserveResponse, SlotCatalog, SlotsResponse, MSG_LOAD_FAILED,
};
use crate::service::{reserve, ReservationOutcome};

/// SSE event name carrying a JSON [`slotbook_common::models::BookingChange`].
pub const CHANGE_EVENT: &str = "booking-change";

const KEEP_ALIVE_SECS: u64 = 15;

// Shared state of the booking routes
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn BookingStore>,
    pub catalog: Arc<SlotCatalog>,
    pub time_zone: Tz,
}

impl BookingState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn BookingStore>,
        catalog: SlotCatalog,
    ) -> Result<Self, SlotbookError> {
        let time_zone: Tz = config.campaign.time_zone.parse().map_err(|_| {
            SlotbookError::ConfigError(format!(
                "Unknown campaign time zone {:?}",
                config.campaign.time_zone
            ))
        })?;
        Ok(Self {
            config,
            store,
            catalog: Arc::new(catalog),
            time_zone,
        })
    }
}

fn load_failed(err: StoreError) -> SlotbookError {
    error!(error = %err, "Failed to load bookings");
    SlotbookError::DatabaseError(MSG_LOAD_FAILED.to_string())
}

async fn current_bookings(state: &BookingState) -> Result<Vec<Booking>, SlotbookError> {
    state.store.list_bookings().await.map_err(load_failed)
}

/// Plain welcome text for the API root.
pub async fn root_handler() -> &'static str {
    "Welcome to the slotbook API"
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 500, description = "Store unavailable")
    ),
    tag = "Bookings"
))]
pub async fn health_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<HealthResponse>, SlotbookError> {
    let bookings = state.store.count_bookings().await.map_err(|err| {
        error!(error = %err, "Health check failed");
        SlotbookError::from(err)
    })?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        bookings,
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/campaign",
    responses((status = 200, description = "Campaign day and hours", body = CampaignInfo)),
    tag = "Bookings"
))]
pub async fn campaign_handler(State(state): State<Arc<BookingState>>) -> Json<CampaignInfo> {
    Json(CampaignInfo::new(&state.config.campaign, &state.catalog))
}

/// Every slot of the day with its booked flag.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/slots",
    responses(
        (status = 200, description = "Slot catalog with availability", body = SlotsResponse),
        (status = 500, description = "Could not load bookings")
    ),
    tag = "Bookings"
))]
pub async fn slots_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<SlotsResponse>, SlotbookError> {
    let bookings = current_bookings(&state).await?;
    let booked = booked_slots(&bookings);
    Ok(Json(SlotsResponse {
        slots: slot_views(&state.catalog, &booked),
        available: available_count(&state.catalog, &booked),
        total: state.catalog.len(),
    }))
}

#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings",
    responses(
        (status = 200, description = "Bookings ordered by slot", body = [Booking]),
        (status = 500, description = "Could not load bookings")
    ),
    tag = "Bookings"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<Booking>>, SlotbookError> {
    current_bookings(&state).await.map(Json)
}

/// Reserve a slot: one insert attempt, the unique constraint decides.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/bookings",
    request_body = ReserveRequest,
    responses(
        (status = 201, description = "Slot booked", body = ReserveResponse),
        (status = 400, description = "Malformed body, invalid form or unknown slot"),
        (status = 409, description = "Slot already booked by someone else", body = ReserveResponse),
        (status = 500, description = "Could not complete the booking")
    ),
    tag = "Bookings"
))]
pub async fn reserve_handler(
    State(state): State<Arc<BookingState>>,
    payload: Result<Json<ReserveRequest>, JsonRejection>,
) -> Result<Response, SlotbookError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "Rejected reservation body");
        SlotbookError::ValidationError(rejection.body_text())
    })?;
    let outcome = reserve(
        state.store.as_ref(),
        &state.catalog,
        &payload.form,
        &payload.slot,
    )
    .await?;

    let message = outcome.message().to_string();
    let response = match outcome {
        ReservationOutcome::Booked(booking) => (
            StatusCode::CREATED,
            Json(ReserveResponse {
                success: true,
                booking: Some(booking),
                message,
            }),
        ),
        ReservationOutcome::Conflict { .. } => (
            StatusCode::CONFLICT,
            Json(ReserveResponse {
                success: false,
                booking: None,
                message,
            }),
        ),
    };
    Ok(response.into_response())
}

/// Server-Sent Events stream of booking changes.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/bookings/changes",
    responses((status = 200, description = "text/event-stream of booking-change events")),
    tag = "Bookings"
))]
pub async fn changes_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, SlotbookError> {
    let changes = state.store.subscribe().await?;
    info!("Change feed subscriber connected");
    let events = changes.map(|change| Event::default().event(CHANGE_EVENT).json_data(&change));
    Ok(Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(KEEP_ALIVE_SECS))
            .text("keep-alive"),
    ))
}

/// Download all bookings as a spreadsheet.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/export",
    responses(
        (status = 200, description = "xlsx workbook", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 401, description = "Missing or invalid admin credentials"),
        (status = 404, description = "There are no bookings to export")
    ),
    security(("basic_auth" = [])),
    tag = "Admin"
))]
pub async fn export_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Response, SlotbookError> {
    let bookings = current_bookings(&state).await?;
    let file = build_export(&bookings, state.time_zone, Utc::now().date_naive())?;
    info!(file = %file.file_name, rows = bookings.len(), "Serving export");

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

/// Remove every booking.
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/bookings",
    responses(
        (status = 200, description = "Bookings removed", body = ClearResponse),
        (status = 401, description = "Missing or invalid admin credentials")
    ),
    security(("basic_auth" = [])),
    tag = "Admin"
))]
pub async fn clear_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<ClearResponse>, SlotbookError> {
    let removed = state.store.delete_all().await.map_err(|err| {
        error!(error = %err, "Failed to clear bookings");
        SlotbookError::from(err)
    })?;
    info!(removed, "Bookings cleared");
    Ok(Json(ClearResponse { removed }))
}
