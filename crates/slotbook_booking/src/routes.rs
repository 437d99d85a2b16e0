// --- File: crates/slotbook_booking/src/routes.rs ---

use axum::{
    middleware,
    routing::{delete, get},
    Router,
};
use slotbook_common::error::SlotbookError;
use slotbook_common::services::BookingStore;
use slotbook_config::AppConfig;
use slotbook_db::{BookingRepository, BookingRepositoryFactory, DbClient, RepositoryFactory};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{admin_auth_middleware, AdminGate};
use crate::feed::ChangeFeed;
use crate::handlers::{
    campaign_handler, changes_handler, clear_handler, export_handler, health_handler,
    list_bookings_handler, reserve_handler, root_handler, slots_handler, BookingState,
};
use crate::logic::SlotCatalog;
use crate::service::LiveBookingStore;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Assembles the booking routes around already built state.
///
/// `/admin/*` routes require HTTP Basic credentials accepted by `gate`.
pub fn router(state: Arc<BookingState>, gate: Arc<AdminGate>) -> Router {
    let admin = Router::new()
        .route("/admin/export", get(export_handler))
        .route("/admin/bookings", delete(clear_handler))
        .route_layer(middleware::from_fn_with_state(gate, admin_auth_middleware));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/campaign", get(campaign_handler))
        .route("/slots", get(slots_handler))
        .route(
            "/bookings",
            get(list_bookings_handler).post(reserve_handler),
        )
        .route("/bookings/changes", get(changes_handler))
        .merge(admin)
        .with_state(state)
}

/// Builds the live store: database client, schema, repository and change feed.
pub async fn build_store(config: &AppConfig) -> Result<Arc<dyn BookingStore>, SlotbookError> {
    let client = match config.database.as_ref() {
        Some(db_config) => DbClient::from_config(db_config).await?,
        None => {
            warn!("No [database] section configured, bookings are kept in memory only");
            DbClient::from_url(IN_MEMORY_URL).await?
        }
    };

    let repository = BookingRepositoryFactory::new().create_repository(client);
    repository.init_schema().await?;
    info!("Bookings schema ready");

    let feed = ChangeFeed::new(config.campaign.feed_capacity);
    Ok(Arc::new(LiveBookingStore::new(repository, feed)))
}

/// Creates the router with every booking route, wired to the configured database.
pub async fn routes(config: Arc<AppConfig>) -> Result<Router, SlotbookError> {
    let catalog = SlotCatalog::from_config(&config.campaign)
        .map_err(|e| SlotbookError::ConfigError(e.to_string()))?;
    info!(slots = catalog.len(), "Slot catalog ready");

    let store = build_store(&config).await?;
    let gate = Arc::new(AdminGate::from_config(&config.admin));
    let state = Arc::new(BookingState::new(config, store, catalog)?);

    Ok(router(state, gate))
}
