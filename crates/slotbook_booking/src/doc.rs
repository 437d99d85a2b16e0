// File: crates/slotbook_booking/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::logic::{
    BookingForm, CampaignInfo, ClearResponse, HealthResponse, ReserveRequest, ReserveResponse,
    SlotView, SlotsResponse,
};
use slotbook_common::error::FieldError;
use slotbook_common::models::{Booking, BookingChange};

struct BasicAuthAddon;

impl Modify for BasicAuthAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler,
        crate::handlers::campaign_handler,
        crate::handlers::slots_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::reserve_handler,
        crate::handlers::changes_handler,
        crate::handlers::export_handler,
        crate::handlers::clear_handler
    ),
    components(
        schemas(
            Booking,
            BookingChange,
            BookingForm,
            CampaignInfo,
            ClearResponse,
            FieldError,
            HealthResponse,
            ReserveRequest,
            ReserveResponse,
            SlotView,
            SlotsResponse
        )
    ),
    modifiers(&BasicAuthAddon),
    tags(
        (name = "Bookings", description = "Slot catalog, reservations and change feed"),
        (name = "Admin", description = "Export and clear, behind HTTP Basic credentials")
    ),
    servers(
        (url = "/api", description = "Slotbook API server")
    )
)]
pub struct BookingApiDoc;
