// File: services/slotbook_backend/src/main.rs
use axum::Router;
use slotbook_booking::routes as booking_routes;
use slotbook_common::error::SlotbookError;
use slotbook_config::{load_config, AppConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            return ExitCode::FAILURE;
        }
    };
    // dropping the guard stops the file writer
    let _log_guard = slotbook_common::init_from_config(&config.logging);

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: Arc<AppConfig>) -> Result<(), SlotbookError> {
    let booking_router = booking_routes(config.clone()).await?;
    let mut app = Router::new().nest("/api", booking_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use slotbook_booking::doc::BookingApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "Slotbook API",
                version = "0.1.0",
                description = "Blood donation campaign booking API",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(BookingApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    if let Some(static_dir) = config.server.static_dir.as_deref() {
        info!(dir = static_dir, "Serving static files");
        app = app.fallback_service(ServeDir::new(static_dir));
    }

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| SlotbookError::ConfigError(format!("cannot bind {}: {}", addr, e)))?;
    info!("Starting server at http://{}", addr);
    info!("API endpoints available at http://{}/api", addr);

    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|e| SlotbookError::InternalError(e.to_string()))
}
