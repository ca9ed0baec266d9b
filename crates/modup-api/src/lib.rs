//! modup-api - HTTP and cloud-function layer for the mod upload service
//!
//! This crate exposes the upload function two ways: as an axum router for a
//! long-running server, and as `function::handle_event` for platforms that
//! invoke the handler with a JSON event. Both go through the `UploadBackend`
//! trait held in `AppState`.
//!
//! # Usage
//!
//! ```ignore
//! use modup_api::{create_router, AppState};
//!
//! let state = AppState::acknowledging();
//! let router = create_router(state);
//! ```

pub mod config;
pub mod error;
pub mod function;
pub mod handlers;
pub mod state;

pub use config::{ConfigError, CorsPolicy, UploadSettings, HEALTH_PATH};
pub use error::{ApiError, ErrorResponse};
pub use function::{handle_event, FunctionContext, FunctionEvent, FunctionResponse};
pub use state::AppState;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the upload router with the given application state.
///
/// Settings are expected to have passed [`UploadSettings::validate`]; a route
/// path equal to [`HEALTH_PATH`] makes axum panic on the overlapping route.
pub fn create_router(state: AppState) -> Router {
    let route_path = state.settings().normalized_route_path();
    let body_limit = state.settings().max_body_bytes;
    let cors = state.cors().layer();

    Router::new()
        // Health check
        .route(HEALTH_PATH, get(|| async { "OK" }))
        // Upload function: POST acknowledges, GET is the retrieval placeholder.
        // OPTIONS never reaches the router, the CORS layer answers it.
        // axum serves HEAD from the GET handler unless HEAD has its own, so it
        // is rejected explicitly.
        .route(
            &route_path,
            post(handlers::files::upload_file)
                .get(handlers::files::get_file)
                .head(handlers::files::method_not_allowed)
                .fallback(handlers::files::method_not_allowed),
        )
        // Middleware
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
