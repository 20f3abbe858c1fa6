//! Route definitions for the NovaFarm dashboard API

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/crops", get(handlers::list_crops))
        .nest("/sessions", session_routes())
}

/// Dashboard session routes
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::start_session))
        .route(
            "/:session_id",
            get(handlers::get_session).delete(handlers::end_session),
        )
        .route("/:session_id/location", put(handlers::set_location))
        .route("/:session_id/crop", put(handlers::set_crop))
        .route("/:session_id/refresh", post(handlers::refresh))
        .route("/:session_id/parameters", put(handlers::update_parameters))
        .route("/:session_id/metrics", get(handlers::preview_metrics))
        .route(
            "/:session_id/advisories/ack",
            post(handlers::acknowledge_advisories),
        )
}
