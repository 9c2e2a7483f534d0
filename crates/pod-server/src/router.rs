use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Path of the health endpoint; every other path is a resource.
pub const HEALTH_PATH: &str = "/.well-known/pod/health";

/// Build the axum router with all Pod endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handler::health_handler))
        .fallback(handler::resource_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
