//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `POST /short`         - Create a short link
//! - `GET  /short/{code}`  - Short link redirect
//! - `GET  /health`        - Health check: store connectivity
//! - anything else         - 404 `Route Not Found!`
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging

use crate::api;
use crate::api::handlers::{health_handler, not_found_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Constructs the application router with all routes and middleware.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// per-client quota can see the peer address.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .merge(api::routes::short_routes())
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(tracing::layer())
}
