//! API route configuration.

use crate::api::handlers::{missing_code_handler, redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Short link routes.
///
/// # Endpoints
///
/// - `POST /short`         - Create a short link (form or JSON body)
/// - `GET  /short`         - 400, no code given
/// - `GET  /short/`        - 400, no code given
/// - `GET  /short/{code}`  - Redirect to the original URL
pub fn short_routes() -> Router<AppState> {
    Router::new()
        .route("/short", get(missing_code_handler).post(shorten_handler))
        .route("/short/", get(missing_code_handler))
        .route("/short/{code}", get(redirect_handler))
}
