//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /short/{code}`
///
/// # Responses
///
/// - **301 Moved Permanently** with `Location` set to the original URL
/// - **400 Bad Request** `Code is missing!` for a blank code
/// - **404 Not Found** `Code not found!` if no live mapping exists
/// - **500 Internal Server Error** if the store fails
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let url = state.link_service.resolve(&code).await?;

    metrics::counter!("shortlink_redirects_total").increment(1);

    Ok((StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, url)]))
}

/// `GET /short` and `GET /short/`: a redirect request without a code.
pub async fn missing_code_handler() -> AppError {
    AppError::MissingCode
}
