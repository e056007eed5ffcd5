//! Handler for short link creation.

use axum::{Json, extract::State};

use crate::api::dto::response::ResponseData;
use crate::api::dto::shorten::ShortenData;
use crate::api::extract::{ClientId, ShortenPayload};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for the calling client.
///
/// # Endpoint
///
/// `POST /short`
///
/// # Request Body
///
/// Form (`url=https://example.com&custom_code=promo`) or JSON:
///
/// ```json
/// { "url": "https://example.com", "custom_code": "promo" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "code": 200,
///   "message": "Success",
///   "data": {
///     "urlORi": "https://example.com",
///     "urlShort": "http://localhost:8080/short/aB3xYz",
///     "rate_limit": 9,
///     "rate_limit_reset": 2
///   }
/// }
/// ```
///
/// # Errors
///
/// - **400** missing URL, invalid custom code, malformed body
/// - **403** custom code already in use
/// - **503** creation quota exhausted for this client
/// - **500** store failure or no free code found
pub async fn shorten_handler(
    State(state): State<AppState>,
    ClientId(client): ClientId,
    ShortenPayload(payload): ShortenPayload,
) -> Result<Json<ResponseData<ShortenData>>, AppError> {
    let created = state
        .link_service
        .create_short_link(&client, payload.url, payload.custom_code)
        .await?;

    Ok(Json(ResponseData::success(ShortenData::from(created))))
}
