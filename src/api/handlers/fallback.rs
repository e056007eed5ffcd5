use axum::{Json, http::StatusCode};

use crate::api::dto::response::ResponseData;

/// Fallback for every unmatched route.
pub async fn not_found_handler() -> (StatusCode, Json<ResponseData<()>>) {
    (
        StatusCode::NOT_FOUND,
        Json(ResponseData::message(StatusCode::NOT_FOUND, "Route Not Found!")),
    )
}
