//! Common response envelope.

use axum::http::StatusCode;
use serde::Serialize;

/// Envelope shared by successful responses and client errors.
///
/// ```json
/// { "code": 404, "message": "Code not found!" }
/// ```
#[derive(Debug, Serialize)]
pub struct ResponseData<T: Serialize> {
    pub code: u16,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ResponseData<T> {
    /// `200 Success` envelope carrying `data`.
    pub fn success(data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    pub fn message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: None,
        }
    }
}
