//! Application error type and its HTTP representation.

use crate::api::dto::response::ResponseData;
use crate::domain::store::StoreError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::time::Duration;
use validator::ValidationErrors;

/// Errors surfaced by the link service and HTTP handlers.
///
/// Client-input errors carry the message shown to the caller; storage errors
/// keep the underlying cause for diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Code is missing!")]
    MissingCode,

    #[error("Code not found!")]
    NotFound { code: String },

    #[error("Rate limit exceeded")]
    RateLimitExceeded { reset_in: Duration },

    #[error("URL Custom short is already in use")]
    CodeInUse { code: String },

    #[error("No free short code found after {attempts} attempts")]
    CodeSpaceExhausted { attempts: u32 },

    #[error("{message}")]
    Validation { message: String },

    #[error("Unable to connect to server")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCode | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::RateLimitExceeded { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::CodeInUse { .. } => StatusCode::FORBIDDEN,
            AppError::CodeSpaceExhausted { .. } | AppError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(ToString::to_string))
            .unwrap_or_else(|| "Invalid request".to_string());

        AppError::bad_request(message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            AppError::MissingCode | AppError::NotFound { .. } | AppError::Validation { .. } => {
                let body = ResponseData::<()>::message(status, self.to_string());
                (status, Json(body)).into_response()
            }
            AppError::RateLimitExceeded { reset_in } => {
                let body = json!({
                    "error": self.to_string(),
                    "rate_limit_reset": reset_in.as_secs() / 60,
                });
                (status, Json(body)).into_response()
            }
            AppError::CodeInUse { .. } => {
                let body = json!({ "error": self.to_string() });
                (status, Json(body)).into_response()
            }
            AppError::CodeSpaceExhausted { .. } => {
                tracing::error!(error = %self, "Short code allocation failed");
                let body = json!({
                    "error": "Unable to allocate short code",
                    "message": self.to_string(),
                });
                (status, Json(body)).into_response()
            }
            AppError::Storage(ref cause) => {
                tracing::error!(error = %cause, "Store operation failed");
                let body = json!({
                    "error": self.to_string(),
                    "message": cause.to_string(),
                });
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_missing_code_response() {
        let (status, body) = body_json(AppError::MissingCode).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "code": 400, "message": "Code is missing!" }));
    }

    #[tokio::test]
    async fn test_not_found_response() {
        let (status, body) = body_json(AppError::NotFound {
            code: "zzzzzz".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Code not found!");
    }

    #[tokio::test]
    async fn test_rate_limit_response_reports_minutes() {
        let (status, body) = body_json(AppError::RateLimitExceeded {
            reset_in: Duration::from_secs(100),
        })
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Rate limit exceeded");
        assert_eq!(body["rate_limit_reset"], 1);
    }

    #[tokio::test]
    async fn test_code_in_use_response() {
        let (status, body) = body_json(AppError::CodeInUse {
            code: "taken".to_string(),
        })
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "URL Custom short is already in use");
    }

    #[test]
    fn test_validation_errors_keep_field_message() {
        use validator::Validate;

        #[derive(Validate)]
        struct Input {
            #[validate(length(min = 1, message = "URL is missing!"))]
            url: String,
        }

        let err: AppError = Input { url: String::new() }.validate().unwrap_err().into();
        assert_eq!(err.to_string(), "URL is missing!");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_storage_response_carries_cause() {
        let (status, body) = body_json(AppError::Storage(StoreError::Connection(
            "refused".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Unable to connect to server");
        assert!(body["message"].as_str().unwrap().contains("refused"));
    }
}
