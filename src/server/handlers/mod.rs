pub mod health;
pub mod index;
pub mod metrics;
pub mod recommend;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::LookalikeError;

/// Wrapper that converts `LookalikeError` into an HTTP response.
pub struct ApiError(pub LookalikeError);

impl From<LookalikeError> for ApiError {
    fn from(e: LookalikeError) -> Self {
        ApiError(e)
    }
}

/// Body extraction failures render like every other API error instead of
/// axum's plain-text rejection.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError(LookalikeError::PayloadTooLarge(message))
        } else {
            ApiError(LookalikeError::Validation(message))
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
            "status": status,
        });
        (
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            axum::Json(body),
        )
            .into_response()
    }
}
