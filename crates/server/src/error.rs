//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// JSON body returned when the proxied upstream call fails.
#[derive(Debug, Serialize)]
pub struct ProxyErrorBody {
    pub success: bool,
    pub message: String,
}

/// API error type.
///
/// Both surfaces report failures as HTTP 400, but with different body
/// shapes: request validation and store failures render the error text
/// directly, while proxy failures render the structured JSON body
/// clients of the release endpoint expect.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid request parameter.
    #[error("{0}")]
    BadRequest(String),

    /// The proxied upstream call failed at the transport layer.
    #[error("{0}")]
    Upstream(String),

    /// Object store failure before any response byte was sent.
    #[error("{0}")]
    Storage(#[from] hangar_storage::StorageError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(_) | Self::Storage(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            Self::Upstream(message) => (
                StatusCode::BAD_REQUEST,
                Json(ProxyErrorBody {
                    success: false,
                    message,
                }),
            )
                .into_response(),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
