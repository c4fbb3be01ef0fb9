//! Error types for the HTTP API.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hodl::HodlError;
use hodl_evm::EvmError;

/// Errors returned by API handlers.
///
/// Every variant renders as `{"success": false, "error": <message>}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Domain error from the chain layer or from input validation.
    #[error(transparent)]
    Hodl(#[from] HodlError),

    /// The request body could not be parsed.
    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<EvmError> for ApiError {
    fn from(value: EvmError) -> Self {
        Self::Hodl(value.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::InvalidBody(value.body_text())
    }
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Hodl(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Hodl(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::BAD_REQUEST {
            tracing::debug!(error = %self, "Request failed");
        }
        let body = serde_json::json!({ "success": false, "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
