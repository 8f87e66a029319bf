use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "error": "Invalid request format. Expected \"items\" array.",
    "message": "Invalid request",
    "request_id": "req-abc123xyz",
    "timestamp": "2025-01-10T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Description of what went wrong
    pub error: String,
    /// Short summary of the failure category
    pub message: String,
    /// Unique request identifier for support and debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// ISO 8601 timestamp when error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::BadRequest(rejection.body_text())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::InternalError(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Detail placed in the `error` field of the response envelope.
    pub fn response_error(&self) -> String {
        match self {
            Self::BadRequest(msg) | Self::ValidationError(msg) | Self::PayloadTooLarge(msg) => {
                msg.clone()
            }
            Self::InternalError(msg) => msg.clone(),
            // anyhow chains may carry paths or internals
            Self::Other(_) => "Internal server error".to_string(),
        }
    }

    /// Summary placed in the `message` field of the response envelope.
    pub fn response_message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "Invalid request",
            Self::ValidationError(_) => "Validation failed",
            Self::PayloadTooLarge(_) => "Too many items",
            Self::InternalError(_) | Self::Other(_) => "Failed to generate forecasts",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Error generating forecasts");
        } else {
            tracing::warn!(error = %self, "Rejected forecast request");
        }

        let body = ErrorResponse {
            success: false,
            error: self.response_error(),
            message: self.response_message().to_string(),
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        (status, Json(body)).into_response()
    }
}
