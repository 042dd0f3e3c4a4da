//! HTTP error response conversion
//!
//! Renders [`UploadError`] as the JSON error body returned by the upload
//! middleware. Handlers behind the middleware can return `HttpUploadError` too,
//! so every upload failure has the same shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediashim_core::{ErrorMetadata, LogLevel, UploadError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for UploadError to implement IntoResponse
/// (orphan rules: UploadError lives in mediashim-core)
#[derive(Debug)]
pub struct HttpUploadError(pub UploadError);

impl From<UploadError> for HttpUploadError {
    fn from(err: UploadError) -> Self {
        HttpUploadError(err)
    }
}

impl From<mediashim_storage::StorageError> for HttpUploadError {
    fn from(err: mediashim_storage::StorageError) -> Self {
        HttpUploadError(err.into())
    }
}

fn log_error(error: &UploadError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Upload error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Upload error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Upload error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpUploadError {
    /// Build the response body; details are only exposed outside production
    /// and for non-sensitive errors.
    pub fn to_error_response(&self, expose_details: bool) -> ErrorResponse {
        let error = &self.0;
        let show = expose_details && !error.is_sensitive();

        ErrorResponse {
            error: error.client_message(),
            details: show.then(|| error.detailed_message()),
            error_type: show.then(|| error.error_type().to_string()),
            code: error.error_code().to_string(),
            recoverable: error.is_recoverable(),
            suggested_action: error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpUploadError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        let body = self.to_error_response(!is_production_env());
        (status, Json(body)).into_response()
    }
}
