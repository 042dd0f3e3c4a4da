//! Error types module
//!
//! `UploadError` is the single error vocabulary of the upload pipeline. Failures
//! raised by the multipart parser or by the media service are translated into one
//! of these kinds before they reach the hosting request pipeline, so callers never
//! see a third-party error shape.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like an unreachable service
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "INVALID_EXTENSION")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden in production
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File extension '{extension}' of '{filename}' is not allowed")]
    InvalidExtension {
        filename: String,
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Upload service unavailable: {0}")]
    UploadServiceUnavailable(String),

    #[error("Upload service rejected the credentials: {0}")]
    Unauthorized(String),

    #[error("Upload rejected by service: {0}")]
    UploadRejected(String),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("No file provided on field '{0}'")]
    MissingFile(String),

    #[error("Malformed multipart body: {0}")]
    MalformedMultipart(String),

    #[error("Request is not multipart/form-data")]
    NotMultipart,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn upload_error_static_metadata(
    err: &UploadError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        UploadError::InvalidExtension { .. } => (
            400,
            "INVALID_EXTENSION",
            false,
            Some("Upload a file with one of the allowed extensions"),
            false,
            LogLevel::Debug,
        ),
        UploadError::PayloadTooLarge(_) => (
            413,
            "PAYLOAD_TOO_LARGE",
            false,
            Some("Reduce file size and try again"),
            false,
            LogLevel::Debug,
        ),
        UploadError::UploadServiceUnavailable(_) => (
            503,
            "UPLOAD_SERVICE_UNAVAILABLE",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Warn,
        ),
        UploadError::Unauthorized(_) => (
            502,
            "UPLOAD_SERVICE_UNAUTHORIZED",
            false,
            Some("Contact support if this error persists"),
            true,
            LogLevel::Error,
        ),
        UploadError::UploadRejected(_) => (
            502,
            "UPLOAD_REJECTED",
            false,
            Some("Check the file contents and try a different file"),
            false,
            LogLevel::Warn,
        ),
        UploadError::UnexpectedField(_) => (
            400,
            "UNEXPECTED_FIELD",
            false,
            Some("Send files only on the expected form field"),
            false,
            LogLevel::Debug,
        ),
        UploadError::MissingFile(_) => (
            400,
            "MISSING_FILE",
            false,
            Some("Attach a file to the expected form field"),
            false,
            LogLevel::Debug,
        ),
        UploadError::MalformedMultipart(_) => (
            400,
            "MALFORMED_MULTIPART",
            false,
            Some("Check request format and parameters"),
            false,
            LogLevel::Debug,
        ),
        UploadError::NotMultipart => (
            415,
            "NOT_MULTIPART",
            false,
            Some("Send the request as multipart/form-data"),
            false,
            LogLevel::Debug,
        ),
        UploadError::Internal(_) => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl UploadError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            UploadError::InvalidExtension { .. } => "InvalidExtension",
            UploadError::PayloadTooLarge(_) => "PayloadTooLarge",
            UploadError::UploadServiceUnavailable(_) => "UploadServiceUnavailable",
            UploadError::Unauthorized(_) => "Unauthorized",
            UploadError::UploadRejected(_) => "UploadRejected",
            UploadError::UnexpectedField(_) => "UnexpectedField",
            UploadError::MissingFile(_) => "MissingFile",
            UploadError::MalformedMultipart(_) => "MalformedMultipart",
            UploadError::NotMultipart => "NotMultipart",
            UploadError::Internal(_) => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::InvalidExtension { allowed, .. } => format!(
                "Invalid file extension. Allowed extensions: {}",
                allowed.join(", ")
            ),
            UploadError::PayloadTooLarge(ref msg) => msg.clone(),
            UploadError::UploadServiceUnavailable(_) => {
                "Upload service temporarily unavailable".to_string()
            }
            UploadError::Unauthorized(_) => "Failed to access upload service".to_string(),
            UploadError::UploadRejected(ref msg) => msg.clone(),
            UploadError::UnexpectedField(ref field) => format!("Unexpected field: {}", field),
            UploadError::MissingFile(ref field) => {
                format!("No file provided on field '{}'", field)
            }
            UploadError::MalformedMultipart(ref msg) => msg.clone(),
            UploadError::NotMultipart => "Request must be multipart/form-data".to_string(),
            UploadError::Internal(_) => "Internal server error".to_string(),
        }
    }
}
