//! Upload middleware for axum routers
//!
//! An [`UploadMiddleware`] is installed with
//! `axum::middleware::from_fn_with_state(middleware, upload_files)`. It parses
//! the multipart body, stores the files and hands the results to the next
//! handler as request extensions.

use crate::engine::UploadEngine;
use crate::error::HttpUploadError;
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::CONTENT_LENGTH;
use mediashim_core::UploadedFiles;
use std::sync::Arc;

/// How many files the bound field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    /// At most one file
    Single,
    /// Any number of files, optionally capped
    Array { max_count: Option<usize> },
}

/// Per-route binding of the shared engine to a field name and mode
#[derive(Debug, Clone)]
pub struct UploadMiddleware {
    engine: Arc<UploadEngine>,
    field_name: String,
    mode: UploadMode,
}

impl UploadMiddleware {
    pub fn new(engine: Arc<UploadEngine>, field_name: impl Into<String>, mode: UploadMode) -> Self {
        Self {
            engine,
            field_name: field_name.into(),
            mode,
        }
    }

    pub fn engine(&self) -> &Arc<UploadEngine> {
        &self.engine
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Cap the number of files an array upload accepts
    ///
    /// Has no effect on single uploads.
    pub fn max_count(mut self, max_count: usize) -> Self {
        if let UploadMode::Array { .. } = self.mode {
            self.mode = UploadMode::Array {
                max_count: Some(max_count),
            };
        }
        self
    }
}

/// Upload middleware
///
/// On success the request continues with:
/// - `UploadedFile` (single mode, only when a file was sent)
/// - `UploadedFiles` (array mode, possibly empty)
/// - `FormFields` with the text fields of the form
///
/// The consumed body is replaced with an empty one. On failure the request is
/// answered with the JSON error body and never reaches the handler.
pub async fn upload_files(
    State(upload): State<UploadMiddleware>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let parsed = match upload
        .engine
        .process(&parts.headers, body, &upload.field_name, upload.mode)
        .await
    {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(
                method = %parts.method,
                uri = %parts.uri,
                field = %upload.field_name,
                "Upload rejected"
            );
            return HttpUploadError(err).into_response();
        }
    };

    tracing::info!(
        field = %upload.field_name,
        folder = %upload.engine.adapter().folder(),
        files = parsed.files.len(),
        fields = parsed.fields.len(),
        "Upload accepted"
    );

    match upload.mode {
        UploadMode::Single => {
            if let Some(file) = parsed.files.into_iter().next() {
                parts.extensions.insert(file);
            }
        }
        UploadMode::Array { .. } => {
            parts.extensions.insert(UploadedFiles(parsed.files));
        }
    }
    parts.extensions.insert(parsed.fields);
    parts.headers.remove(CONTENT_LENGTH);

    next.run(Request::from_parts(parts, Body::empty())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::UploadLimits;
    use mediashim_storage::{MemoryMediaService, StorageAdapter};

    fn engine() -> Arc<UploadEngine> {
        let adapter = StorageAdapter::new(
            Arc::new(MemoryMediaService::new()),
            "uploads",
            vec!["png".to_string()],
        );
        Arc::new(UploadEngine::new(adapter, UploadLimits::default()))
    }

    #[test]
    fn test_max_count_applies_to_arrays() {
        let middleware = UploadMiddleware::new(
            engine(),
            "images",
            UploadMode::Array { max_count: None },
        )
        .max_count(3);
        assert_eq!(
            middleware.mode(),
            UploadMode::Array { max_count: Some(3) }
        );
    }

    #[test]
    fn test_max_count_ignored_for_single() {
        let middleware = UploadMiddleware::new(engine(), "image", UploadMode::Single).max_count(3);
        assert_eq!(middleware.mode(), UploadMode::Single);
        assert_eq!(middleware.field_name(), "image");
    }
}
