//! Multipart upload engine
//!
//! Parses a multipart body with `multer` and pushes every accepted file through
//! a [`StorageAdapter`]. One engine is shared by all middleware handed out by
//! an [`UploaderFactory`](crate::UploaderFactory).

use crate::middleware::UploadMode;
use axum::body::Body;
use http::{header::CONTENT_TYPE, HeaderMap};
use http_body_util::LengthLimitError;
use mediashim_core::{FormFields, UploadConfig, UploadError, UploadedFile};
use mediashim_storage::{FileUpload, StorageAdapter};
use multer::{Constraints, Multipart, SizeLimit};

/// Room for text fields and part headers on top of the file payloads
const FORM_OVERHEAD_BYTES: u64 = 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Parser limits applied to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum size of a single file in bytes
    pub max_file_size: u64,
    /// Maximum number of files accepted by array uploads without an explicit cap
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            max_files: 10,
        }
    }
}

impl UploadLimits {
    pub fn from_config(config: &UploadConfig) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes as u64,
            max_files: config.max_files_per_request,
        }
    }

    /// Largest multipart body accepted for one request
    pub fn max_request_size(&self) -> u64 {
        self.max_file_size
            .saturating_mul(self.max_files.max(1) as u64)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }
}

/// What the engine extracted from one request
#[derive(Debug, Clone, Default)]
pub struct ParsedUpload {
    /// Stored files, in submission order
    pub files: Vec<UploadedFile>,
    pub fields: FormFields,
}

#[derive(Debug)]
pub struct UploadEngine {
    adapter: StorageAdapter,
    limits: UploadLimits,
}

impl UploadEngine {
    pub fn new(adapter: StorageAdapter, limits: UploadLimits) -> Self {
        Self { adapter, limits }
    }

    pub fn adapter(&self) -> &StorageAdapter {
        &self.adapter
    }

    pub fn limits(&self) -> UploadLimits {
        self.limits
    }

    fn constraints(&self) -> Constraints {
        Constraints::new().size_limit(
            SizeLimit::new()
                .whole_stream(self.limits.max_request_size())
                .per_field(self.limits.max_file_size),
        )
    }

    fn max_files(&self, mode: UploadMode) -> usize {
        match mode {
            UploadMode::Single => 1,
            UploadMode::Array { max_count } => max_count.unwrap_or(self.limits.max_files),
        }
    }

    /// Parse a multipart body and store the files sent on `field_name`
    ///
    /// Files are checked against the allow-list before their bytes are read
    /// and stored one by one as the body is parsed. A failure part-way through
    /// leaves the files stored so far on the media service.
    pub async fn process(
        &self,
        headers: &HeaderMap,
        body: Body,
        field_name: &str,
        mode: UploadMode,
    ) -> Result<ParsedUpload, UploadError> {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .ok_or(UploadError::NotMultipart)?;
        let boundary =
            multer::parse_boundary(content_type).map_err(|_| UploadError::NotMultipart)?;

        let mut multipart =
            Multipart::with_constraints(body.into_data_stream(), boundary, self.constraints());
        let max_files = self.max_files(mode);
        let mut parsed = ParsedUpload::default();

        while let Some(field) = multipart.next_field().await.map_err(map_multer_error)? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(filename) = field.file_name().map(str::to_string) else {
                let value = field.text().await.map_err(map_multer_error)?;
                parsed.fields.insert(name, value);
                continue;
            };

            // Browsers send an empty file part for a file input left blank
            if filename.is_empty() {
                continue;
            }

            if name != field_name {
                return Err(UploadError::UnexpectedField(name));
            }
            if parsed.files.len() >= max_files {
                tracing::debug!(
                    field = %name,
                    max_files,
                    "Upload exceeds file count"
                );
                return Err(UploadError::UnexpectedField(name));
            }

            self.adapter.check_extension(&filename)?;

            let content_type = field
                .content_type()
                .map(|mime| mime.to_string())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
            let data = field.bytes().await.map_err(map_multer_error)?;

            let uploaded = self
                .adapter
                .store(FileUpload {
                    field_name: name,
                    filename,
                    content_type,
                    data,
                })
                .await?;

            tracing::debug!(
                public_id = %uploaded.public_id,
                folder = %uploaded.folder,
                size_bytes = uploaded.size_bytes,
                "File uploaded"
            );
            parsed.files.push(uploaded);
        }

        Ok(parsed)
    }
}

fn map_multer_error(err: multer::Error) -> UploadError {
    match err {
        multer::Error::FieldSizeExceeded { limit, field_name } => UploadError::PayloadTooLarge(
            format!(
                "File on field '{}' exceeds the maximum size of {} bytes",
                field_name.unwrap_or_default(),
                limit
            ),
        ),
        multer::Error::StreamSizeExceeded { limit } => UploadError::PayloadTooLarge(format!(
            "Request body exceeds the maximum size of {} bytes",
            limit
        )),
        other if hit_body_limit(&other) => {
            UploadError::PayloadTooLarge("Request body exceeds the maximum size".to_string())
        }
        other => UploadError::MalformedMultipart(format!("Invalid multipart body: {}", other)),
    }
}

/// Whether reading the body failed because a length-limited body ran out
fn hit_body_limit(err: &multer::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}
