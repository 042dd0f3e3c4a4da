//! Storage adapter: a media service scoped to one folder and one allow-list.

use crate::traits::{MediaService, UploadRequest};
use bytes::Bytes;
use mediashim_core::{UploadError, UploadedFile};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

/// A file read from a multipart field, ready to be stored
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field_name: String,
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Split a filename into stem and lower-cased extension
///
/// The extension is whatever follows the last `.`, so `.png` has an empty stem
/// and extension `png`. Without a dot the extension is empty.
pub(crate) fn split_filename(filename: &str) -> (&str, String) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext.to_lowercase()),
        None => (filename, String::new()),
    }
}

/// Binds a [`MediaService`] to a target folder and an extension allow-list.
#[derive(Clone)]
pub struct StorageAdapter {
    service: Arc<dyn MediaService>,
    folder: String,
    allowed_extensions: Vec<String>,
}

impl Debug for StorageAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StorageAdapter")
            .field("backend", &self.service.backend_type())
            .field("folder", &self.folder)
            .field("allowed_extensions", &self.allowed_extensions)
            .finish()
    }
}

impl StorageAdapter {
    /// Create an adapter
    ///
    /// Extensions are compared lower-case and without a leading dot.
    pub fn new(
        service: Arc<dyn MediaService>,
        folder: impl Into<String>,
        allowed_extensions: Vec<String>,
    ) -> Self {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            service,
            folder: folder.into(),
            allowed_extensions,
        }
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Validate a filename against the allow-list and return its extension
    pub fn check_extension(&self, filename: &str) -> Result<String, UploadError> {
        let (_, extension) = split_filename(filename);

        if extension.is_empty() || !self.allowed_extensions.contains(&extension) {
            return Err(UploadError::InvalidExtension {
                filename: filename.to_string(),
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Store one file in the adapter's folder
    pub async fn store(&self, file: FileUpload) -> Result<UploadedFile, UploadError> {
        self.check_extension(&file.filename)?;

        let size = file.data.len();
        let request = UploadRequest {
            folder: self.folder.clone(),
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            allowed_formats: self.allowed_extensions.clone(),
            data: file.data,
        };

        let stored = self.service.upload(request).await.map_err(|e| {
            tracing::warn!(
                error = %e,
                folder = %self.folder,
                filename = %file.filename,
                size_bytes = size,
                "Storing upload failed"
            );
            UploadError::from(e)
        })?;

        Ok(UploadedFile {
            field_name: file.field_name,
            original_filename: file.filename,
            content_type: file.content_type,
            public_id: stored.public_id,
            folder: stored.folder,
            format: stored.format,
            size_bytes: stored.bytes,
            url: stored.url,
            secure_url: stored.secure_url,
            width: stored.width,
            height: stored.height,
            version: stored.version,
        })
    }
}
