use crate::adapter::split_filename;
use crate::traits::{MediaService, StorageError, StorageResult, StoredMedia, UploadRequest};
use crate::MediaBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Public id stem for files named only by their extension
const UNNAMED_STEM: &str = "file";

/// An upload accepted by [`MemoryMediaService`]
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub public_id: String,
    pub folder: String,
    pub filename: String,
    pub content_type: String,
    pub allowed_formats: Vec<String>,
    pub data: Bytes,
}

/// In-memory media service
///
/// Keeps every uploaded file in process memory and hands out deterministic URLs
/// under `base_url`. Clones share the same recorded uploads.
///
/// Nothing is ever evicted: memory grows with every byte uploaded for the
/// lifetime of the process. Meant for tests and local development only, never
/// for a long-running server.
#[derive(Clone)]
pub struct MemoryMediaService {
    uploads: Arc<Mutex<Vec<RecordedUpload>>>,
    unavailable: Arc<AtomicBool>,
    base_url: String,
}

impl MemoryMediaService {
    pub fn new() -> Self {
        Self::with_base_url("memory://media")
    }

    /// Create a service that reports URLs below `base_url`
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            unavailable: Arc::new(AtomicBool::new(false)),
            base_url: base_url.into(),
        }
    }

    /// Make subsequent uploads fail as if the service could not be reached
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Uploads accepted so far, oldest first
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.lock().clone()
    }

    pub fn upload_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedUpload>> {
        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn generate_url(&self, public_id: &str, format: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if format.is_empty() {
            format!("{}/{}", base, public_id)
        } else {
            format!("{}/{}.{}", base, public_id, format)
        }
    }
}

impl Default for MemoryMediaService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaService for MemoryMediaService {
    async fn upload(&self, request: UploadRequest) -> StorageResult<StoredMedia> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory media service marked unavailable".to_string(),
            ));
        }

        let (stem, format) = split_filename(&request.filename);
        let stem = if stem.is_empty() { UNNAMED_STEM } else { stem };
        if !request.allowed_formats.is_empty() && !request.allowed_formats.contains(&format) {
            return Err(StorageError::UploadFailed(format!(
                "Image file format {} not allowed",
                format
            )));
        }

        let mut uploads = self.lock();
        let public_id = format!("{}/{}_{}", request.folder, stem, uploads.len() + 1);
        let url = self.generate_url(&public_id, &format);
        let size = request.data.len() as u64;

        uploads.push(RecordedUpload {
            public_id: public_id.clone(),
            folder: request.folder.clone(),
            filename: request.filename.clone(),
            content_type: request.content_type.clone(),
            allowed_formats: request.allowed_formats.clone(),
            data: request.data,
        });

        tracing::debug!(
            public_id = %public_id,
            folder = %request.folder,
            size_bytes = size,
            "Memory media service stored upload"
        );

        Ok(StoredMedia {
            public_id,
            folder: request.folder,
            format,
            bytes: size,
            secure_url: url.clone(),
            url,
            width: None,
            height: None,
            version: None,
        })
    }

    fn backend_type(&self) -> MediaBackend {
        MediaBackend::Memory
    }
}
