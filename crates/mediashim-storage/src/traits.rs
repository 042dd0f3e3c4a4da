//! Media service abstraction trait
//!
//! This module defines the `MediaService` trait that every hosting backend
//! must implement, and the error type its operations return.

use crate::MediaBackend;
use async_trait::async_trait;
use bytes::Bytes;
use mediashim_core::UploadError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Media service operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid service response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for media service operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for UploadError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UploadFailed(msg) => UploadError::UploadRejected(msg),
            StorageError::Unauthorized(msg) => UploadError::Unauthorized(msg),
            StorageError::Unavailable(msg) => UploadError::UploadServiceUnavailable(msg),
            StorageError::InvalidResponse(msg) => {
                UploadError::UploadServiceUnavailable(format!("invalid response: {}", msg))
            }
            StorageError::ConfigError(msg) => UploadError::Internal(msg),
        }
    }
}

/// One file to be stored by a media service.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Destination folder on the service
    pub folder: String,
    pub filename: String,
    pub content_type: String,
    /// Formats the service itself should enforce, lower-case, no dot
    pub allowed_formats: Vec<String>,
    pub data: Bytes,
}

/// What the service reports back for a stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub public_id: String,
    pub folder: String,
    pub format: String,
    pub bytes: u64,
    pub url: String,
    pub secure_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub version: Option<u64>,
}

/// Media service capability
///
/// The upload pipeline only ever needs to push a file into a folder; everything
/// else the hosting service offers (transformations, delivery) happens outside
/// this process.
#[async_trait]
pub trait MediaService: Send + Sync {
    /// Store one file and return the service's description of it
    async fn upload(&self, request: UploadRequest) -> StorageResult<StoredMedia>;

    /// Get the backend type
    fn backend_type(&self) -> MediaBackend;
}
