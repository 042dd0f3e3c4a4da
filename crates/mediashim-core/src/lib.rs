//! Mediashim Core Library
//!
//! This crate provides the credentials, configuration, error kinds and upload
//! models shared by the storage adapter, the upload middleware and the demo server.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Credentials, UploadConfig, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_FOLDER};
pub use error::{ErrorMetadata, LogLevel, UploadError};
pub use models::{FormFields, UploadedFile, UploadedFiles};
pub use storage_types::MediaBackend;
