//! Mediashim Storage Library
//!
//! This crate binds the upload pipeline to a media-hosting service. It provides the
//! `MediaService` capability trait, a signed REST client for a Cloudinary-style image
//! service, an in-memory service, and the `StorageAdapter` that scopes a service to a
//! target folder and an extension allow-list.
//!
//! # Public ids
//!
//! Every stored file gets a public id of the form `{folder}/{name}`, assigned by the
//! service. The adapter never builds ids itself.

pub mod adapter;
#[cfg(feature = "storage-cloudinary")]
pub mod cloudinary;
pub mod factory;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use adapter::{FileUpload, StorageAdapter};
#[cfg(feature = "storage-cloudinary")]
pub use cloudinary::CloudinaryService;
pub use factory::create_media_service;
pub use mediashim_core::MediaBackend;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryMediaService;
pub use traits::{MediaService, StorageError, StorageResult, StoredMedia, UploadRequest};
