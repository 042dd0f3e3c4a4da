#[cfg(feature = "storage-cloudinary")]
use crate::CloudinaryService;
#[cfg(feature = "storage-memory")]
use crate::MemoryMediaService;
use crate::{MediaBackend, MediaService, StorageError, StorageResult};
use mediashim_core::UploadConfig;
use std::sync::Arc;

/// Create a media service based on configuration
pub fn create_media_service(config: &UploadConfig) -> StorageResult<Arc<dyn MediaService>> {
    match config.media_backend {
        #[cfg(feature = "storage-cloudinary")]
        MediaBackend::Cloudinary => {
            let credentials = config.credentials.clone().ok_or_else(|| {
                StorageError::ConfigError(
                    "MEDIA_CLOUD_NAME, MEDIA_API_KEY and MEDIA_API_SECRET not configured"
                        .to_string(),
                )
            })?;

            let service = CloudinaryService::with_options(
                credentials,
                config.api_base_url.clone(),
                config.upload_timeout(),
            )?;
            tracing::info!(
                base_url = %config.api_base_url,
                account = %service.credentials().service_account_name,
                "Using cloudinary media service"
            );
            Ok(Arc::new(service))
        }

        #[cfg(not(feature = "storage-cloudinary"))]
        MediaBackend::Cloudinary => Err(StorageError::ConfigError(
            "Cloudinary backend not available (storage-cloudinary feature not enabled)"
                .to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        MediaBackend::Memory => {
            tracing::warn!(
                "Using in-memory media service; uploads are not persisted and never evicted"
            );
            Ok(Arc::new(MemoryMediaService::new()))
        }

        #[cfg(not(feature = "storage-memory"))]
        MediaBackend::Memory => Err(StorageError::ConfigError(
            "Memory backend not available (storage-memory feature not enabled)".to_string(),
        )),
    }
}
