use mediashim_core::UploadConfig;
use mediashim_storage::MediaService;
use mediashim_upload::UploaderFactory;
use std::sync::Arc;

/// Shared application state
///
/// Avatars and gallery uploads go to different folders, so each route group
/// gets its own factory. Both factories share one media service client.
pub struct AppState {
    pub config: UploadConfig,
    pub media_service: Arc<dyn MediaService>,
    pub avatar_uploader: UploaderFactory,
    pub gallery_uploader: UploaderFactory,
}

impl AppState {
    pub fn new(config: UploadConfig, media_service: Arc<dyn MediaService>) -> Self {
        let avatar_uploader = uploader(&config, &media_service);
        let gallery_uploader = uploader(&config, &media_service);

        Self {
            config,
            media_service,
            avatar_uploader,
            gallery_uploader,
        }
    }
}

fn uploader(config: &UploadConfig, service: &Arc<dyn MediaService>) -> UploaderFactory {
    UploaderFactory::with_service(Arc::clone(service))
        .allowed_extensions(config.allowed_extensions.iter().cloned())
        .limits(mediashim_upload::UploadLimits::from_config(config))
        .default_folder(config.upload_folder.clone())
}
