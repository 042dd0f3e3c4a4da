//! Uploader factory
//!
//! Owns the media service client and hands out upload middleware. The storage
//! adapter and the engine wrapping it are created on first use and then shared
//! by every middleware the factory returns.

use crate::engine::{UploadEngine, UploadLimits};
use crate::middleware::{UploadMiddleware, UploadMode};
use mediashim_core::{
    Credentials, UploadConfig, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_FOLDER,
};
use mediashim_storage::{
    create_media_service, CloudinaryService, MediaService, StorageAdapter, StorageResult,
};
use std::sync::{Arc, OnceLock};

/// Field read by [`UploaderFactory::single`]
pub const DEFAULT_SINGLE_FIELD: &str = "image";
/// Field read by [`UploaderFactory::array`]
pub const DEFAULT_ARRAY_FIELD: &str = "images";

pub struct UploaderFactory {
    service: Arc<dyn MediaService>,
    allowed_extensions: Vec<String>,
    limits: UploadLimits,
    default_folder: String,
    engine: OnceLock<Arc<UploadEngine>>,
}

impl std::fmt::Debug for UploaderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploaderFactory")
            .field("backend", &self.service.backend_type())
            .field("allowed_extensions", &self.allowed_extensions)
            .field("limits", &self.limits)
            .field("default_folder", &self.default_folder)
            .field("engine", &self.engine.get())
            .finish()
    }
}

impl UploaderFactory {
    /// Create a factory uploading to the hosted media service
    ///
    /// The client is owned by this factory; other factories keep their own
    /// credentials. Nothing is sent to the service until the first upload.
    pub fn new(credentials: Credentials) -> StorageResult<Self> {
        let service = CloudinaryService::new(credentials)?;
        Ok(Self::with_service(Arc::new(service)))
    }

    /// Create a factory from application configuration
    ///
    /// Uses the configured backend, allow-list, limits and default folder.
    pub fn from_config(config: &UploadConfig) -> StorageResult<Self> {
        let service = create_media_service(config)?;
        Ok(Self::with_service(service)
            .allowed_extensions(config.allowed_extensions.iter().cloned())
            .limits(UploadLimits::from_config(config))
            .default_folder(config.upload_folder.clone()))
    }

    /// Create a factory on top of any media service
    pub fn with_service(service: Arc<dyn MediaService>) -> Self {
        Self {
            service,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            limits: UploadLimits::default(),
            default_folder: DEFAULT_FOLDER.to_string(),
            engine: OnceLock::new(),
        }
    }

    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Folder used by [`single`](Self::single) and [`array`](Self::array)
    pub fn default_folder(mut self, folder: impl Into<String>) -> Self {
        self.default_folder = folder.into();
        self
    }

    pub fn service(&self) -> &Arc<dyn MediaService> {
        &self.service
    }

    /// The shared engine, once any middleware has been requested
    pub fn engine(&self) -> Option<&Arc<UploadEngine>> {
        self.engine.get()
    }

    /// Build the adapter and engine on first call
    ///
    /// The first folder requested sticks for the lifetime of the factory.
    fn ensure_initialized(&self, folder_name: &str) -> Arc<UploadEngine> {
        let engine = self.engine.get_or_init(|| {
            tracing::debug!(
                folder = %folder_name,
                backend = %self.service.backend_type(),
                allowed_extensions = %self.allowed_extensions.join(","),
                "Initializing upload engine"
            );
            let adapter = StorageAdapter::new(
                Arc::clone(&self.service),
                folder_name,
                self.allowed_extensions.clone(),
            );
            Arc::new(UploadEngine::new(adapter, self.limits))
        });

        if engine.adapter().folder() != folder_name {
            tracing::warn!(
                requested_folder = %folder_name,
                folder = %engine.adapter().folder(),
                "Upload engine already initialized; requested folder ignored"
            );
        }

        Arc::clone(engine)
    }

    /// Middleware accepting one file on `image` into the default folder
    pub fn single(&self) -> UploadMiddleware {
        let folder = self.default_folder.clone();
        self.single_field(DEFAULT_SINGLE_FIELD, &folder)
    }

    /// Middleware accepting one file on `field_name`
    pub fn single_field(&self, field_name: &str, folder_name: &str) -> UploadMiddleware {
        let engine = self.ensure_initialized(folder_name);
        UploadMiddleware::new(engine, field_name, UploadMode::Single)
    }

    /// Middleware accepting any number of files on `images` into the default folder
    pub fn array(&self) -> UploadMiddleware {
        let folder = self.default_folder.clone();
        self.array_field(DEFAULT_ARRAY_FIELD, &folder)
    }

    /// Middleware accepting any number of files on `field_name`
    ///
    /// Cap the count with [`UploadMiddleware::max_count`].
    pub fn array_field(&self, field_name: &str, folder_name: &str) -> UploadMiddleware {
        let engine = self.ensure_initialized(folder_name);
        UploadMiddleware::new(engine, field_name, UploadMode::Array { max_count: None })
    }
}
