//! Configuration module
//!
//! This module provides the media service credentials and the settings of the
//! upload pipeline: backend selection, size limits, the extension allow-list
//! and the default target folder.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::storage_types::MediaBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_FILES_PER_REQUEST: usize = 10;
const UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Base URL of the hosted image service's REST API
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Folder used when a caller does not name one
pub const DEFAULT_FOLDER: &str = "uploads";

/// Image extensions accepted unless configured otherwise
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

/// Account credentials for the media-hosting service.
///
/// Supplied once and never mutated; every request made by the owning client
/// is signed with them.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub service_account_name: String,
    pub access_key: String,
    pub access_secret: String,
}

impl Credentials {
    pub fn new(
        service_account_name: impl Into<String>,
        access_key: impl Into<String>,
        access_secret: impl Into<String>,
    ) -> Self {
        Self {
            service_account_name: service_account_name.into(),
            access_key: access_key.into(),
            access_secret: access_secret.into(),
        }
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Credentials")
            .field("service_account_name", &self.service_account_name)
            .field("access_key", &self.access_key)
            .field("access_secret", &"[redacted]")
            .finish()
    }
}

/// Upload pipeline configuration.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub server_port: u16,
    pub environment: String,
    pub media_backend: MediaBackend,
    pub credentials: Option<Credentials>,
    pub api_base_url: String,
    pub upload_timeout_secs: u64,
    pub max_file_size_bytes: usize,
    pub max_files_per_request: usize,
    pub allowed_extensions: Vec<String>,
    pub upload_folder: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            media_backend: MediaBackend::Cloudinary,
            credentials: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            upload_folder: DEFAULT_FOLDER.to_string(),
        }
    }
}

impl UploadConfig {
    /// Load configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or(defaults.environment);

        let server_port = match get("PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => defaults.server_port,
        };

        let media_backend = match get("MEDIA_BACKEND") {
            Some(backend) => backend.parse()?,
            None => defaults.media_backend,
        };

        let credentials = match (
            get("MEDIA_CLOUD_NAME"),
            get("MEDIA_API_KEY"),
            get("MEDIA_API_SECRET"),
        ) {
            (Some(name), Some(key), Some(secret)) => Some(Credentials::new(name, key, secret)),
            (None, None, None) => None,
            _ => {
                return Err(anyhow::anyhow!(
                    "MEDIA_CLOUD_NAME, MEDIA_API_KEY and MEDIA_API_SECRET must be set together"
                ))
            }
        };

        let max_file_size_bytes = get("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB)
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"))?;

        let allowed_extensions = get("ALLOWED_EXTENSIONS")
            .map(|s| {
                s.split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_extensions);

        let config = UploadConfig {
            server_port,
            environment,
            media_backend,
            credentials,
            api_base_url: get("MEDIA_API_BASE_URL").unwrap_or(defaults.api_base_url),
            upload_timeout_secs: get("MEDIA_UPLOAD_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(UPLOAD_TIMEOUT_SECS),
            max_file_size_bytes,
            max_files_per_request: get("MAX_FILES_PER_REQUEST")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILES_PER_REQUEST),
            allowed_extensions,
            upload_folder: get("UPLOAD_FOLDER").unwrap_or(defaults.upload_folder),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.media_backend == MediaBackend::Cloudinary && self.credentials.is_none() {
            return Err(anyhow::anyhow!(
                "MEDIA_CLOUD_NAME, MEDIA_API_KEY and MEDIA_API_SECRET must be set when using the cloudinary backend"
            ));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "MEDIA_API_BASE_URL must be an http(s) URL"
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }

        if self.max_files_per_request == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_REQUEST must be greater than 0"
            ));
        }

        if self.upload_folder.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_FOLDER must not be empty"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
