//! Signed upload client for a Cloudinary-style image hosting API.
//!
//! Each `CloudinaryService` owns its HTTP client and its credentials, so several
//! services bound to different accounts can live in one process.

use crate::traits::{MediaService, StorageError, StorageResult, StoredMedia, UploadRequest};
use crate::MediaBackend;
use async_trait::async_trait;
use mediashim_core::config::DEFAULT_API_BASE_URL;
use mediashim_core::Credentials;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Cloudinary-style media service
#[derive(Clone)]
pub struct CloudinaryService {
    http_client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

impl Debug for CloudinaryService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryService")
            .field("credentials", &self.credentials)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    #[serde(default)]
    version: Option<u64>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    bytes: u64,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    url: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryService {
    /// Create a service talking to the public API endpoint
    pub fn new(credentials: Credentials) -> StorageResult<Self> {
        Self::with_options(
            credentials,
            DEFAULT_API_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a service with an explicit API base URL and request timeout
    ///
    /// # Arguments
    /// * `credentials` - Account the uploads are signed for
    /// * `base_url` - API root, e.g. "https://api.cloudinary.com/v1_1"
    /// * `timeout` - Per-request timeout of the owned HTTP client
    pub fn with_options(
        credentials: Credentials,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                StorageError::ConfigError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            credentials,
            base_url: base_url.into(),
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/{}/image/upload",
            self.base_url.trim_end_matches('/'),
            self.credentials.service_account_name
        )
    }

    /// Sign request parameters.
    ///
    /// Parameters are sorted by name, joined as `name=value` pairs with `&`,
    /// suffixed with the API secret and hashed with SHA-256. Empty values are
    /// left out of the signature.
    pub(crate) fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
        let to_sign = params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(api_secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn map_send_error(err: reqwest::Error) -> StorageError {
        if err.is_timeout() || err.is_connect() {
            StorageError::Unavailable(err.to_string())
        } else {
            StorageError::UploadFailed(err.to_string())
        }
    }

    async fn error_message(response: reqwest::Response) -> String {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text)
    }
}

#[async_trait]
impl MediaService for CloudinaryService {
    async fn upload(&self, request: UploadRequest) -> StorageResult<StoredMedia> {
        let timestamp = chrono::Utc::now().timestamp().to_string();

        let mut signed = BTreeMap::new();
        signed.insert("timestamp", timestamp);
        signed.insert("folder", request.folder.clone());
        signed.insert("allowed_formats", request.allowed_formats.join(","));
        let signature = Self::sign(&signed, &self.credentials.access_secret);

        let file_part = Part::bytes(request.data.to_vec())
            .file_name(request.filename.clone())
            .mime_str(&request.content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let mut form = Form::new()
            .text("api_key", self.credentials.access_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (name, value) in signed {
            if !value.is_empty() {
                form = form.text(name, value);
            }
        }
        let form = form.part("file", file_part);

        let size = request.data.len();
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    folder = %request.folder,
                    filename = %request.filename,
                    "Media service request failed"
                );
                Self::map_send_error(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::warn!(
                status = %status,
                folder = %request.folder,
                filename = %request.filename,
                message = %message,
                "Media service rejected upload"
            );
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    StorageError::Unauthorized(message)
                }
                s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
                    StorageError::Unavailable(format!("{} - {}", s, message))
                }
                _ => StorageError::UploadFailed(message),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| StorageError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            public_id = %body.public_id,
            folder = %request.folder,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Media service upload successful"
        );

        let format = body.format.unwrap_or_else(|| {
            request
                .filename
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_lowercase())
                .unwrap_or_default()
        });

        Ok(StoredMedia {
            public_id: body.public_id,
            folder: request.folder,
            format,
            bytes: body.bytes,
            url: body.url,
            secure_url: body.secure_url,
            width: body.width,
            height: body.height,
            version: body.version,
        })
    }

    fn backend_type(&self) -> MediaBackend {
        MediaBackend::Cloudinary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockito::Matcher;

    fn credentials(key: &str) -> Credentials {
        Credentials::new("demo", key, "secret")
    }

    fn png_request(folder: &str) -> UploadRequest {
        UploadRequest {
            folder: folder.to_string(),
            filename: "avatar.png".to_string(),
            content_type: "image/png".to_string(),
            allowed_formats: vec!["jpg".to_string(), "png".to_string(), "jpeg".to_string()],
            data: Bytes::from_static(b"\x89PNG fake"),
        }
    }

    fn service(base_url: &str, key: &str) -> CloudinaryService {
        CloudinaryService::with_options(credentials(key), base_url, Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_sign_sorts_parameters_and_appends_secret() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1700000000".to_string());
        params.insert("folder", "avatars".to_string());
        params.insert("allowed_formats", "jpg,png,jpeg".to_string());

        assert_eq!(
            CloudinaryService::sign(&params, "secret"),
            "5ecee49b970236f2263e139ed09c29431261baea2c96243dd91600d3c694b8c1"
        );
    }

    #[test]
    fn test_sign_skips_empty_values() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("folder", "uploads".to_string());
        params.insert("allowed_formats", String::new());

        assert_eq!(
            CloudinaryService::sign(&params, "abcd"),
            "b9297e4037f54259fa0597f46aca5cffffa25283a0e2e98d68dfeb24df4467ba"
        );
    }

    #[test]
    fn test_upload_url_uses_account_name() {
        let service = service("https://api.example.com/v1_1/", "key");
        assert_eq!(
            service.upload_url(),
            "https://api.example.com/v1_1/demo/image/upload"
        );
    }

    #[tokio::test]
    async fn test_upload_sends_signed_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/demo/image/upload")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="api_key"\s+key-a"#.into()),
                Matcher::Regex(r#"name="folder"\s+avatars"#.into()),
                Matcher::Regex(r#"name="signature_algorithm"\s+sha256"#.into()),
                Matcher::Regex(r#"filename="avatar.png""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "public_id": "avatars/abc123",
                    "version": 1700000001,
                    "format": "png",
                    "bytes": 9,
                    "width": 1,
                    "height": 1,
                    "url": "http://res.example.com/demo/image/upload/avatars/abc123.png",
                    "secure_url": "https://res.example.com/demo/image/upload/avatars/abc123.png"
                }"#,
            )
            .create_async()
            .await;

        let stored = service(&server.url(), "key-a")
            .upload(png_request("avatars"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(stored.public_id, "avatars/abc123");
        assert_eq!(stored.folder, "avatars");
        assert_eq!(stored.format, "png");
        assert_eq!(stored.width, Some(1));
        assert_eq!(stored.version, Some(1700000001));
    }

    #[tokio::test]
    async fn test_upload_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(401)
            .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
            .create_async()
            .await;

        let result = service(&server.url(), "key").upload(png_request("uploads")).await;

        match result {
            Err(StorageError::Unauthorized(message)) => assert_eq!(message, "Invalid Signature"),
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_rejected_by_service() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(400)
            .with_body(r#"{"error":{"message":"Image file format gif not allowed"}}"#)
            .create_async()
            .await;

        let result = service(&server.url(), "key").upload(png_request("uploads")).await;

        assert!(matches!(result, Err(StorageError::UploadFailed(m)) if m.contains("gif")));
    }

    #[tokio::test]
    async fn test_upload_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let result = service(&server.url(), "key").upload(png_request("uploads")).await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_upload_connection_refused_is_unavailable() {
        let result = service("http://127.0.0.1:1", "key")
            .upload(png_request("uploads"))
            .await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_upload_invalid_json_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/demo/image/upload")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = service(&server.url(), "key").upload(png_request("uploads")).await;

        assert!(matches!(result, Err(StorageError::InvalidResponse(_))));
    }

    #[test]
    fn test_debug_hides_secret() {
        let service = service("https://api.example.com/v1_1", "key");
        assert!(!format!("{:?}", service).contains("\"secret\""));
        assert_eq!(service.backend_type(), MediaBackend::Cloudinary);
    }
}
