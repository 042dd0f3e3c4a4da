//! Test helpers: build the router on top of an in-memory media service.
//!
//! Run from workspace root: `cargo test -p mediashim-api --test upload_test`.

pub mod fixtures;

use axum_test::TestServer;
use mediashim_api::constants;
use mediashim_api::setup::routes;
use mediashim_api::AppState;
use mediashim_core::{MediaBackend, UploadConfig};
use mediashim_storage::MemoryMediaService;
use std::sync::Arc;

/// API path prefix for tests (e.g. `/api/v0`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the media service it uploads to.
pub struct TestApp {
    pub server: TestServer,
    pub media: MemoryMediaService,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn media(&self) -> &MemoryMediaService {
        &self.media
    }
}

pub fn test_config() -> UploadConfig {
    UploadConfig {
        media_backend: MediaBackend::Memory,
        ..UploadConfig::default()
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config())
}

pub fn setup_test_app_with(config: UploadConfig) -> TestApp {
    let media = MemoryMediaService::new();
    let state = Arc::new(AppState::new(config, Arc::new(media.clone())));
    let router = routes::setup_routes(state);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp { server, media }
}
