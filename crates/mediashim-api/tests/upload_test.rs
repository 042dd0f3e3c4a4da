//! Upload API integration tests.
//!
//! Run with: `cargo test -p mediashim-api --test upload_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_minimal_png, gif_part, png_part};
use helpers::{api_path, setup_test_app, setup_test_app_with, test_config};
use mediashim_core::UploadConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_health() {
    let app = setup_test_app();

    let response = app.client().get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}

#[tokio::test]
async fn test_upload_avatar() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("caption", "profile picture")
        .add_part("image", png_part("me.png"));
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["field_name"], "image");
    assert_eq!(body["original_filename"], "me.png");
    assert_eq!(body["folder"], "avatars");
    assert_eq!(body["format"], "png");
    assert_eq!(body["size_bytes"], create_minimal_png().len() as u64);

    let uploads = app.media().uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].folder, "avatars");
    assert_eq!(uploads[0].filename, "me.png");
    assert_eq!(uploads[0].data.as_ref(), create_minimal_png().as_slice());
}

#[tokio::test]
async fn test_upload_avatar_rejects_gif() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part("image", gif_part("cat.gif"));
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_EXTENSION");
    assert!(body["error"].as_str().unwrap().contains("jpg, png, jpeg"));
    assert_eq!(app.media().upload_count(), 0);
}

#[tokio::test]
async fn test_upload_avatar_unexpected_field() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_part("avatar", png_part("me.png"));
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNEXPECTED_FIELD");
    assert_eq!(app.media().upload_count(), 0);
}

#[tokio::test]
async fn test_upload_avatar_without_file() {
    let app = setup_test_app();

    let form = MultipartForm::new().add_text("caption", "forgot the file");
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_FILE");
}

#[tokio::test]
async fn test_upload_avatar_too_large() {
    let app = setup_test_app_with(UploadConfig {
        max_file_size_bytes: 16,
        ..test_config()
    });

    let form = MultipartForm::new().add_part("image", png_part("me.png"));
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.media().upload_count(), 0);
}

#[tokio::test]
async fn test_upload_body_over_request_limit() {
    let app = setup_test_app_with(UploadConfig {
        max_file_size_bytes: 16,
        max_files_per_request: 1,
        ..test_config()
    });

    let big = Part::bytes(vec![0u8; 2 * 1024 * 1024])
        .file_name("big.png")
        .mime_type("image/png");
    let form = MultipartForm::new().add_part("image", big);
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(app.media().upload_count(), 0);
}

#[tokio::test]
async fn test_upload_requires_multipart() {
    let app = setup_test_app();

    let response = app
        .client()
        .post(&api_path("/avatars"))
        .json(&json!({ "image": "me.png" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_MULTIPART");
}

#[tokio::test]
async fn test_upload_service_unavailable() {
    let app = setup_test_app();
    app.media().set_unavailable(true);

    let form = MultipartForm::new().add_part("image", png_part("me.png"));
    let response = app.client().post(&api_path("/avatars")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "UPLOAD_SERVICE_UNAVAILABLE");
    assert_eq!(body["recoverable"], true);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_upload_gallery() {
    let app = setup_test_app();

    let form = MultipartForm::new()
        .add_text("album", "holiday")
        .add_part("images", png_part("one.png"))
        .add_part("images", png_part("two.png"));
    let response = app.client().post(&api_path("/gallery")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["original_filename"], "one.png");
    assert_eq!(files[1]["original_filename"], "two.png");
    assert_eq!(body["fields"]["album"], "holiday");

    let uploads = app.media().uploads();
    assert_eq!(uploads.len(), 2);
    assert!(uploads.iter().all(|u| u.folder == "uploads"));
}

#[tokio::test]
async fn test_upload_gallery_too_many_files() {
    let app = setup_test_app_with(UploadConfig {
        max_files_per_request: 1,
        ..test_config()
    });

    let form = MultipartForm::new()
        .add_part("images", png_part("one.png"))
        .add_part("images", png_part("two.png"));
    let response = app.client().post(&api_path("/gallery")).multipart(form).await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNEXPECTED_FIELD");
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/health")
        .add_header("X-Request-ID", "req-123")
        .await;
    assert_eq!(response.header("x-request-id"), "req-123");

    let response = app.client().get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
