//! Route configuration and setup

use crate::constants::{API_PREFIX, AVATAR_FOLDER, HTTP_CONCURRENCY_LIMIT};
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use mediashim_upload::{upload_files, DEFAULT_SINGLE_FIELD};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Router {
    let avatar_middleware = state
        .avatar_uploader
        .single_field(DEFAULT_SINGLE_FIELD, AVATAR_FOLDER);
    let gallery_middleware = state
        .gallery_uploader
        .array()
        .max_count(state.config.max_files_per_request);

    let max_request_size = avatar_middleware
        .engine()
        .limits()
        .max_request_size()
        .max(gallery_middleware.engine().limits().max_request_size());

    let avatar_routes = Router::new()
        .route("/avatars", post(handlers::uploads::upload_avatar))
        .route_layer(from_fn_with_state(avatar_middleware, upload_files));

    let gallery_routes = Router::new()
        .route("/gallery", post(handlers::uploads::upload_gallery))
        .route_layer(from_fn_with_state(gallery_middleware, upload_files));

    tracing::info!(
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        max_request_size,
        "Routes configured"
    );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest(API_PREFIX, avatar_routes.merge(gallery_routes))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(
            usize::try_from(max_request_size).unwrap_or(usize::MAX),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
