use crate::server::handlers::{get_landmarks_handler, server_status_handler};
use crate::server::types::AppState;
use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::get, routing::post};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;

/// Any origin may call the service with credentials, so origin, method and headers are echoed
/// back instead of answered with `*`.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub fn landmark_router(state: AppState, request_body_limit: usize) -> Router {
    Router::new()
        .route("/", get(server_status_handler))
        .route("/get-landmarks", post(get_landmarks_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(request_body_limit))
        .layer(cors_layer())
        .with_state(Arc::new(state))
}
