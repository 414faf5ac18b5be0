//! The browser-facing pages. The scan page uploads straight to the landmark service.

use crate::core::config::FrontendConfig;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse};
use axum::{Router, routing::get};
use std::sync::Arc;

const HOME_PAGE: &str = include_str!("../../static/home.html");
const SCAN_PAGE: &str = include_str!("../../static/scan.html");
const SERVICE_URL_PLACEHOLDER: &str = "{{ landmark_service_url }}";

pub struct Pages {
    pub home: String,
    pub scan: String,
}

impl Pages {
    pub fn render(config: &FrontendConfig) -> Self {
        // Url always renders with a trailing slash for bare hosts
        let service_url = config.landmark_service_url.as_str().trim_end_matches('/');
        Self {
            home: HOME_PAGE.to_string(),
            scan: SCAN_PAGE.replace(SERVICE_URL_PLACEHOLDER, service_url),
        }
    }
}

pub async fn home_page(State(pages): State<Arc<Pages>>) -> Html<String> {
    Html(pages.home.clone())
}

pub async fn scan_page(State(pages): State<Arc<Pages>>) -> Html<String> {
    Html(pages.scan.clone())
}

/// `301` to the slash-terminated form of a page route.
fn append_slash(location: &'static str) -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)])
}

pub fn frontend_router(config: &FrontendConfig) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/tracker/", get(home_page))
        .route("/tracker/scan/", get(scan_page))
        .route("/tracker", get(|| async { append_slash("/tracker/") }))
        .route("/tracker/scan", get(|| async { append_slash("/tracker/scan/") }))
        .with_state(Arc::new(Pages::render(config)))
}
