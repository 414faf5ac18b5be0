use crate::core::fingertips::Fingertip;
use crate::core::landmarker::HandLandmarker;
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub landmarker: Arc<dyn HandLandmarker>,
}

// Response structure
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct LandmarksResponse {
    pub hands: Vec<Vec<Fingertip>>,
    pub width: u32,
    pub height: u32,
}

/// Body of 4xx responses.
#[derive(Serialize, Debug, Clone)]
pub struct ErrorDetail {
    pub detail: String,
}

/// Body of 500 responses.
#[derive(Serialize, Debug, Clone)]
pub struct ErrorMessage {
    pub error: String,
}
