use crate::core::fingertips::extract_fingertips;
use crate::core::landmarker::HandLandmarker;
use crate::server::error::ApiError;
use crate::server::types::{AppState, LandmarksResponse};
use anyhow::anyhow;
use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use bytes::Bytes;
use serde_json::{Value, json};
use std::sync::Arc;

pub const UPLOAD_FIELD: &str = "file";

// server status handler
pub async fn server_status_handler() -> Json<Value> {
    Json(json!({"status": "running"}))
}

// fingertip landmarks of every hand in the uploaded image
pub async fn get_landmarks_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<LandmarksResponse>, ApiError> {
    let start_time = std::time::Instant::now();
    let upload = read_upload(&mut multipart?).await?;
    tracing::debug!("received {} byte upload", upload.len());

    let landmarker = state.landmarker.clone();
    let response =
        tokio::task::spawn_blocking(move || locate_fingertips(landmarker.as_ref(), &upload))
            .await
            .map_err(|e| anyhow!("landmark extraction task failed: {}", e))??;

    tracing::debug!(
        "found {} hand(s) in {}x{} image in {:?}",
        response.hands.len(),
        response.width,
        response.height,
        start_time.elapsed()
    );
    Ok(Json(response))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            // plain form values carry no filename
            if field.file_name().is_none() {
                return Err(ApiError::NotAFile);
            }
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::MissingFile)
}

/// Decodes `upload`, runs the detector once and denormalizes the fingertips.
pub fn locate_fingertips(
    landmarker: &dyn HandLandmarker,
    upload: &[u8],
) -> Result<LandmarksResponse, ApiError> {
    let image = image::load_from_memory(upload)
        .map_err(|e| {
            tracing::debug!("image decoding failed: {}", e);
            ApiError::InvalidImage
        })?
        .to_rgb8();
    let (width, height) = image.dimensions();

    let hands = landmarker.detect(&image)?;

    Ok(LandmarksResponse {
        hands: extract_fingertips(&hands, width, height),
        width,
        height,
    })
}
