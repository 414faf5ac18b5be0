use crate::core::config::ModelConfig;
use crate::core::landmarker::HandLandmarker;
use crate::core::model_store::{ArtifactSource, ensure_artifact};
use crate::core::onnx_landmarker::OnnxHandLandmarker;
use anyhow::{Context, Error};
use reqwest::Client;
use std::sync::Arc;

/// Owns the detector for the lifetime of the service.
///
/// `start` has to finish before the listener is bound; `shutdown` runs after the server has
/// drained.
pub struct LandmarkerLifecycle {
    landmarker: Arc<dyn HandLandmarker>,
}

impl LandmarkerLifecycle {
    pub async fn start(model: &ModelConfig) -> Result<Self, Error> {
        let http_client = Client::new();
        let palm_source = ensure_artifact(&http_client, &model.palm).await?;
        let landmark_source = ensure_artifact(&http_client, &model.landmark).await?;

        let config = model.clone();
        let load_start = std::time::Instant::now();
        let landmarker = tokio::task::spawn_blocking(move || OnnxHandLandmarker::load(&config))
            .await
            .context("model loading task failed")??;

        tracing::info!(
            "Loaded {} from {} ({}) and {} ({}) in {:?}",
            landmarker.name(),
            model.palm.path.display(),
            source_label(palm_source),
            model.landmark.path.display(),
            source_label(landmark_source),
            load_start.elapsed()
        );

        Ok(Self::with_landmarker(Arc::new(landmarker)))
    }

    pub fn with_landmarker(landmarker: Arc<dyn HandLandmarker>) -> Self {
        Self { landmarker }
    }

    pub fn landmarker(&self) -> Arc<dyn HandLandmarker> {
        self.landmarker.clone()
    }

    /// Releases the detector. Returns how many other handles were still alive.
    pub fn shutdown(self) -> usize {
        let outstanding = Arc::strong_count(&self.landmarker) - 1;
        let name = self.landmarker.name().to_string();
        drop(self.landmarker);
        if outstanding == 0 {
            tracing::info!("Released {}", name);
        } else {
            tracing::warn!("Released {} with {} handles still alive", name, outstanding);
        }
        outstanding
    }
}

fn source_label(source: ArtifactSource) -> &'static str {
    match source {
        ArtifactSource::Cached => "cached",
        ArtifactSource::Downloaded => "downloaded",
    }
}
