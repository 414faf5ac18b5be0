use crate::booter::Booter;
use crate::core::config::{FrontendConfig, ServiceConfig};
use crate::core::lifecycle::LandmarkerLifecycle;
use crate::frontend::frontend_router;
use crate::server::router::landmark_router;
use crate::server::types::AppState;
use tracing_subscriber::EnvFilter;

pub mod booter;
pub mod core;
pub mod frontend;
pub mod server;
pub mod utils;

async fn run_landmark_service() -> Result<(), anyhow::Error> {
    let config = ServiceConfig::from_env()?;

    // the model has to be ready before the port is bound
    let lifecycle = LandmarkerLifecycle::start(&config.model).await?;
    let state = AppState {
        landmarker: lifecycle.landmarker(),
    };
    let router = landmark_router(state, config.request_body_limit);

    let booter = Booter::new(config.port).await?;
    tracing::info!("Landmark service listening on {}", booter.addr);
    tracing::info!("  GET  /              - Service status");
    tracing::info!("  POST /get-landmarks - Fingertip landmarks (multipart field `file`)");

    let served = booter.start(router).await;
    lifecycle.shutdown();
    served
}

async fn run_frontend() -> Result<(), anyhow::Error> {
    let config = FrontendConfig::from_env()?;
    let router = frontend_router(&config);

    let booter = Booter::new(config.port).await?;
    tracing::info!(
        "Front-end listening on {}, landmark service at {}",
        booter.addr,
        config.landmark_service_url
    );
    booter.start(router).await
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => run_landmark_service().await,
        Some("frontend") => run_frontend().await,
        Some(other) => anyhow::bail!("unknown command '{}', expected `serve` or `frontend`", other),
    }
}
