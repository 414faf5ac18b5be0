use anyhow::Error;
use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub struct Booter {
    pub addr: SocketAddr,
    tcp_listener: TcpListener,
}

impl Booter {
    pub async fn new(port: u16) -> Result<Self, Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let tcp_listener = TcpListener::bind(addr).await?;

        Ok(Self {
            addr: tcp_listener.local_addr()?,
            tcp_listener,
        })
    }

    /// Serves `router` until Ctrl-C or SIGTERM, then drains in-flight requests.
    pub async fn start(self, router: Router) -> Result<(), Error> {
        axum::serve(self.tcp_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod booter_tests {
    use crate::booter::Booter;
    use axum::{Router, routing::get};

    #[tokio::test]
    async fn test_serves_router_on_ephemeral_port() {
        let booter = Booter::new(0).await.unwrap();
        let port = booter.addr.port();
        assert_ne!(port, 0);

        let router = Router::new().route("/", get(|| async { "up" }));
        let server = tokio::spawn(booter.start(router));

        let body = reqwest::get(format!("http://127.0.0.1:{}/", port))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "up");
        server.abort();
    }
}
