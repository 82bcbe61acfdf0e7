//! Server setup and lifecycle management

use std::sync::Arc;
use tokio::net::TcpListener;

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::exporter::Exporter;

/// metricgen server
pub struct Server {
    config: Config,
    exporter: Arc<Exporter>,
}

impl Server {
    /// Create a new server with the given configuration.
    ///
    /// Builds the exporter eagerly so any configuration problem fails
    /// startup here, before the listener is bound.
    pub fn new(config: Config) -> DaemonResult<Self> {
        let exporter = Arc::new(Exporter::from_config(&config)?);
        Ok(Self { config, exporter })
    }

    /// The exporter driving this server
    pub fn exporter(&self) -> &Arc<Exporter> {
        &self.exporter
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;

        let state = AppState::new(self.exporter.clone());
        let app = create_router(state, self.config.server.enable_cors);

        let listener = TcpListener::bind(addr).await?;

        tracing::info!(%addr, namespace = self.exporter.namespace(), "metricgen listening");

        // Begin periodic updates; the group loops run until the
        // process exits
        self.exporter.start();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| DaemonError::Server(err.to_string()))?;

        tracing::info!("metricgen shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
