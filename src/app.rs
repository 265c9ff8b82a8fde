use crate::api::{GroupieClient, UpstreamSource};
use crate::config::Config;
use crate::geocode::{CoordinateCache, NominatimClient};
use crate::state::AppState;
use crate::store::DataStore;
use crate::utils::fmt_duration;
use crate::web::create_router;
use anyhow::Context;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Main application struct containing all necessary components
pub struct App {
    config: Config,
    app_state: AppState,
    cancel: CancellationToken,
}

impl App {
    /// Build every component and perform the initial data load. Fails if the
    /// dataset cannot be loaded, so the server never starts without data.
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        let source: Arc<dyn UpstreamSource> = Arc::new(
            GroupieClient::new(config.api_base_url.clone(), config.request_timeout)
                .context("Failed to create API client")?,
        );
        let geocoder = Arc::new(
            NominatimClient::new(
                &config.geocoder_url,
                &config.geocoder_user_agent,
                config.request_timeout,
            )
            .context("Failed to create geocoder client")?,
        );
        let coordinates = Arc::new(CoordinateCache::new(geocoder, config.geocode_interval));

        let cancel = CancellationToken::new();
        let store = Arc::new(DataStore::new(
            source,
            coordinates,
            config.enrichment,
            cancel.clone(),
        ));

        info!(
            api = %config.api_base_url,
            enrichment = ?config.enrichment,
            timeout = fmt_duration(config.request_timeout),
            "Loading artist data"
        );
        // Prefetch runs detached; it stops on the shared cancellation token
        let _prefetch = store
            .initialize()
            .await
            .context("Failed to load artist data")?;

        Ok(App {
            config,
            app_state: AppState::new(store),
            cancel,
        })
    }

    /// Serve until a shutdown signal, then drain within the shutdown timeout.
    pub async fn run(self) -> ExitCode {
        let refresh = self
            .app_state
            .store
            .spawn_refresh_task(self.config.refresh_interval);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port));
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(error = ?e, %addr, "Failed to bind web server");
                self.cancel.cancel();
                return ExitCode::FAILURE;
            }
        };
        info!(%addr, "Web server listening");

        let router = create_router(self.app_state.clone());
        let server_cancel = self.cancel.clone();
        let mut server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { server_cancel.cancelled().await })
                .await
        });

        tokio::select! {
            _ = shutdown_signal() => info!("Shutdown signal received"),
            result = &mut server => {
                error!(result = ?result, "Web server exited unexpectedly");
                self.cancel.cancel();
                return ExitCode::FAILURE;
            }
        }

        self.cancel.cancel();
        let timeout = self.config.shutdown_timeout;
        let drained = tokio::time::timeout(timeout, async {
            if let Err(e) = refresh.await {
                warn!(error = ?e, "Refresh task ended abnormally");
            }
            server.await
        })
        .await;

        match drained {
            Ok(Ok(Ok(()))) => {
                info!("Graceful shutdown complete");
                ExitCode::SUCCESS
            }
            Ok(Ok(Err(e))) => {
                error!(error = ?e, "Web server failed during shutdown");
                ExitCode::FAILURE
            }
            Ok(Err(e)) => {
                error!(error = ?e, "Web server task panicked");
                ExitCode::FAILURE
            }
            Err(_) => {
                warn!(
                    timeout = fmt_duration(timeout),
                    "Shutdown timed out, exiting with requests in flight"
                );
                ExitCode::FAILURE
            }
        }
    }
}

/// Resolves on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = ?e, "Failed to listen for Ctrl+C");
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
                error!(error = ?e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
