//! HTTP server host

use std::net::SocketAddr;
use std::time::Duration;

use aggregator::ContentService;
use anyhow::{anyhow, Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{router, AppState};

/// Host configuration for the content HTTP server
#[derive(Debug, Clone)]
pub struct ContentServer {
    bind_address: SocketAddr,
    service: ContentService,
}

impl ContentServer {
    pub fn new(bind_address: SocketAddr, service: ContentService) -> Self {
        Self {
            bind_address,
            service,
        }
    }

    /// Bind and start serving; returns a handle for inspection and shutdown
    pub async fn start(self) -> Result<RunningContentServer> {
        let shutdown = CancellationToken::new();
        let state = AppState::new(self.service);
        let abort = state.abort.clone();

        let listener = TcpListener::bind(self.bind_address)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_address))?;
        let bound_address = listener.local_addr()?;

        let server_handle = tokio::spawn(serve_state(listener, state, shutdown.child_token()));

        info!(address = %bound_address, "Content server listening");

        Ok(RunningContentServer {
            bind_address: bound_address,
            shutdown,
            abort,
            server_handle,
        })
    }
}

/// Serve `service` on `listener` until `shutdown` fires, then drain
/// in-flight requests
pub async fn serve(
    listener: TcpListener,
    service: ContentService,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    serve_state(listener, AppState::new(service), shutdown).await
}

async fn serve_state(
    listener: TcpListener,
    state: AppState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await
}

/// Runtime handle for a running content server
#[derive(Debug)]
pub struct RunningContentServer {
    bind_address: SocketAddr,
    shutdown: CancellationToken,
    abort: CancellationToken,
    server_handle: JoinHandle<std::io::Result<()>>,
}

impl RunningContentServer {
    pub fn bound_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Stop accepting connections and wait up to `grace` for in-flight
    /// requests; requests still waiting after that are cancelled.
    pub async fn stop(mut self, grace: Duration) -> Result<()> {
        self.shutdown.cancel();

        let joined = match tokio::time::timeout(grace, &mut self.server_handle).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(grace_secs = grace.as_secs_f64(), "Grace period elapsed, cancelling in-flight requests");
                self.abort.cancel();
                self.server_handle.await
            }
        };

        joined
            .map_err(|error| anyhow!("content server task failed: {error}"))?
            .context("content server terminated with an error")?;

        info!(address = %self.bind_address, "Content server stopped");
        Ok(())
    }
}
