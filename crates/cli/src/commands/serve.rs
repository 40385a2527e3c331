//! `serve` command implementation.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{info, warn};

use config_loader::ConfigLoader;
use http_api::ContentServer;

use super::{apply_timeout_override, build_service, load_blueprint};
use crate::cli::ServeArgs;
use crate::error::CliError;

/// Execute the `serve` command
pub async fn run_serve(args: &ServeArgs) -> Result<()> {
    let mut blueprint = load_blueprint(args.config.as_deref())?;

    if let Some(ref addr) = args.addr {
        info!(addr = %addr, "Overriding listen address from CLI");
        blueprint.server.listen_addr = addr.clone();
    }
    apply_timeout_override(&mut blueprint, args.timeout_ms)?;
    ConfigLoader::validate(&blueprint).context("Configuration invalid after CLI overrides")?;

    let bind_address: SocketAddr = blueprint
        .server
        .listen_addr
        .parse()
        .map_err(|e| CliError::invalid_override("listen_addr", format!("{e}")))?;

    let service = build_service(&blueprint)?;
    info!(
        slots = blueprint.slots.len(),
        providers = blueprint.providers.len(),
        timeout_ms = blueprint.request.timeout_ms,
        "Configuration loaded"
    );

    let running = ContentServer::new(bind_address, service)
        .start()
        .await
        .context("Failed to start content server")?;

    shutdown_signal().await;
    warn!("Received shutdown signal, draining in-flight requests...");

    running
        .stop(Duration::from_secs(blueprint.server.shutdown_timeout_secs))
        .await?;

    info!("Content mixer finished");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "Failed to install SIGTERM handler");
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
}
