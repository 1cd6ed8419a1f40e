//! CLI handler for the `serve` subcommand.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::AppConfig;
use crate::poll::run_scheduler;
use crate::server;

/// Run the scheduler and trigger server until Ctrl-C.
pub async fn run_serve(config: AppConfig) -> Result<()> {
    let interval = config.schedule.interval()?;
    let addr = config.server.addr()?;
    let orchestrator = super::build_orchestrator(&config)
        .await
        .context("failed to initialize")?;

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutting down gracefully...");
                    shutdown.cancel();
                }
                Err(e) => tracing::warn!("Cannot listen for Ctrl-C: {e}"),
            }
        });
    }

    let scheduler = tokio::spawn(run_scheduler(
        orchestrator.clone(),
        interval,
        config.schedule.poll_on_start,
        shutdown.clone(),
    ));

    let served = server::serve(orchestrator, addr, shutdown.clone()).await;
    // Stop the scheduler even if the server failed to start.
    shutdown.cancel();

    scheduler.await.context("scheduler task panicked")??;
    served.context("trigger server failed")?;
    Ok(())
}
