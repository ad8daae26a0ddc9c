//! HTTP server and background schedulers.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::routes;

/// Serve until Ctrl-C.
pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    let addr = ctx.config.server.addr()?;

    let mut background = Vec::new();
    if ctx.config.optimizer.enabled {
        background.push(spawn_optimizer(ctx.clone(), ctx.config.optimizer.interval()));
    }
    if ctx.config.health.enabled {
        background.push(spawn_health_checks(ctx.clone(), ctx.config.health.interval()));
    }

    let app = routes::router(ctx);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "could not listen for shutdown signal");
            }
        })
        .await?;

    for task in background {
        task.abort();
    }
    info!("shut down");
    Ok(())
}

/// Run an optimizer cycle now and then every `every`.
fn spawn_optimizer(ctx: Arc<AppContext>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = every.as_secs(), "optimizer scheduler started");
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let cycle_ctx = ctx.clone();
            match tokio::task::spawn_blocking(move || cycle_ctx.optimizer.run_cycle()).await {
                Ok(summary) => info!(
                    recommendations = summary.recommendations_generated,
                    optimizations = summary.optimizations_applied,
                    skipped = summary.targets_skipped,
                    "scheduled optimizer cycle finished"
                ),
                Err(e) => warn!(error = %e, "scheduled optimizer cycle failed"),
            }
        }
    })
}

/// Probe every provider now and then every `every`.
fn spawn_health_checks(ctx: Arc<AppContext>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_secs = every.as_secs(), "provider health checks started");
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let check_ctx = ctx.clone();
            match tokio::task::spawn_blocking(move || check_ctx.health.run_once()).await {
                Ok(changed) => info!(changed, "provider health check finished"),
                Err(e) => warn!(error = %e, "provider health check failed"),
            }
        }
    })
}
