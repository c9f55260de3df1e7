//! Daemon mode — serves the topology API and guards the local cluster.
//!
//! In this mode, the daemon:
//! 1. Registers this node in the local cluster registry
//! 2. Keeps its own heartbeat fresh and reaps silent members
//! 3. Runs the split-brain check on the configured interval
//! 4. Serves the REST API (including the topology endpoint peers query)
//! 5. Exits on Ctrl-C, or once the check has stopped the local nodes

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use splitguard_check::{CheckRunner, SplitBrainCheck};
use splitguard_cluster::LocalCluster;
use splitguard_core::{NodeId, SplitGuardConfig};

/// Run the daemon until shutdown.
pub async fn run_daemon(config: SplitGuardConfig) -> anyhow::Result<()> {
    info!("SplitGuard daemon starting");

    // ── Local cluster ────────────────────────────────────────────
    let cluster = Arc::new(LocalCluster::new().with_dead_timeout(config.dead_timeout()));
    let node_id = cluster.join(
        config.node.node_id.clone().map(NodeId::new),
        &config.node.listen,
    )?;
    info!(%node_id, listen = %config.node.listen, "local node registered");

    if config.check_server().is_none() {
        warn!("no check server configured, every check cycle will abort");
    }

    // ── Shutdown signal ──────────────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let keepalive_shutdown = shutdown_rx.clone();
    let runner_shutdown = shutdown_rx.clone();

    // ── Keepalive + dead node reaper ─────────────────────────────
    let keepalive_cluster = Arc::clone(&cluster);
    let keepalive_period = keepalive_period(config.dead_timeout());
    let keepalive_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(keepalive_period);
        let mut shutdown = keepalive_shutdown;
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    keepalive_cluster.heartbeat(&node_id);
                    let reaped = keepalive_cluster.reap_dead_nodes();
                    if !reaped.is_empty() {
                        info!(count = reaped.len(), "reaped dead nodes");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
    });

    // ── Split-brain checker ──────────────────────────────────────
    let check = SplitBrainCheck::new(&config, cluster.clone());
    let runner = CheckRunner::new(check, config.interval());
    let runner_handle = tokio::spawn(async move { runner.run(runner_shutdown).await });

    // ── REST API server ──────────────────────────────────────────
    let router = splitguard_api::build_router(Arc::clone(&cluster));
    let listener = tokio::net::TcpListener::bind(&config.node.listen).await?;
    info!(addr = %listener.local_addr()?, "API server starting");

    let mut stopped = cluster.subscribe_stopped();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!(error = %e, "failed to listen for CTRL+C");
                }
                info!("shutdown signal received");
            }
            _ = stopped.wait_for(|stopped| *stopped) => {
                warn!("local nodes stopped by split-brain check");
            }
        }
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    // Wait for background tasks.
    let _ = keepalive_handle.await;
    match runner_handle.await {
        Ok(exit) => info!(?exit, "split-brain checker finished"),
        Err(e) => error!(error = %e, "split-brain checker task failed"),
    }

    if cluster.is_stopped() {
        warn!("SplitGuard daemon stopped after losing a partition");
    } else {
        info!("SplitGuard daemon stopped");
    }
    Ok(())
}

/// Heartbeat often enough that the local node never looks dead.
fn keepalive_period(dead_timeout: Duration) -> Duration {
    (dead_timeout / 3).max(Duration::from_millis(100))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keepalive_is_a_third_of_dead_timeout() {
        assert_eq!(keepalive_period(Duration::from_secs(30)), Duration::from_secs(10));
    }

    #[test]
    fn keepalive_has_a_floor() {
        assert_eq!(
            keepalive_period(Duration::from_millis(90)),
            Duration::from_millis(100)
        );
    }
}
