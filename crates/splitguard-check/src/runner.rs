//! Periodic runner for the split-brain check.
//!
//! Checks run inline in a single loop, so a new cycle never starts
//! while the previous one is still waiting on the peer. A slow cycle
//! delays the following tick instead of queueing a burst.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use splitguard_core::config::MAX_DURATION;

use crate::check::SplitBrainCheck;

/// Why the runner loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerExit {
    /// The host asked the runner to stop.
    ShutdownSignal,
    /// A check stopped the local nodes; there is nothing left to guard.
    NodesStopped,
}

/// Drives a `SplitBrainCheck` on a fixed interval.
pub struct CheckRunner {
    check: SplitBrainCheck,
    interval: Duration,
}

impl CheckRunner {
    /// Intervals above `MAX_DURATION` are clamped to it.
    pub fn new(check: SplitBrainCheck, interval: Duration) -> Self {
        Self {
            check,
            interval: interval.min(MAX_DURATION),
        }
    }

    /// Run checks until `shutdown` flips or a check stops the local nodes.
    ///
    /// The first check runs one interval after start.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunnerExit {
        info!(interval = ?self.interval, "split-brain checker started");

        let now = Instant::now();
        let start = now.checked_add(self.interval).unwrap_or(now);
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.check.run_once().await;
                    if outcome.is_final() {
                        warn!("local nodes stopped, split-brain checker exiting");
                        return RunnerExit::NodesStopped;
                    }
                }
                _ = shutdown.changed() => {
                    debug!("split-brain checker shutting down");
                    return RunnerExit::ShutdownSignal;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;

    use crate::testing::{config_for, serve, serve_topology, topology_body, FakeCluster};

    fn runner(addr: Option<&str>, cluster: Arc<FakeCluster>, preferred: Option<bool>) -> CheckRunner {
        let config = config_for(addr, preferred);
        CheckRunner::new(SplitBrainCheck::new(&config, cluster), config.interval())
    }

    #[tokio::test]
    async fn runner_exits_after_stopping_nodes() {
        let addr = serve_topology(StatusCode::OK, &["c", "d", "e"]).await;
        let cluster = Arc::new(FakeCluster::new(&["a"]));
        let runner = runner(Some(&addr), cluster.clone(), None);

        let (_tx, rx) = watch::channel(false);
        let exit = tokio::time::timeout(Duration::from_secs(5), runner.run(rx))
            .await
            .unwrap();

        assert_eq!(exit, RunnerExit::NodesStopped);
        assert_eq!(cluster.stop_count(), 1);
    }

    #[tokio::test]
    async fn runner_keeps_going_through_failures() {
        let cluster = Arc::new(FakeCluster::new(&["a"]));
        let runner = runner(None, cluster.clone(), Some(false));

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        tx.send(true).unwrap();
        let exit = handle.await.unwrap();
        assert_eq!(exit, RunnerExit::ShutdownSignal);
        assert_eq!(cluster.stop_count(), 0);
    }

    #[tokio::test]
    async fn checks_never_overlap_with_slow_peer() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(AtomicUsize::new(0));

        let (inf, max, reqs) = (in_flight.clone(), max_in_flight.clone(), requests.clone());
        let router = Router::new().route(
            "/ignite",
            get(move || {
                let (inf, max, reqs) = (inf.clone(), max.clone(), reqs.clone());
                async move {
                    let now = inf.fetch_add(1, Ordering::SeqCst) + 1;
                    max.fetch_max(now, Ordering::SeqCst);
                    reqs.fetch_add(1, Ordering::SeqCst);
                    // Several intervals long.
                    tokio::time::sleep(Duration::from_millis(80)).await;
                    inf.fetch_sub(1, Ordering::SeqCst);
                    topology_body(&["a"])
                }
            }),
        );
        let addr = serve(router).await;

        let cluster = Arc::new(FakeCluster::new(&["a", "b"]));
        let runner = runner(Some(&addr), cluster.clone(), None);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        assert!(requests.load(Ordering::SeqCst) >= 2);
        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(cluster.stop_count(), 0);
    }

    #[tokio::test]
    async fn huge_interval_is_clamped_and_does_not_panic() {
        let cluster = Arc::new(FakeCluster::new(&["a"]));
        let config = config_for(None, None);
        let runner = CheckRunner::new(
            SplitBrainCheck::new(&config, cluster.clone()),
            Duration::from_secs(u64::MAX),
        );
        assert_eq!(runner.interval, MAX_DURATION);

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { runner.run(rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        assert_eq!(handle.await.unwrap(), RunnerExit::ShutdownSignal);
        assert_eq!(cluster.member_reads(), 0);
    }
}
