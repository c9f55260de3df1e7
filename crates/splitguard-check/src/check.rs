//! One split-brain check cycle.
//!
//! ```text
//! Start → Fetching → Classifying → Deciding → Acting | Idle → Done
//!            │
//!            └── fetch or config failure → Done (aborted, logged)
//! ```
//!
//! Each cycle is a function of the two snapshots and the static
//! configuration; nothing is carried over between cycles.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use splitguard_core::{
    Classification, ClusterHandle, MembershipView, RemediationDecision, SplitGuardConfig,
};

use crate::classifier::classify;
use crate::error::{CheckError, CheckResult};
use crate::executor::ShutdownExecutor;
use crate::fetcher::RemoteViewFetcher;
use crate::policy::decide;

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The cycle stopped before classification; nothing was changed.
    Aborted(CheckError),
    /// The remote view is contained in the local one.
    InSync,
    /// Partial disagreement, left alone until the next cycle.
    Overlapping,
    /// Disjoint views, but the local side keeps running.
    Survived,
    /// Disjoint views and the local nodes were told to stop.
    ShutdownIssued,
}

impl CheckOutcome {
    /// Whether the local nodes have been stopped by this cycle.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::ShutdownIssued)
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aborted(e) => write!(f, "aborted: {e}"),
            Self::InSync => write!(f, "in sync"),
            Self::Overlapping => write!(f, "overlapping, no action"),
            Self::Survived => write!(f, "partitioned, local side survives"),
            Self::ShutdownIssued => write!(f, "partitioned, local nodes stopped"),
        }
    }
}

/// Classify and decide for a pair of snapshots.
pub fn evaluate(
    local: &MembershipView,
    remote: &MembershipView,
    preferred_zone: Option<bool>,
) -> (Classification, RemediationDecision) {
    let classification = classify(local, remote);
    let decision = decide(classification, local.len(), remote.len(), preferred_zone);
    (classification, decision)
}

/// The split-brain check, wired to a cluster handle and a peer.
pub struct SplitBrainCheck {
    cluster: Arc<dyn ClusterHandle>,
    executor: ShutdownExecutor,
    fetcher: RemoteViewFetcher,
    check_server: Option<String>,
    preferred_zone: Option<bool>,
}

impl SplitBrainCheck {
    pub fn new(config: &SplitGuardConfig, cluster: Arc<dyn ClusterHandle>) -> Self {
        Self {
            executor: ShutdownExecutor::new(Arc::clone(&cluster)),
            cluster,
            fetcher: RemoteViewFetcher::new(config.check.query_path.clone(), config.timeout()),
            check_server: config.check_server().map(str::to_string),
            preferred_zone: config.check.preferred_zone,
        }
    }

    /// Run one cycle. Never fails: every error becomes `Aborted`.
    pub async fn run_once(&self) -> CheckOutcome {
        info!(
            check_server = self.check_server.as_deref().unwrap_or("<unset>"),
            "split-brain check started"
        );

        let outcome = match self.try_run().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "split-brain check aborted");
                CheckOutcome::Aborted(e)
            }
        };

        debug!(?outcome, "split-brain check done");
        outcome
    }

    async fn try_run(&self) -> CheckResult<CheckOutcome> {
        let check_server = self.check_server.as_deref().ok_or_else(|| {
            CheckError::Configuration("no check server configured".to_string())
        })?;

        let remote = self.fetcher.fetch(check_server).await?;
        let local = self.cluster.current_members();

        let (classification, decision) = evaluate(&local, &remote, self.preferred_zone);
        let (local_size, remote_size) = (local.len(), remote.len());

        let outcome = match classification {
            Classification::InSync => {
                info!(local = local_size, remote = remote_size, "cluster OK");
                CheckOutcome::InSync
            }
            Classification::Overlapping => {
                info!(
                    local = local_size,
                    remote = remote_size,
                    shared = local.intersection_len(&remote),
                    "views overlap partially, waiting for reconciliation"
                );
                CheckOutcome::Overlapping
            }
            Classification::Disjoint if decision.should_shutdown => {
                info!(
                    local = local_size,
                    remote = remote_size,
                    preferred_zone = ?self.preferred_zone,
                    "partition detected, local side yields"
                );
                self.executor.shutdown();
                CheckOutcome::ShutdownIssued
            }
            Classification::Disjoint => {
                info!(
                    local = local_size,
                    remote = remote_size,
                    preferred_zone = ?self.preferred_zone,
                    "partition detected, local side survives"
                );
                CheckOutcome::Survived
            }
        };

        Ok(outcome)
    }
}
