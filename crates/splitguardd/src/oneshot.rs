//! One-shot check — compare a given local view with the peer once.

use std::sync::Arc;

use anyhow::bail;
use tracing::warn;

use splitguard_check::{CheckOutcome, SplitBrainCheck};
use splitguard_core::{ClusterHandle, MembershipView, SplitGuardConfig};

/// Fixed local view whose stop command is only reported.
struct DryRunCluster {
    members: MembershipView,
}

impl ClusterHandle for DryRunCluster {
    fn current_members(&self) -> MembershipView {
        self.members.clone()
    }

    fn stop_nodes(&self) {
        warn!(members = self.members.len(), "dry run: local nodes would be stopped");
    }
}

/// Run one check cycle and print its outcome.
pub async fn run_check(config: SplitGuardConfig, members: Vec<String>) -> anyhow::Result<()> {
    if config.check_server().is_none() {
        bail!("no check server configured (use --check-server or check.server)");
    }

    let cluster = Arc::new(DryRunCluster {
        members: members.into_iter().collect(),
    });
    let check = SplitBrainCheck::new(&config, cluster);

    match check.run_once().await {
        CheckOutcome::Aborted(e) => bail!("check aborted: {e}"),
        outcome => {
            println!("{outcome}");
            Ok(())
        }
    }
}
