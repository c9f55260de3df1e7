//! Shutdown executor — the only side effect a check can have.

use std::sync::Arc;

use tracing::warn;

use splitguard_core::ClusterHandle;

/// Issues the stop command against the local cluster instance.
#[derive(Clone)]
pub struct ShutdownExecutor {
    cluster: Arc<dyn ClusterHandle>,
}

impl ShutdownExecutor {
    pub fn new(cluster: Arc<dyn ClusterHandle>) -> Self {
        Self { cluster }
    }

    /// Stop the local nodes. Fire-and-forget: the host is expected to
    /// terminate as a consequence.
    pub fn shutdown(&self) {
        warn!("stopping local cluster nodes");
        self.cluster.stop_nodes();
    }
}
