//! The seam between the check and the cluster it protects.

use crate::types::MembershipView;

/// Handle to the local cluster instance.
///
/// The host process owns the cluster; the check only borrows this
/// handle to read who is alive and, when it loses a partition, to stop
/// the local nodes. Implementations must be cheap to call and must not
/// block on the network.
pub trait ClusterHandle: Send + Sync {
    /// Node ids the local cluster currently sees as alive.
    fn current_members(&self) -> MembershipView;

    /// Stop every node of the local cluster instance.
    fn stop_nodes(&self);
}
