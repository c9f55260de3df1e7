//! Local cluster registry — tracks node liveness and the stop signal.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use splitguard_core::{ClusterHandle, MembershipView, NodeId};

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("cluster has been stopped")]
    Stopped,

    #[error("invalid node id: {0:?}")]
    InvalidNodeId(String),
}

pub type ClusterResult<T> = Result<T, ClusterError>;

/// Status of a node in the local cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Ready,
    Dead,
    Stopped,
}

/// Snapshot of a cluster member.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub node_id: NodeId,
    pub address: String,
    pub status: MemberStatus,
    pub joined_at: u64,
    pub last_heartbeat: u64,
}

#[derive(Debug)]
struct Entry {
    address: String,
    joined_at: u64,
    last_heartbeat: u64,
    last_seen: Instant,
}

/// In-process membership registry for the local cluster instance.
pub struct LocalCluster {
    members: RwLock<HashMap<NodeId, Entry>>,
    /// Members silent for longer than this are dead.
    dead_timeout: Duration,
    stopped: watch::Sender<bool>,
}

impl Default for LocalCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCluster {
    pub fn new() -> Self {
        let (stopped, _) = watch::channel(false);
        Self {
            members: RwLock::new(HashMap::new()),
            dead_timeout: Duration::from_secs(30),
            stopped,
        }
    }

    /// Set the dead node detection timeout.
    pub fn with_dead_timeout(mut self, timeout: Duration) -> Self {
        self.dead_timeout = timeout;
        self
    }

    /// Register a node, or refresh it if the id is already known.
    ///
    /// A node id is generated when none is given.
    pub fn join(&self, node_id: Option<NodeId>, address: &str) -> ClusterResult<NodeId> {
        if self.is_stopped() {
            return Err(ClusterError::Stopped);
        }

        let node_id = match node_id {
            Some(id) if id.as_str().trim().is_empty() => {
                return Err(ClusterError::InvalidNodeId(id.as_str().to_string()));
            }
            Some(id) => id,
            None => generate_node_id(address),
        };

        let now = epoch_secs();
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let entry = members.entry(node_id.clone()).or_insert_with(|| Entry {
            address: address.to_string(),
            joined_at: now,
            last_heartbeat: now,
            last_seen: Instant::now(),
        });
        entry.address = address.to_string();
        entry.last_heartbeat = now;
        entry.last_seen = Instant::now();

        info!(%node_id, %address, "node joined cluster");
        Ok(node_id)
    }

    /// Record a heartbeat. Returns `false` for unknown nodes or once the
    /// cluster has been stopped.
    pub fn heartbeat(&self, node_id: &NodeId) -> bool {
        if self.is_stopped() {
            return false;
        }

        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        match members.get_mut(node_id) {
            Some(entry) => {
                entry.last_heartbeat = epoch_secs();
                entry.last_seen = Instant::now();
                debug!(%node_id, "heartbeat received");
                true
            }
            None => {
                warn!(%node_id, "heartbeat from unknown node");
                false
            }
        }
    }

    /// Remove a node from the cluster.
    pub fn leave(&self, node_id: &NodeId) -> bool {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let existed = members.remove(node_id).is_some();
        if existed {
            info!(%node_id, "node left cluster");
        }
        existed
    }

    /// All members with their current status, ordered by node id.
    pub fn list_members(&self) -> Vec<Member> {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        let mut list: Vec<Member> = members
            .iter()
            .map(|(id, entry)| self.to_member(id, entry))
            .collect();
        list.sort_by(|a, b| a.node_id.as_str().cmp(b.node_id.as_str()));
        list
    }

    pub fn get_member(&self, node_id: &NodeId) -> Option<Member> {
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        members.get(node_id).map(|entry| self.to_member(node_id, entry))
    }

    /// Remove members that missed their heartbeats.
    ///
    /// Returns the ids of the removed nodes.
    pub fn reap_dead_nodes(&self) -> Vec<NodeId> {
        let mut members = self.members.write().unwrap_or_else(PoisonError::into_inner);
        let dead: Vec<NodeId> = members
            .iter()
            .filter(|(_, entry)| self.is_dead(entry))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &dead {
            members.remove(id);
            warn!(node_id = %id, "reaped dead node");
        }
        dead
    }

    /// Count of ready (alive) members.
    pub fn ready_count(&self) -> usize {
        self.live_view().len()
    }

    /// Node ids currently considered alive.
    pub fn live_view(&self) -> MembershipView {
        if self.is_stopped() {
            return MembershipView::new();
        }
        let members = self.members.read().unwrap_or_else(PoisonError::into_inner);
        members
            .iter()
            .filter(|(_, entry)| !self.is_dead(entry))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Stop every member and fire the stop signal. Later calls are no-ops.
    pub fn stop(&self) {
        let was_stopped = self.stopped.send_replace(true);
        if !was_stopped {
            let count = self
                .members
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .len();
            warn!(members = count, "local cluster stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        *self.stopped.borrow()
    }

    /// Receiver that flips to `true` once the cluster is stopped.
    pub fn subscribe_stopped(&self) -> watch::Receiver<bool> {
        self.stopped.subscribe()
    }

    fn is_dead(&self, entry: &Entry) -> bool {
        entry.last_seen.elapsed() > self.dead_timeout
    }

    fn to_member(&self, node_id: &NodeId, entry: &Entry) -> Member {
        let status = if self.is_stopped() {
            MemberStatus::Stopped
        } else if self.is_dead(entry) {
            MemberStatus::Dead
        } else {
            MemberStatus::Ready
        };

        Member {
            node_id: node_id.clone(),
            address: entry.address.clone(),
            status,
            joined_at: entry.joined_at,
            last_heartbeat: entry.last_heartbeat,
        }
    }
}

impl ClusterHandle for LocalCluster {
    fn current_members(&self) -> MembershipView {
        self.live_view()
    }

    fn stop_nodes(&self) {
        self.stop();
    }
}

/// Generate a node ID from the address and the current time.
fn generate_node_id(address: &str) -> NodeId {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    address.hash(&mut hasher);
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos()
        .hash(&mut hasher);
    NodeId::new(format!("node-{:016x}", hasher.finish()))
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
