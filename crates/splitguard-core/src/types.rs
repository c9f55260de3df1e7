//! Membership data model shared by the check, the cluster registry and the API.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque cluster-assigned node identifier.
///
/// Only equality is meaningful; two ids are the same node if their
/// string forms match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The set of nodes one vantage point currently considers alive.
///
/// Views are snapshots taken for a single check and never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipView {
    nodes: HashSet<NodeId>,
}

impl MembershipView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct nodes in the view.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether every node in `self` also appears in `other`.
    pub fn is_subset_of(&self, other: &MembershipView) -> bool {
        self.nodes.is_subset(&other.nodes)
    }

    /// Number of nodes present in both views.
    pub fn intersection_len(&self, other: &MembershipView) -> usize {
        self.nodes.intersection(&other.nodes).count()
    }

    /// Whether the two views share no node at all.
    pub fn is_disjoint(&self, other: &MembershipView) -> bool {
        self.nodes.is_disjoint(&other.nodes)
    }
}

impl<T: Into<NodeId>> FromIterator<T> for MembershipView {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Body served by a peer's topology endpoint.
///
/// ```json
/// {"response": [{"nodeId": "node-a1"}, {"nodeId": "node-a2"}]}
/// ```
///
/// Unknown fields on either level are ignored when parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyResponse {
    pub response: Vec<TopologyNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl TopologyResponse {
    /// Collapse the node list into a membership view.
    pub fn into_view(self) -> MembershipView {
        self.response.into_iter().map(|n| n.node_id).collect()
    }
}

/// How the remote view relates to the local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Every remote node is also known locally.
    InSync,
    /// No node appears in both views.
    Disjoint,
    /// Partial agreement, treated as a transient reconciliation window.
    Overlapping,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InSync => write!(f, "in_sync"),
            Self::Disjoint => write!(f, "disjoint"),
            Self::Overlapping => write!(f, "overlapping"),
        }
    }
}

/// Whether the local side must stop its nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemediationDecision {
    pub should_shutdown: bool,
}

impl RemediationDecision {
    pub fn keep() -> Self {
        Self {
            should_shutdown: false,
        }
    }

    pub fn shutdown() -> Self {
        Self {
            should_shutdown: true,
        }
    }
}
