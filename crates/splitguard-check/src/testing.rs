//! Shared fixtures for the check tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;

use splitguard_core::{
    ClusterHandle, MembershipView, NodeId, SplitGuardConfig, TopologyNode, TopologyResponse,
};

pub fn view(ids: &[&str]) -> MembershipView {
    ids.iter().copied().collect()
}

/// Cluster handle with a fixed membership that counts stop commands.
pub struct FakeCluster {
    members: MembershipView,
    stops: AtomicUsize,
    reads: AtomicUsize,
}

impl FakeCluster {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            members: view(ids),
            stops: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn member_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ClusterHandle for FakeCluster {
    fn current_members(&self) -> MembershipView {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.members.clone()
    }

    fn stop_nodes(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn config_for(server: Option<&str>, preferred_zone: Option<bool>) -> SplitGuardConfig {
    let mut config = SplitGuardConfig::default();
    config.check.server = server.map(str::to_string);
    config.check.preferred_zone = preferred_zone;
    config.check.interval = "20ms".to_string();
    config
}

pub fn topology_body(ids: &[&str]) -> String {
    let body = TopologyResponse {
        response: ids
            .iter()
            .map(|id| TopologyNode {
                node_id: NodeId::from(*id),
                address: None,
            })
            .collect(),
    };
    serde_json::to_string(&body).unwrap()
}

pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr.to_string()
}

/// Start a peer that answers every topology query with `ids`.
pub async fn serve_topology(status: StatusCode, ids: &[&str]) -> String {
    let body = topology_body(ids);
    let router = Router::new().route(
        "/ignite",
        get(move || {
            let body = body.clone();
            async move { (status, body) }
        }),
    );
    serve(router).await
}
