//! splitguard-api — REST API for SplitGuard.
//!
//! Serves the local membership view in the topology format peers query,
//! and lets nodes join, heartbeat and leave the local cluster.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/ignite?cmd=top` | Live membership in topology format |
//! | GET | `/healthz` | Liveness |
//! | GET | `/api/v1/members` | List members with status |
//! | POST | `/api/v1/members` | Join a node |
//! | POST | `/api/v1/members/{id}/heartbeat` | Record a heartbeat |
//! | DELETE | `/api/v1/members/{id}` | Remove a node |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use splitguard_cluster::LocalCluster;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub cluster: Arc<LocalCluster>,
}

/// Build the complete API router.
pub fn build_router(cluster: Arc<LocalCluster>) -> Router {
    let api_state = ApiState { cluster };

    let api_routes = Router::new()
        .route("/members", get(handlers::list_members).post(handlers::join_member))
        .route("/members/{id}", delete(handlers::leave_member))
        .route("/members/{id}/heartbeat", post(handlers::heartbeat_member))
        .with_state(api_state.clone());

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/ignite", get(handlers::topology).with_state(api_state.clone()))
        .route("/healthz", get(handlers::healthz).with_state(api_state))
}
