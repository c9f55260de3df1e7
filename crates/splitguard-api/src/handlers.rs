//! REST API handlers.
//!
//! Member routes answer with the `{success, data, error}` envelope; the
//! topology route answers in the bare format peers parse.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use splitguard_cluster::{ClusterError, MemberStatus};
use splitguard_core::{NodeId, TopologyNode, TopologyResponse};

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

// ── Topology ───────────────────────────────────────────────────

#[derive(serde::Deserialize)]
pub struct TopologyQuery {
    pub cmd: Option<String>,
}

/// GET /ignite?cmd=top
pub async fn topology(
    State(state): State<ApiState>,
    Query(query): Query<TopologyQuery>,
) -> impl IntoResponse {
    if query.cmd.as_deref() != Some("top") {
        return error_response("unsupported command", StatusCode::BAD_REQUEST).into_response();
    }
    if state.cluster.is_stopped() {
        return error_response("cluster stopped", StatusCode::SERVICE_UNAVAILABLE).into_response();
    }

    let response: Vec<TopologyNode> = state
        .cluster
        .list_members()
        .into_iter()
        .filter(|m| m.status == MemberStatus::Ready)
        .map(|m| TopologyNode {
            node_id: m.node_id,
            address: Some(m.address),
        })
        .collect();

    debug!(nodes = response.len(), "topology served");
    Json(TopologyResponse { response }).into_response()
}

/// GET /healthz
pub async fn healthz(State(state): State<ApiState>) -> impl IntoResponse {
    if state.cluster.is_stopped() {
        (StatusCode::SERVICE_UNAVAILABLE, "stopped")
    } else {
        (StatusCode::OK, "ok")
    }
}

// ── Members ────────────────────────────────────────────────────

/// GET /api/v1/members
pub async fn list_members(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.cluster.list_members())
}

/// Join request body.
#[derive(serde::Deserialize)]
pub struct JoinRequest {
    pub address: String,
    pub node_id: Option<NodeId>,
}

/// POST /api/v1/members
pub async fn join_member(
    State(state): State<ApiState>,
    Json(req): Json<JoinRequest>,
) -> impl IntoResponse {
    match state.cluster.join(req.node_id, &req.address) {
        Ok(node_id) => match state.cluster.get_member(&node_id) {
            Some(member) => (StatusCode::CREATED, ApiResponse::ok(member)).into_response(),
            None => error_response("member left during join", StatusCode::CONFLICT).into_response(),
        },
        Err(e @ ClusterError::Stopped) => {
            error_response(&e.to_string(), StatusCode::CONFLICT).into_response()
        }
        Err(e @ ClusterError::InvalidNodeId(_)) => {
            error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response()
        }
    }
}

/// POST /api/v1/members/:id/heartbeat
pub async fn heartbeat_member(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.cluster.heartbeat(&NodeId::new(id)) {
        ApiResponse::ok("acknowledged").into_response()
    } else {
        error_response("member not found", StatusCode::NOT_FOUND).into_response()
    }
}

/// DELETE /api/v1/members/:id
pub async fn leave_member(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    if state.cluster.leave(&NodeId::new(id)) {
        ApiResponse::ok("removed").into_response()
    } else {
        error_response("member not found", StatusCode::NOT_FOUND).into_response()
    }
}
