//! API regression tests.
//!
//! Drives the full router in-process: members join and leave through
//! the REST routes and the topology endpoint reflects them in the
//! format peers parse.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use splitguard_api::build_router;
use splitguard_check::fetcher::parse_view;
use splitguard_cluster::LocalCluster;
use splitguard_core::MembershipView;

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

fn join_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/members")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn topology_request() -> Request<Body> {
    Request::builder()
        .uri("/ignite?cmd=top")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn topology_empty_cluster() {
    let router = build_router(Arc::new(LocalCluster::new()));

    let resp = router.oneshot(topology_request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let view = parse_view(&body_bytes(resp).await).unwrap();
    assert!(view.is_empty());
}

#[tokio::test]
async fn joined_members_appear_in_topology() {
    let router = build_router(Arc::new(LocalCluster::new()));

    for body in [
        r#"{"address":"10.0.0.1:8080","node_id":"a"}"#,
        r#"{"address":"10.0.0.2:8080","node_id":"b"}"#,
    ] {
        let resp = router.clone().oneshot(join_request(body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = router.oneshot(topology_request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let view = parse_view(&body_bytes(resp).await).unwrap();
    let expected: MembershipView = ["a", "b"].into_iter().collect();
    assert_eq!(view, expected);
}

#[tokio::test]
async fn topology_uses_camel_case_node_id() {
    let cluster = Arc::new(LocalCluster::new());
    cluster.join(Some("a".into()), "10.0.0.1:8080").unwrap();
    let router = build_router(cluster);

    let resp = router.oneshot(topology_request()).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["response"][0]["nodeId"], "a");
    assert_eq!(json["response"][0]["address"], "10.0.0.1:8080");
}

#[tokio::test]
async fn left_member_drops_out_of_topology() {
    let cluster = Arc::new(LocalCluster::new());
    cluster.join(Some("a".into()), "10.0.0.1:8080").unwrap();
    cluster.join(Some("b".into()), "10.0.0.2:8080").unwrap();
    let router = build_router(cluster);

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/v1/members/b")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router.oneshot(topology_request()).await.unwrap();
    let view = parse_view(&body_bytes(resp).await).unwrap();
    let expected: MembershipView = ["a"].into_iter().collect();
    assert_eq!(view, expected);
}

#[tokio::test]
async fn heartbeat_route() {
    let cluster = Arc::new(LocalCluster::new());
    cluster.join(Some("a".into()), "10.0.0.1:8080").unwrap();
    let router = build_router(cluster);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/members/a/heartbeat")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
        .method("POST")
        .uri("/api/v1/members/ghost/heartbeat")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_members_reports_status() {
    let cluster = Arc::new(LocalCluster::new());
    cluster.join(Some("a".into()), "10.0.0.1:8080").unwrap();
    let router = build_router(cluster);

    let req = Request::builder()
        .uri("/api/v1/members")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"][0]["node_id"], "a");
    assert_eq!(json["data"][0]["status"], "ready");
}

#[tokio::test]
async fn malformed_join_is_rejected() {
    let router = build_router(Arc::new(LocalCluster::new()));
    let resp = router.oneshot(join_request(r#"{"node_id":"a"}"#)).await.unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn stopped_cluster_reports_unavailable() {
    let cluster = Arc::new(LocalCluster::new());
    cluster.join(Some("a".into()), "10.0.0.1:8080").unwrap();
    cluster.stop();
    let router = build_router(cluster);

    let resp = router.clone().oneshot(topology_request()).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}
