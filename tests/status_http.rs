use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tower::util::ServiceExt;

use drowsiness_monitor::monitor::StatusSnapshot;
use drowsiness_monitor::routes::build_router;
use drowsiness_monitor::state::AppState;

fn test_app() -> (Router, watch::Sender<StatusSnapshot>) {
    let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());
    let (shutdown_tx, _) = broadcast::channel(2);
    let app = build_router(AppState::new(status_rx, shutdown_tx));
    (app, status_tx)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("request");
    let resp = app.clone().oneshot(req).await.expect("oneshot response");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.expect("body");
    let json = if bytes.is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, json)
}

#[tokio::test]
async fn it_liveness_returns_ok() {
    let (app, _tx) = test_app();
    let (status, _) = get_json(&app, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn it_status_starts_awake_with_zero_events() {
    let (app, _tx) = test_app();
    let (status, body) = get_json(&app, "/api/status").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isDrowsy"], false);
    assert_eq!(body["events"], 0);
    assert!(body["uptimeSecs"].is_u64());
}

#[tokio::test]
async fn it_status_tracks_published_snapshots() {
    let (app, tx) = test_app();

    tx.send(StatusSnapshot {
        is_drowsy: true,
        drowsy_events: 7,
    })
    .unwrap();

    let (status, body) = get_json(&app, "/api/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isDrowsy"], true);
    assert_eq!(body["events"], 7);
}

#[tokio::test]
async fn it_unknown_route_is_404() {
    let (app, _tx) = test_app();
    let (status, _) = get_json(&app, "/api/frames").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
