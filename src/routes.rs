//! Read-only HTTP status surface. The video feed itself is not served here;
//! this only exposes liveness and the latest alertness snapshot.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health/live", get(liveness))
        .route("/api/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn liveness() -> StatusCode {
    StatusCode::OK
}

async fn status(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let snapshot = state.status();
    Json(serde_json::json!({
        "isDrowsy": snapshot.is_drowsy,
        "events": snapshot.drowsy_events,
        "uptimeSecs": state.uptime_secs(),
    }))
}
