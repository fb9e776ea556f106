//! HTTP routes for the gateway

pub mod events;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;

use crate::server::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events/{hook}", post(events::handle_events))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": naskh_core::VERSION,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}
