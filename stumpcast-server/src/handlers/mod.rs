//! HTTP and WebSocket request handlers

pub mod page;
pub mod ws;

use axum::{Json, extract::State};
use serde_json::{Value, json};
use stumpcast_core::ScoreState;

use crate::{errors::AppResult, infra::app_state::AppState};

/// Liveness probe.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connections": state.registry.len(),
    }))
}

/// Current score as JSON.
pub async fn score(State(state): State<AppState>) -> AppResult<Json<ScoreState>> {
    let score = state.store.score().await?;
    Ok(Json(score))
}
