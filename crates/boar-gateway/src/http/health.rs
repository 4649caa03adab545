use std::sync::Arc;

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health — liveness probe, no auth. Reports configuration state
/// rather than live ERP/LLM connectivity, so a transient ERP outage doesn't
/// flip the process unhealthy.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "git_sha": env!("BOAR_GIT_SHA"),
        "llm_configured": state.config.llm.is_configured(),
        "scheduled_jobs": state.scheduler.list().await.len(),
    }))
}

/// GET / — version banner, no auth.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "name": "boar-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "git_sha": env!("BOAR_GIT_SHA"),
    }))
}
