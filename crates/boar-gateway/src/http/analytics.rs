//! On-demand pipeline runs — GET /api/v1/analytics/{pipeline}
//!
//! Facts are gathered fresh from ERP on every call; nothing here is cached.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::jobs::run_pipeline_by_name;

pub async fn run_handler(State(state): State<Arc<AppState>>, Path(pipeline): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match run_pipeline_by_name(&pipeline, &state.erp, &state.orchestrator).await {
        None => Err((StatusCode::NOT_FOUND, Json(json!({ "error": format!("unknown pipeline '{pipeline}'") })))),
        Some(Ok(report)) => Ok(Json(report)),
        Some(Err(e)) => Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))),
    }
}
