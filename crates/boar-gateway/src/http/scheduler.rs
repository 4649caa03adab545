//! Scheduler introspection and control — GET/POST /api/v1/scheduler/jobs[...]

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use boar_core::BoarError;
use boar_scheduler::{JobInfo, SchedulerError};
use serde_json::{json, Value};

use crate::app::AppState;

pub async fn list_handler(State(state): State<Arc<AppState>>) -> Json<Vec<JobInfo>> {
    Json(state.scheduler.list().await)
}

pub async fn trigger_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.scheduler.trigger(&id).await.map_err(map_err)?;
    Ok(Json(json!({ "status": "triggered" })))
}

pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.scheduler.pause(&id).await.map_err(map_err)?;
    Ok(Json(json!({ "status": "paused" })))
}

pub async fn resume_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.scheduler.resume(&id).await.map_err(map_err)?;
    Ok(Json(json!({ "status": "resumed" })))
}

fn map_err(e: SchedulerError) -> (StatusCode, Json<Value>) {
    let message = e.to_string();
    let boar_err: BoarError = e.into();
    let status = StatusCode::from_u16(boar_err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": message })))
}
