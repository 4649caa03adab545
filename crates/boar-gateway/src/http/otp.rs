//! OTP identity linking — POST /api/v1/otp/{link,verify,unlink}

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use boar_auth::{AuthError, VerifyOutcome};
use boar_core::BoarError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::app::AppState;

#[derive(Deserialize)]
pub struct LinkRequest {
    pub external_id: String,
    pub work_email: String,
}

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub external_id: String,
    pub code: String,
}

#[derive(Deserialize)]
pub struct UnlinkRequest {
    pub external_id: String,
}

#[derive(Serialize)]
pub(crate) struct ApiError {
    error: String,
}

pub async fn link_handler(State(state): State<Arc<AppState>>, Json(req): Json<LinkRequest>) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let outcome = state.auth.link_start(&req.external_id, &req.work_email).await.map_err(map_err)?;
    Ok(Json(json!({
        "email_sent": outcome.email_sent,
        "demo_code": outcome.demo_code,
    })))
}

pub async fn verify_handler(State(state): State<Arc<AppState>>, Json(req): Json<VerifyRequest>) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    let outcome = state.auth.verify(&req.external_id, &req.code).await.map_err(map_err)?;
    let body = match outcome {
        VerifyOutcome::Bound { employee_id } => json!({ "status": "bound", "employee_id": employee_id }),
        VerifyOutcome::Invalid { attempts_remaining } => json!({ "status": "invalid", "attempts_remaining": attempts_remaining }),
        VerifyOutcome::Expired => json!({ "status": "expired" }),
    };
    Ok(Json(body))
}

/// Also clears conversation memory for this identity: the model's history
/// otherwise keeps referencing an employee the identity no longer resolves
/// to.
pub async fn unlink_handler(State(state): State<Arc<AppState>>, Json(req): Json<UnlinkRequest>) -> Result<Json<Value>, (StatusCode, Json<ApiError>)> {
    state.auth.unlink(&req.external_id).await.map_err(map_err)?;
    state.orchestrator.memory().clear(&req.external_id);
    Ok(Json(json!({ "status": "unlinked" })))
}

fn map_err(e: AuthError) -> (StatusCode, Json<ApiError>) {
    let boar_err: BoarError = e.into();
    let status = StatusCode::from_u16(boar_err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError { error: boar_err.to_string() }))
}
