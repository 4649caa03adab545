//! Agent Surface — POST /api/v1/chat
//!
//! One external identity talks to the bounded tool-calling loop. An
//! identity doesn't need to be linked yet: the tool roster includes
//! `link_identity`, so an unlinked caller can still start a conversation
//! and be walked through onboarding by the model itself. A linked identity
//! gets its `employee_id` resolved and injected as default tool context.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use boar_core::LinkState;
use serde::{Deserialize, Serialize};

use crate::app::{AppState, AGENT_SYSTEM_PROMPT};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub external_id: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Serialize)]
pub struct ChatError {
    pub error: String,
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, (StatusCode, Json<ChatError>)> {
    if req.message.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, Json(ChatError { error: "message cannot be empty".to_string() })));
    }

    let link_state = state.auth.state(&req.external_id).await.map_err(internal_error)?;
    let employee_id = match link_state {
        LinkState::Bound => state.auth.resolve(&req.external_id).await.map_err(internal_error)?,
        _ => None,
    };

    let context = match employee_id {
        Some(id) => serde_json::json!({ "employee_id": id }),
        None => serde_json::json!({}),
    };

    let reply = state
        .orchestrator
        .tool_call(&req.external_id, &req.message, &state.tools, &context, AGENT_SYSTEM_PROMPT)
        .await
        .map_err(internal_error)?;

    Ok(Json(ChatReply { reply }))
}

fn internal_error(e: impl std::fmt::Display) -> (StatusCode, Json<ChatError>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ChatError { error: e.to_string() }))
}
