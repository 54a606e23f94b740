//! Chat and conversation history HTTP handlers.
//!
//! Endpoints:
//! - POST /chat                        - Run one turn
//! - GET  /conversation/{session_id}   - Full stored log for a session

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use twinchat_types::chat::Turn;

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Existing session to continue; absent or empty starts a new one.
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub session_id: String,
    pub messages: Vec<Turn>,
}

/// POST /chat - Run one chat turn.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(body) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let outcome = state
        .chat_service
        .handle_turn(body.session_id.as_deref(), &body.message)
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.reply,
        session_id: outcome.session_id.to_string(),
    }))
}

/// GET /conversation/{session_id} - Stored log, empty for unknown sessions.
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ConversationResponse>, AppError> {
    let messages = state.chat_service.history(&session_id).await?;
    Ok(Json(ConversationResponse {
        session_id,
        messages,
    }))
}
