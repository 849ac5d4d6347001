//! Chat messages and conversation insight.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use brain_core::Insight;
use database::{ChatMessage, Message};
use serde::Deserialize;

use crate::auth::Caller;
use crate::error::Result;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

pub async fn list(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<ChatMessage>>> {
    Ok(Json(state.chat.list_messages(&principal, &match_id).await?))
}

pub async fn send(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>)> {
    let sent = state
        .chat
        .send_message(&principal, &match_id, &request.content)
        .await?;
    Ok((StatusCode::CREATED, Json(sent)))
}

/// Summarize the conversation; `null` when no insight could be produced.
pub async fn insight(
    State(state): State<AppState>,
    Caller(principal): Caller,
    Path(match_id): Path<String>,
) -> Result<Json<Option<Insight>>> {
    Ok(Json(state.insight.generate(&principal, &match_id).await?))
}
