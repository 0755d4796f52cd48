//! Stateless chat passthrough. The client owns the conversation history; the
//! server only prepends the mentor persona. Nothing is read from or written to memory.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::prompts::CHAT_SYSTEM;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask, Role};
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub role: Role,
    pub content: String,
}

pub async fn chat(llm: &dyn ChatModel, history: &[ChatMessage]) -> Result<ChatReply, AppError> {
    if history.is_empty() {
        return Err(AppError::Validation("messages must not be empty".to_string()));
    }
    ensure_configured(llm).map_err(|e| AppError::llm("Chat", e))?;

    // Client-supplied system messages are dropped; the persona is fixed.
    let messages: Vec<ChatMessage> = std::iter::once(ChatMessage::system(CHAT_SYSTEM))
        .chain(history.iter().filter(|m| m.role != Role::System).cloned())
        .collect();

    let content = llm
        .complete(LlmTask::Chat, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to fetch AI response", e))?;

    Ok(ChatReply {
        role: Role::Assistant,
        content,
    })
}

/// POST /api/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, AppError> {
    let reply = chat(state.llm.as_ref(), &req.messages).await?;
    Ok(Json(reply))
}
