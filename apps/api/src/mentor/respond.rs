//! Mentor response pipeline.
//!
//! Flow: fetch recent memories → format context → store user input →
//!       LLM generate → enforce newest lesson → store advice → return.
//!
//! The input is stored before the LLM call so it is recorded even when
//! generation fails. The two writes are independent inserts.
//!
//! Memory is best-effort: a failed fetch degrades to an empty context and a
//! failed write is logged. Only a failed generation fails the request.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask};
use crate::memory::{format_memories_for_prompt, latest_reflection, MemoryStore};
use crate::mentor::lessons::enforce_lessons;
use crate::mentor::prompts::MENTOR_SYSTEM;
use crate::models::memory::MemoryMetadata;

/// How many recent memories feed the mentor prompt.
pub const MENTOR_MEMORY_LIMIT: usize = 8;
pub const CONVERSATION_CONTEXT: &str = "mentor_conversation";

#[derive(Debug, Clone, Deserialize)]
pub struct RespondRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MentorReply {
    pub response: String,
    pub success: bool,
}

pub async fn respond(
    store: &dyn MemoryStore,
    llm: &dyn ChatModel,
    user_id: Uuid,
    message: &str,
) -> Result<MentorReply, AppError> {
    ensure_configured(llm).map_err(|e| AppError::llm("Mentor response", e))?;

    // Step 1: recent memories, newest first
    let memories = store
        .fetch_recent(user_id, MENTOR_MEMORY_LIMIT)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to fetch memories for user {user_id}, continuing without context: {e}");
            Vec::new()
        });

    // Step 2: prompt context
    let memory_context = format_memories_for_prompt(&memories);
    debug!(
        "Mentor context for user {user_id}: {}",
        memory_context.chars().take(500).collect::<String>()
    );

    // Step 3: record the input before generating
    if let Err(e) = store
        .store(
            user_id,
            message,
            MemoryMetadata::UserInput {
                context: Some(CONVERSATION_CONTEXT.to_string()),
            },
        )
        .await
    {
        warn!("Failed to store user input for user {user_id}: {e}");
    }

    // Step 4 + 5: generate
    let messages = [
        ChatMessage::system(format!("{MENTOR_SYSTEM}\n\n{memory_context}")),
        ChatMessage::user(message),
    ];
    let generated = llm
        .complete(LlmTask::Chat, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to generate mentor response", e))?;

    // Step 6: lesson enforcement against the newest reflection only
    let lesson = latest_reflection(&memories).map(|r| r.content.as_str());
    let enforced = enforce_lessons(generated, lesson);
    if enforced.acknowledged {
        info!("Mentor reply for user {user_id} missing lesson acknowledgment, prepended");
    }
    if let Some(words) = enforced.truncated_from {
        info!("Mentor reply for user {user_id} too long ({words} words), truncated");
    }

    // Step 7: record the advice with the input that produced it
    if let Err(e) = store
        .store(
            user_id,
            &enforced.text,
            MemoryMetadata::MentorAdvice {
                context: Some(CONVERSATION_CONTEXT.to_string()),
                user_input: Some(message.to_string()),
            },
        )
        .await
    {
        warn!("Failed to store mentor advice for user {user_id}: {e}");
    }

    Ok(MentorReply {
        response: enforced.text,
        success: true,
    })
}
