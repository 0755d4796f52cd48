//! Reflection: distils user feedback on a piece of advice into a stored lesson.
//!
//! A reflection record always exists after this runs: when the model call fails
//! the raw feedback is stored instead of a distilled lesson.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask};
use crate::memory::MemoryStore;
use crate::mentor::prompts::{REFLECTION_PROMPT_TEMPLATE, REFLECTION_SYSTEM};
use crate::models::memory::{MemoryMetadata, ReflectionOutcome};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectRequest {
    pub message: String,
    pub previous_advice: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReflectionResult {
    pub success: bool,
    pub reflection: String,
}

pub fn fallback_lesson(feedback: &str) -> String {
    format!("User reported dissatisfaction: {feedback}")
}

pub async fn reflect(
    store: &dyn MemoryStore,
    llm: &dyn ChatModel,
    user_id: Uuid,
    feedback: &str,
    previous_advice: &str,
) -> Result<ReflectionResult, AppError> {
    ensure_configured(llm).map_err(|e| AppError::llm("Reflection", e))?;

    let messages = [
        ChatMessage::system(REFLECTION_SYSTEM),
        ChatMessage::user(
            REFLECTION_PROMPT_TEMPLATE
                .replace("{previous_advice}", previous_advice)
                .replace("{feedback}", feedback),
        ),
    ];

    let lesson = match llm.complete(LlmTask::Chat, &messages).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Reflection LLM call failed for user {user_id}, storing raw feedback: {e}");
            fallback_lesson(feedback)
        }
    };

    // Outcome is always recorded as a failure, whatever the feedback's tone.
    store
        .store(
            user_id,
            &lesson,
            MemoryMetadata::Reflection {
                outcome: ReflectionOutcome::Failure,
                source_feedback: Some(feedback.to_string()),
            },
        )
        .await?;

    info!("Reflection stored for user {user_id}");

    Ok(ReflectionResult {
        success: true,
        reflection: lesson,
    })
}
