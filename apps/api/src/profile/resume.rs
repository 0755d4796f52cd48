//! Resume parsing: raw text (or text pulled from an uploaded PDF) in, a flat
//! JSON object of candidate fields out.
//!
//! A reply the model wraps in prose is still accepted: the object is cut from
//! the first `{` to the last `}`. When nothing parses, the raw reply is returned
//! under `extractedText` rather than failing the request.

use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::extract::brace_span;
use crate::llm_client::prompts::JSON_ONLY_REMINDER;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmError, LlmTask};
use crate::models::resume::ResumeRow;
use crate::profile::prompts::RESUME_PARSE_PROMPT;

pub const MIN_RESUME_CHARS: usize = 10;
pub const PARSE_ERROR_MESSAGE: &str = "Could not parse AI response as JSON";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResumeRequest {
    #[serde(default)]
    pub resume_text: String,
}

pub fn validate_resume_text(text: &str) -> Result<(), AppError> {
    if text.trim().chars().count() < MIN_RESUME_CHARS {
        return Err(AppError::Validation(
            "Valid resume text is required".to_string(),
        ));
    }
    Ok(())
}

/// Turns the model's reply into a JSON object, falling back to the raw text.
pub fn interpret_reply(reply: &str) -> Map<String, Value> {
    let candidate = brace_span(reply).unwrap_or(reply);
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            warn!("Resume reply is not a JSON object, returning raw text");
            let mut fields = Map::new();
            fields.insert("extractedText".into(), json!(reply));
            fields.insert("parseError".into(), json!(PARSE_ERROR_MESSAGE));
            fields
        }
    }
}

pub async fn parse_resume(
    llm: &dyn ChatModel,
    resume_text: &str,
) -> Result<Map<String, Value>, AppError> {
    validate_resume_text(resume_text)?;
    ensure_configured(llm).map_err(|e| AppError::llm("Resume parsing", e))?;

    debug!("Parsing resume text ({} chars)", resume_text.len());
    let prompt = RESUME_PARSE_PROMPT
        .replace("{resume_text}", resume_text)
        .replace("{json_only}", JSON_ONLY_REMINDER);

    let reply = match llm
        .complete(LlmTask::Planning, &[ChatMessage::user(prompt)])
        .await
    {
        Ok(reply) => reply,
        Err(LlmError::EmptyContent) => {
            return Err(AppError::UnprocessableEntity("Empty AI response".to_string()))
        }
        Err(e) => return Err(AppError::llm("Failed to parse resume", e)),
    };

    Ok(interpret_reply(&reply))
}

pub async fn persist_resume(
    db: &PgPool,
    user_id: Uuid,
    data: &Map<String, Value>,
    raw_text: &str,
) -> Result<ResumeRow, sqlx::Error> {
    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (user_id, data, raw_text)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, data, raw_text, created_at
        "#,
    )
    .bind(user_id)
    .bind(sqlx::types::Json(data))
    .bind(raw_text)
    .fetch_one(db)
    .await?;

    info!("Stored resume {} for user {user_id}", row.id);
    Ok(row)
}

/// Pulls plain text out of an uploaded PDF. CPU-bound, so it runs off the async executor.
pub async fn extract_pdf_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
        .map_err(|e| {
            warn!("PDF extraction failed: {e}");
            AppError::UnprocessableEntity("Could not read text from the uploaded PDF".to_string())
        })?;
    Ok(text)
}

/// Decides how to read an upload: PDFs go through the extractor, anything else must be UTF-8 text.
pub fn is_pdf(file_name: Option<&str>, content_type: Option<&str>, bytes: &[u8]) -> bool {
    content_type == Some("application/pdf")
        || file_name.is_some_and(|n| n.to_lowercase().ends_with(".pdf"))
        || bytes.starts_with(b"%PDF")
}
