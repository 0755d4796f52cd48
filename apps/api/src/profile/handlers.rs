use axum::{
    extract::{Multipart, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::profile::onboarding::{extract_profile, OnboardingRequest, OnboardingResponse};
use crate::profile::resume::{
    extract_pdf_text, is_pdf, parse_resume, persist_resume, validate_resume_text,
    ParseResumeRequest,
};
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";

/// Parses, then stores for signed-in callers. A failed insert only flips `stored`.
async fn parse_and_store(
    state: &AppState,
    user: Option<AuthUser>,
    resume_text: &str,
) -> Result<Json<Map<String, Value>>, AppError> {
    let mut fields = parse_resume(state.llm.as_ref(), resume_text).await?;

    let stored = match user {
        Some(user) => match persist_resume(&state.db, user.id, &fields, resume_text).await {
            Ok(_) => true,
            Err(e) => {
                warn!("Resume persist failed for user {}: {e}", user.id);
                false
            }
        },
        None => false,
    };

    fields.insert("stored".into(), json!(stored));
    Ok(Json(fields))
}

/// POST /api/parse-resume
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Json(req): Json<ParseResumeRequest>,
) -> Result<Json<Map<String, Value>>, AppError> {
    parse_and_store(&state, user, &req.resume_text).await
}

/// POST /api/parse-resume/upload
/// Multipart form with a single `file` field: a PDF or a plain-text resume.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<Map<String, Value>>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
        info!(
            "Resume upload received: {} ({} bytes)",
            file_name.as_deref().unwrap_or("unnamed"),
            bytes.len()
        );

        let text = if is_pdf(file_name.as_deref(), content_type.as_deref(), &bytes) {
            extract_pdf_text(bytes).await?
        } else {
            String::from_utf8(bytes.to_vec()).map_err(|_| {
                AppError::Validation("Upload must be a PDF or UTF-8 text file".to_string())
            })?
        };
        validate_resume_text(&text)?;

        return parse_and_store(&state, user, &text).await;
    }

    Err(AppError::Validation(format!(
        "Multipart field '{UPLOAD_FIELD}' is required"
    )))
}

/// POST /api/onboarding/extract
pub async fn handle_onboarding_extract(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, AppError> {
    let response =
        extract_profile(state.memory.as_ref(), state.llm.as_ref(), user.id, &req).await?;
    Ok(Json(response))
}
