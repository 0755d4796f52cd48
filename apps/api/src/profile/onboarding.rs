//! Onboarding extraction: questionnaire answers and/or resume text in, a
//! structured profile with per-field confidence out. The profile is stored as a
//! `user_profile` memory so later mentor turns can see it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::extract::extract_json_object;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask};
use crate::memory::MemoryStore;
use crate::models::memory::MemoryMetadata;
use crate::profile::prompts::ONBOARDING_SYSTEM;

pub const ONBOARDING_CONTEXT: &str = "onboarding";
const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRequest {
    pub education: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub goals: Option<String>,
    pub resume_text: Option<String>,
}

fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl OnboardingRequest {
    pub fn has_any_input(&self) -> bool {
        [
            &self.education,
            &self.experience,
            &self.skills,
            &self.goals,
            &self.resume_text,
        ]
        .into_iter()
        .any(|f| provided(f).is_some())
    }

    /// Sectioned text handed to the model. The resume section only appears when supplied.
    pub fn to_prompt(&self) -> String {
        let section = |f: &Option<String>| provided(f).unwrap_or(NOT_PROVIDED).to_string();
        let mut prompt = format!(
            "EDUCATION:\n{}\n\nWORK EXPERIENCE:\n{}\n\nSKILLS:\n{}\n\nCAREER GOALS:\n{}",
            section(&self.education),
            section(&self.experience),
            section(&self.skills),
            section(&self.goals),
        );
        if let Some(resume) = provided(&self.resume_text) {
            prompt.push_str("\n\nRESUME:\n");
            prompt.push_str(resume);
        }
        prompt
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResponse {
    pub profile: Value,
    pub success: bool,
}

fn array_len(value: &Value, pointer: &str) -> usize {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// One-line memory content, e.g.
/// `Profile Genesis: 1 education entries, 2 work experiences, 5 technical skills. Overall Confidence: 80%.`
pub fn summarize_profile(profile: &Value) -> String {
    let confidence = profile
        .get("confidenceScore")
        .filter(|v| !v.is_null())
        .map_or_else(|| "unknown".to_string(), Value::to_string);
    let mut summary = format!(
        "Profile Genesis: {} education entries, {} work experiences, {} technical skills. Overall Confidence: {}%.",
        array_len(profile, "/education"),
        array_len(profile, "/workExperience"),
        array_len(profile, "/skills/technical"),
        confidence,
    );
    let conflicts = array_len(profile, "/conflicts");
    if conflicts > 0 {
        summary.push_str(&format!(" Detected {conflicts} potential conflicts."));
    }
    summary
}

pub async fn extract_profile(
    store: &dyn MemoryStore,
    llm: &dyn ChatModel,
    user_id: Uuid,
    request: &OnboardingRequest,
) -> Result<OnboardingResponse, AppError> {
    if !request.has_any_input() {
        return Err(AppError::Validation(
            "Please provide at least one field (education, experience, skills, goals, or resume)"
                .to_string(),
        ));
    }
    ensure_configured(llm).map_err(|e| AppError::llm("Profile extraction", e))?;

    let messages = [
        ChatMessage::system(ONBOARDING_SYSTEM),
        ChatMessage::user(request.to_prompt()),
    ];
    let reply = llm
        .complete(LlmTask::Planning, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to extract profile", e))?;

    let profile = match serde_json::from_str::<Value>(extract_json_object(&reply)) {
        Ok(profile @ Value::Object(_)) => profile,
        Ok(_) | Err(_) => {
            warn!(
                "Onboarding reply for user {user_id} is not a JSON object: {}",
                reply.chars().take(500).collect::<String>()
            );
            return Err(AppError::Llm("Failed to parse profile data".to_string()));
        }
    };

    let confidence_score = profile.get("confidenceScore").and_then(Value::as_f64);
    store
        .store(
            user_id,
            &summarize_profile(&profile),
            MemoryMetadata::UserProfile {
                context: Some(ONBOARDING_CONTEXT.to_string()),
                profile_data: profile.clone(),
                confidence_score,
            },
        )
        .await?;
    info!("Profile stored for user {user_id}");

    Ok(OnboardingResponse {
        profile,
        success: true,
    })
}
