/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// All LLM interactions go through the `ChatModel` trait defined here.
///
/// Providers are OpenAI-compatible (`/chat/completions`); switching between
/// Groq, OpenRouter and friends is a base URL + model string change.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, ModelConfig};

pub mod extract;
pub mod prompts;

const MAX_ATTEMPTS: u32 = 3;
const REQUEST_TIMEOUT_SECS: u64 = 120;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} attempts")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM API key is not configured")]
    MissingApiKey,
}

/// Which kind of work a call performs. Selects the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmTask {
    Chat,
    Planning,
    Simulation,
}

impl LlmTask {
    pub fn model<'a>(&self, models: &'a ModelConfig) -> &'a str {
        match self {
            LlmTask::Chat => &models.chat,
            LlmTask::Planning => &models.planning,
            LlmTask::Simulation => &models.simulation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Seam between the pipelines and the provider. `LlmClient` is the production
/// implementation; tests substitute a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the text of the first completion choice.
    async fn complete(&self, task: LlmTask, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Whether credentials are present. Checked before a pipeline writes anything.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Fails fast with `MissingApiKey` so no pipeline step runs without credentials.
pub fn ensure_configured(llm: &dyn ChatModel) -> Result<(), LlmError> {
    if llm.is_configured() {
        Ok(())
    } else {
        Err(LlmError::MissingApiKey)
    }
}

/// Calls the model and deserializes its reply as JSON after stripping code fences.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    llm: &dyn ChatModel,
    task: LlmTask,
    messages: &[ChatMessage],
) -> Result<T, LlmError> {
    let text = llm.complete(task, messages).await?;
    serde_json::from_str(extract::strip_json_fences(&text)).map_err(LlmError::Parse)
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl CompletionResponse {
    /// Extracts the content of the first choice, if it is non-blank.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// The single LLM client used by all services.
/// Wraps an OpenAI-compatible chat-completions API with retry on rate limiting.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    models: ModelConfig,
    temperature: f32,
    retry_base_delay: Duration,
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key: config.llm_api_key.clone(),
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
            temperature: config.llm_temperature,
            retry_base_delay: RETRY_BASE_DELAY,
        })
    }

    #[cfg(test)]
    fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn models(&self) -> &ModelConfig {
        &self.models
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Delay before retry number `attempt` (1-based): base, then 2x base.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay * (1 << (attempt - 1))
    }

    /// Makes a raw call to the provider, returning the full response object.
    /// Retries on 429 (rate limit) with exponential backoff; every other failure is final.
    pub async fn call(
        &self,
        task: LlmTask,
        messages: &[ChatMessage],
    ) -> Result<CompletionResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;
        let model = task.model(&self.models);

        let request_body = CompletionRequest {
            model,
            messages,
            temperature: self.temperature,
        };

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = self.backoff_delay(attempt);
                warn!(
                    "LLM rate limited on attempt {}, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(self.endpoint())
                .bearer_auth(api_key)
                .json(&request_body)
                .send()
                .await?;

            let status = response.status();

            if status.as_u16() == 429 {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ProviderError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let completion: CompletionResponse = response.json().await?;

            if let Some(usage) = &completion.usage {
                debug!(
                    "LLM call succeeded: model={}, prompt_tokens={}, completion_tokens={}",
                    model, usage.prompt_tokens, usage.completion_tokens
                );
            }

            return Ok(completion);
        }

        Err(LlmError::RateLimited {
            retries: MAX_ATTEMPTS,
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, task: LlmTask, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let response = self.call(task, messages).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
