use anyhow::{Context, Result};

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_PLANNING_MODEL: &str = "llama-3.1-70b-versatile";
pub const DEFAULT_SIMULATOR_MODEL: &str = "llama-3.1-70b-versatile";

/// Model selection per LLM task. Each entry can be overridden from the environment.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub chat: String,
    pub planning: String,
    pub simulation: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat: DEFAULT_CHAT_MODEL.to_string(),
            planning: DEFAULT_PLANNING_MODEL.to_string(),
            simulation: DEFAULT_SIMULATOR_MODEL.to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Startup fails if the database or auth service variables are missing.
/// The LLM key is optional here: its absence surfaces as a typed error on first use.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub models: ModelConfig,
    pub llm_temperature: f32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ModelConfig::default();

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            supabase_url: require_env("SUPABASE_URL")?,
            supabase_anon_key: require_env("SUPABASE_ANON_KEY")?,
            llm_api_key: optional_env("LLM_API_KEY").or_else(|| optional_env("GROQ_API_KEY")),
            llm_base_url: optional_env("LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            models: ModelConfig {
                chat: optional_env("CHAT_MODEL").unwrap_or(defaults.chat),
                planning: optional_env("PLANNING_MODEL").unwrap_or(defaults.planning),
                simulation: optional_env("SIMULATOR_MODEL").unwrap_or(defaults.simulation),
            },
            llm_temperature: std::env::var("LLM_TEMPERATURE")
                .unwrap_or_else(|_| "0.3".to_string())
                .parse::<f32>()
                .context("LLM_TEMPERATURE must be a number")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats unset and blank variables the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_defaults_split_chat_from_planning() {
        let models = ModelConfig::default();
        assert_eq!(models.chat, DEFAULT_CHAT_MODEL);
        assert_eq!(models.planning, DEFAULT_PLANNING_MODEL);
        assert_eq!(models.simulation, DEFAULT_SIMULATOR_MODEL);
    }

    #[test]
    fn test_optional_env_ignores_blank_values() {
        std::env::set_var("MENTOR_API_TEST_BLANK", "   ");
        assert!(optional_env("MENTOR_API_TEST_BLANK").is_none());
        std::env::remove_var("MENTOR_API_TEST_BLANK");
    }
}
