//! Trajectory simulation: asks the model for 2-3 hypothetical career paths
//! and recovers a JSON array from whatever prose surrounds it.
//!
//! Parsing is a chain of fallible strategies, tried in order until one yields
//! a non-empty array:
//!   (a) array inside a fenced code block
//!   (b) first `[` to last `]`
//!   (c) every balanced top-level `{...}` object, wrapped in `[...]`
//!   (d) trailing commas stripped, then (a) and (b) again
//!
//! Only the trajectory names are persisted, as a one-line summary memory.
//! That write and the context fetch are best-effort.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask};
use crate::memory::{format_memories_for_prompt, MemoryStore};
use crate::mentor::prompts::{
    TRAJECTORY_CONTEXT_HEADER, TRAJECTORY_PROMPT_TEMPLATE, TRAJECTORY_SYSTEM,
};
use crate::models::memory::MemoryMetadata;

/// Simulation looks further back than the mentor chat.
pub const TRAJECTORY_MEMORY_LIMIT: usize = 12;
pub const TRAJECTORY_CONTEXT: &str = "trajectory_simulation";
pub const PARSE_FAILURE_MESSAGE: &str =
    "Failed to parse trajectory JSON, returning raw response";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    #[default]
    Medium,
    High,
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(match raw.trim().to_lowercase().as_str() {
            "low" => Level::Low,
            "high" => Level::High,
            _ => Level::Medium,
        })
    }
}

/// One simulated career path. Ephemeral: parsed from model output, never stored whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trajectory {
    pub name: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub short_term_outcomes: Vec<String>,
    #[serde(default)]
    pub long_term_outcomes: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub effort_level: Level,
    #[serde(default)]
    pub confidence: Level,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryRequest {
    pub message: String,
}

/// Either parsed trajectories, or an empty list plus the raw reply for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrajectoryResponse {
    pub trajectories: Vec<Trajectory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl TrajectoryResponse {
    fn parsed(trajectories: Vec<Trajectory>, decision: &str) -> Self {
        Self {
            trajectories,
            decision_context: Some(decision.to_string()),
            raw_response: None,
            error: None,
            success: true,
        }
    }

    fn unparsed(raw: String) -> Self {
        Self {
            trajectories: Vec::new(),
            decision_context: None,
            raw_response: Some(raw),
            error: Some(PARSE_FAILURE_MESSAGE.to_string()),
            success: false,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing cascade
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    FencedBlock,
    BracketSpan,
    ObjectScan,
    TrailingCommaRepair,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStrategy::FencedBlock => "fenced code block",
            ParseStrategy::BracketSpan => "bracket span",
            ParseStrategy::ObjectScan => "object scan",
            ParseStrategy::TrailingCommaRepair => "trailing comma repair",
        };
        f.write_str(name)
    }
}

fn fenced_array_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"```(?:json)?\s*(\[[\s\S]*?\])\s*```").expect("fenced array regex is valid")
    })
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",(\s*[\]}])").expect("trailing comma regex is valid"))
}

/// Non-empty array of trajectories, or nothing.
fn decode_array(candidate: &str) -> Option<Vec<Trajectory>> {
    serde_json::from_str::<Vec<Trajectory>>(candidate)
        .ok()
        .filter(|t| !t.is_empty())
}

fn from_fenced_block(text: &str) -> Option<Vec<Trajectory>> {
    let inner = fenced_array_re().captures(text)?.get(1)?.as_str();
    decode_array(inner)
}

fn from_bracket_span(text: &str) -> Option<Vec<Trajectory>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    decode_array(&text[start..=end])
}

/// Balanced `{...}` spans at brace depth zero. Braces inside string literals are ignored.
fn top_level_objects(text: &str) -> Vec<&str> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        objects.push(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }
    objects
}

fn from_object_scan(text: &str) -> Option<Vec<Trajectory>> {
    let objects = top_level_objects(text);
    if objects.is_empty() {
        return None;
    }
    decode_array(&format!("[{}]", objects.join(",")))
}

fn from_repaired(text: &str) -> Option<Vec<Trajectory>> {
    let repaired = trailing_comma_re().replace_all(text, "$1");
    from_fenced_block(&repaired).or_else(|| from_bracket_span(&repaired))
}

/// Runs the strategies in order. `None` means no strategy produced a usable array.
pub fn parse_trajectories(text: &str) -> Option<(Vec<Trajectory>, ParseStrategy)> {
    let strategies: [(ParseStrategy, fn(&str) -> Option<Vec<Trajectory>>); 4] = [
        (ParseStrategy::FencedBlock, from_fenced_block),
        (ParseStrategy::BracketSpan, from_bracket_span),
        (ParseStrategy::ObjectScan, from_object_scan),
        (ParseStrategy::TrailingCommaRepair, from_repaired),
    ];
    strategies
        .into_iter()
        .find_map(|(strategy, parse)| parse(text).map(|t| (t, strategy)))
}

pub fn summarize(trajectories: &[Trajectory]) -> String {
    let names = trajectories
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Trajectory Analysis: {names}")
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

pub async fn simulate(
    store: &dyn MemoryStore,
    llm: &dyn ChatModel,
    user_id: Uuid,
    decision: &str,
) -> Result<TrajectoryResponse, AppError> {
    ensure_configured(llm).map_err(|e| AppError::llm("Trajectory simulation", e))?;

    let memories = store
        .fetch_recent(user_id, TRAJECTORY_MEMORY_LIMIT)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to fetch memories for user {user_id}, simulating without context: {e}");
            Vec::new()
        });
    info!(
        "Simulating trajectories for user {user_id} with {} memories",
        memories.len()
    );
    let memory_context = format_memories_for_prompt(&memories);

    let messages = [
        ChatMessage::system(format!(
            "{TRAJECTORY_SYSTEM}\n\n{TRAJECTORY_CONTEXT_HEADER}\n{memory_context}"
        )),
        ChatMessage::user(TRAJECTORY_PROMPT_TEMPLATE.replace("{decision}", decision)),
    ];

    let raw = llm
        .complete(LlmTask::Simulation, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to generate trajectories", e))?;

    let Some((trajectories, strategy)) = parse_trajectories(&raw) else {
        warn!(
            "Could not parse trajectories for user {user_id}: {}",
            raw.chars().take(200).collect::<String>()
        );
        return Ok(TrajectoryResponse::unparsed(raw));
    };

    info!(
        "Parsed {} trajectories via {strategy} for user {user_id}",
        trajectories.len()
    );

    if let Err(e) = store
        .store(
            user_id,
            &summarize(&trajectories),
            MemoryMetadata::Trajectory {
                decision_context: decision.to_string(),
                trajectories_count: trajectories.len(),
                context: Some(TRAJECTORY_CONTEXT.to_string()),
            },
        )
        .await
    {
        warn!("Failed to store trajectory summary for user {user_id}: {e}");
    }

    Ok(TrajectoryResponse::parsed(trajectories, decision))
}
