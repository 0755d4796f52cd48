use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::career::prompts::{PATTERN_ANALYZER_PROMPT, PATTERN_ANALYZER_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::extract::{brace_span, strip_json_fences};
use crate::llm_client::{ensure_configured, ChatMessage, ChatModel, LlmTask};

/// Interviews before the history counts as more than a warm-up.
const EARLY_INTERVIEW_COUNT: usize = 5;
/// Monthly mock-interview target used by the computed plan.
const MONTHLY_INTERVIEW_TARGET: usize = 10;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerSnapshot {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub target_roles: Vec<String>,
    #[serde(default)]
    pub experience: Value,
}

/// History entries are free-form; only `score` (interviews) and `outcome`
/// (applications) are read directly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePatternsRequest {
    #[serde(default)]
    pub interview_history: Vec<Value>,
    #[serde(default)]
    pub application_history: Vec<Value>,
    #[serde(default)]
    pub user_profile: CareerSnapshot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPlan {
    #[serde(default)]
    pub this_month: Vec<String>,
    #[serde(default)]
    pub next_month: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternAnalysis {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub root_causes: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub action_plan: ActionPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub analysis: PatternAnalysis,
}

/// Headline numbers derived from the submitted history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    pub interviews: usize,
    pub applications: usize,
    pub offers: usize,
    /// Rounded mean of interview scores; entries without a numeric score count as 0.
    pub average_score: i64,
    /// Offers as a rounded percentage of applications.
    pub acceptance_rate: i64,
}

impl HistoryStats {
    pub fn from_request(req: &AnalyzePatternsRequest) -> Self {
        let interviews = req.interview_history.len();
        let applications = req.application_history.len();
        let offers = req
            .application_history
            .iter()
            .filter(|a| a.get("outcome").and_then(Value::as_str) == Some("offer"))
            .count();

        let average_score = if interviews == 0 {
            0
        } else {
            let total: f64 = req
                .interview_history
                .iter()
                .map(|i| i.get("score").and_then(Value::as_f64).unwrap_or(0.0))
                .sum();
            (total / interviews as f64).round() as i64
        };
        let acceptance_rate = if applications == 0 {
            0
        } else {
            (offers as f64 / applications as f64 * 100.0).round() as i64
        };

        Self {
            interviews,
            applications,
            offers,
            average_score,
            acceptance_rate,
        }
    }
}

fn model_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"</?s>|\[/?B_INST\]|\[/?INST\]").expect("model token regex is valid")
    })
}

/// Strips chat-template tokens and code fences, then narrows to the outermost
/// `{...}` if there is one.
pub fn clean_reply(raw: &str) -> String {
    let without_tokens = model_token_re().replace_all(raw.trim(), "");
    let unfenced = strip_json_fences(&without_tokens);
    brace_span(unfenced).unwrap_or(unfenced).trim().to_string()
}

fn experience_text(experience: &Value) -> String {
    match experience {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn pretty(entries: &[Value]) -> String {
    serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
}

fn analysis_prompt(req: &AnalyzePatternsRequest) -> String {
    PATTERN_ANALYZER_PROMPT
        .replace("{interview_history}", &pretty(&req.interview_history))
        .replace("{application_history}", &pretty(&req.application_history))
        .replace("{skills}", &req.user_profile.skills.join(", "))
        .replace("{target_roles}", &req.user_profile.target_roles.join(", "))
        .replace("{experience}", &experience_text(&req.user_profile.experience))
}

/// Analysis computed from the history alone, used when the model's reply
/// cannot be read.
pub fn computed_analysis(req: &AnalyzePatternsRequest) -> PatternAnalysis {
    let stats = HistoryStats::from_request(req);
    let profile = &req.user_profile;
    let n = stats.interviews;
    let apps = stats.applications;
    let rate = stats.acceptance_rate;
    let early = n < EARLY_INTERVIEW_COUNT;

    let offers_line = if rate > 0 {
        format!(
            "You've received {} offer(s) with a {rate}% acceptance rate.",
            stats.offers
        )
    } else {
        "Track more applications to see acceptance patterns.".to_string()
    };
    let summary = format!(
        "Your career journey shows {n} interviews and {apps} applications. Average interview score: {}/100. {offers_line} Focus on consistent practice and strategic targeting.",
        stats.average_score
    );

    let roles = if profile.target_roles.is_empty() {
        "various positions".to_string()
    } else {
        profile.target_roles.join(", ")
    };
    let top_skills = profile
        .skills
        .iter()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    let first_skill = profile
        .skills
        .first()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("core");

    PatternAnalysis {
        summary,
        patterns: vec![
            pick(
                early,
                "Building interview experience - need more practice sessions",
                "Interview performance trending upward",
            ),
            pick(
                apps < 10,
                "Early stage in job search - continue applying broadly",
                "Active job search with multiple applications",
            ),
            pick(
                rate < 20 && apps > 5,
                "Lower than average acceptance rate - strategy adjustment needed",
                "Healthy application funnel",
            ),
        ],
        strengths: vec![
            if n > 0 {
                format!("Completed {n} mock interviews")
            } else {
                "Starting interview preparation".to_string()
            },
            format!("Targeting roles in: {roles}"),
            if profile.skills.is_empty() {
                "Skill development in progress".to_string()
            } else {
                format!("Building expertise in: {top_skills}")
            },
        ],
        weaknesses: vec![
            pick(
                early,
                "Need more interview practice",
                "Refine advanced interview techniques",
            ),
            pick(
                rate < 30 && apps > 3,
                "Improve resume/application quality",
                "Strengthen application targeting",
            ),
            "Expand professional network".to_string(),
        ],
        root_causes: vec![
            pick(
                early,
                "Insufficient interview data - complete more mock interviews",
                "Consistency in performance - some interviews score higher than others",
            ),
            pick(
                rate == 0 && apps > 3,
                "Potential resume/ATS optimization issue or role mismatch",
                "Market factors and role-specific requirements",
            ),
            "Limited networking - most opportunities come through connections".to_string(),
        ],
        recommendations: vec![
            if n < MONTHLY_INTERVIEW_TARGET {
                format!(
                    "Complete {} more mock interviews this month",
                    MONTHLY_INTERVIEW_TARGET - n
                )
            } else {
                "Continue interview practice 3x per week".to_string()
            },
            "Update resume with quantified achievements".to_string(),
            "Reach out to 3-5 networking contacts weekly".to_string(),
            "Focus on top 3 target companies".to_string(),
            format!("Study {first_skill} skills more deeply"),
        ],
        action_plan: ActionPlan {
            this_month: vec![
                format!(
                    "✓ Complete {} mock interviews",
                    MONTHLY_INTERVIEW_TARGET.saturating_sub(n).max(3)
                ),
                "✓ Apply to 5-10 target roles".to_string(),
                "✓ Update resume with recent accomplishments".to_string(),
                "✓ Network with 2-3 professionals in target roles".to_string(),
            ],
            next_month: vec![
                "Review interview recordings and improve weak areas".to_string(),
                "Apply to 5-10 more roles based on patterns".to_string(),
                "Complete 3-5 more mock interviews".to_string(),
                "Follow up on pending applications".to_string(),
            ],
        },
    }
}

fn pick(condition: bool, when_true: &str, when_false: &str) -> String {
    (if condition { when_true } else { when_false }).to_string()
}

/// Provider failures are errors; an unreadable reply falls back to
/// `computed_analysis`.
pub async fn analyze_patterns(
    llm: &dyn ChatModel,
    req: &AnalyzePatternsRequest,
) -> Result<PatternAnalysis, AppError> {
    ensure_configured(llm).map_err(|e| AppError::llm("Pattern analysis", e))?;

    let messages = [
        ChatMessage::system(PATTERN_ANALYZER_SYSTEM),
        ChatMessage::user(analysis_prompt(req)),
    ];
    let raw = llm
        .complete(LlmTask::Planning, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to analyze patterns", e))?;

    match serde_json::from_str::<PatternAnalysis>(&clean_reply(&raw)) {
        Ok(analysis) => {
            info!(
                "Pattern analysis over {} interviews and {} applications",
                req.interview_history.len(),
                req.application_history.len()
            );
            Ok(analysis)
        }
        Err(e) => {
            warn!("Pattern analysis reply was not valid JSON, computing from history: {e}");
            Ok(computed_analysis(req))
        }
    }
}
