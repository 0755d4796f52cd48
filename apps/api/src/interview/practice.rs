use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::interview::prompts::{
    ANSWER_EVALUATOR_PROMPT, ANSWER_EVALUATOR_SYSTEM, QUESTION_GENERATOR_PROMPT,
    QUESTION_GENERATOR_SYSTEM,
};
use crate::llm_client::{complete_json, ensure_configured, ChatMessage, ChatModel, LlmError, LlmTask};

pub const DEFAULT_QUESTION_COUNT: u32 = 4;
pub const MAX_QUESTION_COUNT: u32 = 10;

fn default_question_count() -> u32 {
    DEFAULT_QUESTION_COUNT
}

fn default_difficulty() -> String {
    "medium".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateQuestionsRequest {
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_question_count")]
    pub num_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionSet {
    pub questions: Vec<InterviewQuestion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateAnswerRequest {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarBreakdown {
    pub situation: String,
    pub task: String,
    pub action: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerEvaluation {
    pub score: u32,
    pub star_method_rating: u32,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub summary: String,
    pub star_breakdown: StarBreakdown,
}

impl AnswerEvaluation {
    /// Returned when the model's reply cannot be read as an evaluation.
    pub fn unavailable() -> Self {
        Self {
            score: 70,
            star_method_rating: 65,
            strengths: vec!["Answer provided".to_string()],
            improvements: vec![
                "AI evaluation temporarily unavailable. Please try again.".to_string(),
            ],
            summary: "AI evaluation is processing. Your answer was recorded.".to_string(),
            star_breakdown: StarBreakdown {
                situation: "?".to_string(),
                task: "?".to_string(),
                action: "?".to_string(),
                result: "?".to_string(),
            },
        }
    }
}

pub async fn generate_questions(
    llm: &dyn ChatModel,
    request: &GenerateQuestionsRequest,
) -> Result<QuestionSet, AppError> {
    if request.job_title.trim().is_empty() {
        return Err(AppError::Validation("jobTitle is required".to_string()));
    }
    ensure_configured(llm).map_err(|e| AppError::llm("Question generation", e))?;

    let count = request.num_questions.clamp(1, MAX_QUESTION_COUNT);
    let messages = [
        ChatMessage::system(QUESTION_GENERATOR_SYSTEM),
        ChatMessage::user(
            QUESTION_GENERATOR_PROMPT
                .replace("{count}", &count.to_string())
                .replace("{job_title}", request.job_title.trim())
                .replace("{company}", request.company.trim())
                .replace("{difficulty}", request.difficulty.trim()),
        ),
    ];

    let questions: Vec<InterviewQuestion> = complete_json(llm, LlmTask::Chat, &messages)
        .await
        .map_err(|e| AppError::llm("Failed to generate questions", e))?;

    info!(
        "Generated {} interview questions for '{}'",
        questions.len(),
        request.job_title.trim()
    );
    Ok(QuestionSet { questions })
}

/// Only an unreadable reply falls back to the canned evaluation. Transport
/// and provider failures still surface as errors.
pub async fn evaluate_answer(
    llm: &dyn ChatModel,
    request: &EvaluateAnswerRequest,
) -> Result<AnswerEvaluation, AppError> {
    if request.question.trim().is_empty() || request.answer.trim().is_empty() {
        return Err(AppError::Validation(
            "question and answer are required".to_string(),
        ));
    }
    ensure_configured(llm).map_err(|e| AppError::llm("Answer evaluation", e))?;

    let messages = [
        ChatMessage::system(ANSWER_EVALUATOR_SYSTEM),
        ChatMessage::user(
            ANSWER_EVALUATOR_PROMPT
                .replace("{question}", request.question.trim())
                .replace("{answer}", request.answer.trim()),
        ),
    ];

    match complete_json::<AnswerEvaluation>(llm, LlmTask::Chat, &messages).await {
        Ok(evaluation) => Ok(evaluation),
        Err(LlmError::Parse(e)) => {
            warn!("Answer evaluation reply was not valid JSON, using fallback: {e}");
            Ok(AnswerEvaluation::unavailable())
        }
        Err(e) => Err(AppError::llm("Failed to evaluate answer", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedLlm;

    fn generate_request(num_questions: u32) -> GenerateQuestionsRequest {
        GenerateQuestionsRequest {
            job_title: "Backend Engineer".into(),
            company: "Acme".into(),
            difficulty: "hard".into(),
            num_questions,
        }
    }

    fn evaluate_request() -> EvaluateAnswerRequest {
        EvaluateAnswerRequest {
            question: "Tell me about a time you handled an outage.".into(),
            answer: "Our database failed over during peak traffic, so I...".into(),
        }
    }

    #[test]
    fn test_request_defaults() {
        let req: GenerateQuestionsRequest =
            serde_json::from_str(r#"{"jobTitle": "Data Analyst"}"#).unwrap();
        assert_eq!(req.num_questions, 4);
        assert_eq!(req.difficulty, "medium");
    }

    #[tokio::test]
    async fn test_generate_questions_from_fenced_array() {
        let llm = ScriptedLlm::replying(
            "```json\n[{\"question\": \"Design a rate limiter.\", \"category\": \"technical\"}, {\"question\": \"Describe a conflict.\", \"category\": \"behavioral\", \"tips\": [\"Use STAR\"]}]\n```",
        );

        let set = generate_questions(&llm, &generate_request(2)).await.unwrap();
        assert_eq!(set.questions.len(), 2);
        assert_eq!(set.questions[1].tips, ["Use STAR"]);

        let calls = llm.calls();
        let prompt = &calls[0].1[1].content;
        assert!(prompt.starts_with("Generate exactly 2 interview questions"));
        assert!(prompt.contains("Job Title: Backend Engineer\nCompany: Acme\nDifficulty Level: hard"));
    }

    #[tokio::test]
    async fn test_question_count_is_capped() {
        let llm = ScriptedLlm::replying("[]");
        generate_questions(&llm, &generate_request(50)).await.unwrap();
        let calls = llm.calls();
        assert!(calls[0].1[1].content.starts_with("Generate exactly 10 interview questions"));
    }

    #[tokio::test]
    async fn test_unparseable_questions_is_an_error() {
        let llm = ScriptedLlm::replying("Here are some questions: 1. Why us?");
        let err = generate_questions(&llm, &generate_request(4)).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_evaluation_parsed_from_reply() {
        let llm = ScriptedLlm::replying(
            r#"{"score": 82, "starMethodRating": 75, "strengths": ["Clear situation"], "improvements": ["Quantify the result"], "summary": "Solid.", "starBreakdown": {"situation": "Outage at peak", "task": "Restore service", "action": "Failed over", "result": "Not stated"}}"#,
        );
        let evaluation = evaluate_answer(&llm, &evaluate_request()).await.unwrap();
        assert_eq!(evaluation.score, 82);
        assert_eq!(evaluation.star_breakdown.result, "Not stated");
    }

    #[tokio::test]
    async fn test_unreadable_evaluation_falls_back() {
        let llm = ScriptedLlm::replying("Great answer! 8/10.");
        let evaluation = evaluate_answer(&llm, &evaluate_request()).await.unwrap();
        assert_eq!(evaluation, AnswerEvaluation::unavailable());

        let value = serde_json::to_value(&evaluation).unwrap();
        assert_eq!(value["score"], 70);
        assert_eq!(value["starMethodRating"], 65);
        assert_eq!(value["starBreakdown"]["situation"], "?");
    }

    #[tokio::test]
    async fn test_provider_failure_is_not_masked() {
        let llm = ScriptedLlm::failing(LlmError::Api {
            status: 503,
            message: "overloaded".into(),
        });
        let err = evaluate_answer(&llm, &evaluate_request()).await.unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
    }

    #[tokio::test]
    async fn test_blank_answer_rejected() {
        let llm = ScriptedLlm::replying("{}");
        let req = EvaluateAnswerRequest {
            question: "Why us?".into(),
            answer: "  ".into(),
        };
        let err = evaluate_answer(&llm, &req).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(llm.calls().is_empty());
    }
}
