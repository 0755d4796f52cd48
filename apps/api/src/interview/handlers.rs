use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::interview::practice::{
    evaluate_answer, generate_questions, AnswerEvaluation, EvaluateAnswerRequest,
    GenerateQuestionsRequest, QuestionSet,
};
use crate::state::AppState;

/// POST /api/interview/generate-questions
pub async fn handle_generate_questions(
    State(state): State<AppState>,
    Json(req): Json<GenerateQuestionsRequest>,
) -> Result<Json<QuestionSet>, AppError> {
    let set = generate_questions(state.llm.as_ref(), &req).await?;
    Ok(Json(set))
}

/// POST /api/interview/evaluate-answer
pub async fn handle_evaluate_answer(
    State(state): State<AppState>,
    Json(req): Json<EvaluateAnswerRequest>,
) -> Result<Json<AnswerEvaluation>, AppError> {
    let evaluation = evaluate_answer(state.llm.as_ref(), &req).await?;
    Ok(Json(evaluation))
}
