use axum::{extract::State, Json};

use crate::career::patterns::{analyze_patterns, AnalyzePatternsRequest, PatternReport};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/career/analyze-patterns
pub async fn handle_analyze_patterns(
    State(state): State<AppState>,
    Json(req): Json<AnalyzePatternsRequest>,
) -> Result<Json<PatternReport>, AppError> {
    let analysis = analyze_patterns(state.llm.as_ref(), &req).await?;
    Ok(Json(PatternReport { analysis }))
}
