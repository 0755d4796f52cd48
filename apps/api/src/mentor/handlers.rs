use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::mentor::reflect::{reflect, ReflectRequest, ReflectionResult};
use crate::mentor::respond::{respond, MentorReply, RespondRequest};
use crate::mentor::trajectory::{simulate, TrajectoryRequest, TrajectoryResponse};
use crate::models::memory::MemoryRecord;
use crate::state::AppState;

pub const DEFAULT_MEMORY_PAGE: usize = 20;
pub const MAX_MEMORY_PAGE: usize = 100;

/// Rejects blank input. The caller keeps using the untrimmed text.
fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// POST /api/mentor/respond
pub async fn handle_respond(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RespondRequest>,
) -> Result<Json<MentorReply>, AppError> {
    require_text(&req.message, "message")?;
    let reply = respond(state.memory.as_ref(), state.llm.as_ref(), user.id, &req.message).await?;
    Ok(Json(reply))
}

/// POST /api/mentor/reflect
pub async fn handle_reflect(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<ReflectRequest>,
) -> Result<Json<ReflectionResult>, AppError> {
    require_text(&req.message, "message")?;
    require_text(&req.previous_advice, "previousAdvice")?;
    let result = reflect(
        state.memory.as_ref(),
        state.llm.as_ref(),
        user.id,
        &req.message,
        &req.previous_advice,
    )
    .await?;
    Ok(Json(result))
}

/// POST /api/mentor/trajectory
pub async fn handle_trajectory(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<TrajectoryRequest>,
) -> Result<Json<TrajectoryResponse>, AppError> {
    require_text(&req.message, "message")?;
    let response = simulate(state.memory.as_ref(), state.llm.as_ref(), user.id, &req.message).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct MemoryListQuery {
    pub limit: Option<usize>,
}

impl MemoryListQuery {
    fn page_size(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_MEMORY_PAGE)
            .clamp(1, MAX_MEMORY_PAGE)
    }
}

#[derive(Debug, Serialize)]
pub struct MemoryListResponse {
    pub memories: Vec<MemoryRecord>,
}

/// GET /api/mentor/memories
pub async fn handle_list_memories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<MemoryListQuery>,
) -> Result<Json<MemoryListResponse>, AppError> {
    let memories = state
        .memory
        .fetch_recent(user.id, params.page_size())
        .await?;
    Ok(Json(MemoryListResponse { memories }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(matches!(
            require_text("   ", "message"),
            Err(AppError::Validation(msg)) if msg == "message is required"
        ));
        assert!(matches!(
            require_text("\n\t", "previousAdvice"),
            Err(AppError::Validation(msg)) if msg == "previousAdvice is required"
        ));
        assert!(require_text("  hi  ", "message").is_ok());
    }

    #[test]
    fn test_memory_page_size_defaults_and_caps() {
        assert_eq!(MemoryListQuery { limit: None }.page_size(), 20);
        assert_eq!(MemoryListQuery { limit: Some(5) }.page_size(), 5);
        assert_eq!(MemoryListQuery { limit: Some(500) }.page_size(), 100);
        assert_eq!(MemoryListQuery { limit: Some(0) }.page_size(), 1);
    }
}
