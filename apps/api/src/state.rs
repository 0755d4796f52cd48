use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::llm_client::ChatModel;
use crate::memory::MemoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Pipelines never reach into this directly; handlers pass the pieces they need.
#[derive(Clone)]
pub struct AppState {
    /// Used directly only for resume persistence. Memories go through `memory`.
    pub db: PgPool,
    pub memory: Arc<dyn MemoryStore>,
    pub llm: Arc<dyn ChatModel>,
    pub auth: Arc<dyn TokenVerifier>,
}
