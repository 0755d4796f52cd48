use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A parsed resume kept for the user. `data` holds whatever fields the model extracted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub data: Value,
    pub raw_text: String,
    pub created_at: DateTime<Utc>,
}
