use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::memory::{MemoryMetadata, MemoryRecord, MemoryRow};

/// Persistence seam for memory records. Handlers receive it explicitly through
/// `AppState`; there is no ambient default client.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Returns up to `limit` records for `user_id`, newest first.
    async fn fetch_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, sqlx::Error>;

    /// Appends a record. Existing records are never updated.
    async fn store(
        &self,
        user_id: Uuid,
        content: &str,
        metadata: MemoryMetadata,
    ) -> Result<MemoryRecord, sqlx::Error>;
}

/// Postgres-backed store over the `memories` table.
#[derive(Clone)]
pub struct PgMemoryStore {
    pool: PgPool,
}

impl PgMemoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemoryStore for PgMemoryStore {
    async fn fetch_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, sqlx::Error> {
        let rows = sqlx::query_as::<_, MemoryRow>(
            r#"
            SELECT id, user_id, content, metadata, created_at
            FROM memories
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!("Fetched {} memories for user {}", rows.len(), user_id);
        Ok(rows.into_iter().map(MemoryRecord::from).collect())
    }

    async fn store(
        &self,
        user_id: Uuid,
        content: &str,
        metadata: MemoryMetadata,
    ) -> Result<MemoryRecord, sqlx::Error> {
        let memory_type = metadata.type_str();
        let row = sqlx::query_as::<_, MemoryRow>(
            r#"
            INSERT INTO memories (user_id, content, metadata)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, content, metadata, created_at
            "#,
        )
        .bind(user_id)
        .bind(content)
        .bind(Json(&metadata))
        .fetch_one(&self.pool)
        .await?;

        debug!("Stored {memory_type} memory {} for user {user_id}", row.id);
        Ok(MemoryRecord::from(row))
    }
}
