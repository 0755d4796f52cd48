//! Test doubles for the store, model and auth seams. Compiled for tests only.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::auth::{AuthError, AuthUser, TokenVerifier};
use crate::config::{Config, ModelConfig};
use crate::llm_client::{ChatMessage, ChatModel, LlmError, LlmTask};
use crate::memory::MemoryStore;
use crate::models::memory::{MemoryMetadata, MemoryRecord};
use crate::state::AppState;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

/// A record for an arbitrary user, `minutes` after a fixed base time.
pub fn record_at(content: &str, metadata: Option<MemoryMetadata>, minutes: i64) -> MemoryRecord {
    MemoryRecord {
        id: Uuid::new_v4(),
        user_id: Uuid::nil(),
        content: content.to_string(),
        metadata,
        created_at: base_time() + Duration::minutes(minutes),
    }
}

/// Vec-backed store. New records are stamped after every existing one.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn with_records(records: Vec<MemoryRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn records(&self) -> Vec<MemoryRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Records of the given type, in insertion order.
    pub fn records_of(&self, memory_type: &str) -> Vec<MemoryRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.metadata.as_ref().map(|m| m.type_str()) == Some(memory_type))
            .collect()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn fetch_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, sqlx::Error> {
        let mut records: Vec<MemoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn store(
        &self,
        user_id: Uuid,
        content: &str,
        metadata: MemoryMetadata,
    ) -> Result<MemoryRecord, sqlx::Error> {
        let mut records = self.records.lock().unwrap();
        let latest = records
            .iter()
            .map(|r| r.created_at)
            .max()
            .unwrap_or_else(base_time);
        let record = MemoryRecord {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            metadata: Some(metadata),
            created_at: latest + Duration::seconds(1),
        };
        records.push(record.clone());
        Ok(record)
    }
}

/// Wraps an `InMemoryStore` and fails on demand: every fetch when
/// `fail_fetch` is set, and every `store` call from the `fail_store_from`-th
/// (1-based) onward.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    fail_fetch: bool,
    fail_store_from: Option<usize>,
    store_calls: Mutex<usize>,
}

impl FlakyStore {
    pub fn failing_fetch() -> Self {
        Self::default().with_failing_fetch()
    }

    pub fn with_failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_store_from(call: usize) -> Self {
        Self {
            fail_store_from: Some(call),
            ..Self::default()
        }
    }
}

#[async_trait]
impl MemoryStore for FlakyStore {
    async fn fetch_recent(
        &self,
        user_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, sqlx::Error> {
        if self.fail_fetch {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inner.fetch_recent(user_id, limit).await
    }

    async fn store(
        &self,
        user_id: Uuid,
        content: &str,
        metadata: MemoryMetadata,
    ) -> Result<MemoryRecord, sqlx::Error> {
        let call = {
            let mut calls = self.store_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if self.fail_store_from.is_some_and(|from| call >= from) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        self.inner.store(user_id, content, metadata).await
    }
}

/// Replays queued replies in order and records every request it receives.
#[derive(Default)]
pub struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<(LlmTask, Vec<ChatMessage>)>>,
}

impl ScriptedLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        let llm = Self::default();
        llm.push(Ok(reply.into()));
        llm
    }

    pub fn failing(err: LlmError) -> Self {
        let llm = Self::default();
        llm.push(Err(err));
        llm
    }

    pub fn push(&self, reply: Result<String, LlmError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<(LlmTask, Vec<ChatMessage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedLlm {
    async fn complete(&self, task: LlmTask, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push((task, messages.to_vec()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

pub const TEST_TOKEN: &str = "test-token";

/// Accepts only `TEST_TOKEN`, resolving it to the nil user used by `record_at`.
pub struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token == TEST_TOKEN {
            Ok(AuthUser {
                id: Uuid::nil(),
                email: Some("test@example.com".to_string()),
            })
        } else {
            Err(AuthError::Rejected(401))
        }
    }
}

pub fn test_config(api_key: Option<&str>) -> Config {
    Config {
        database_url: "postgres://localhost/mentor_test".into(),
        supabase_url: "http://localhost:54321".into(),
        supabase_anon_key: "anon".into(),
        llm_api_key: api_key.map(String::from),
        llm_base_url: "http://localhost:9/v1/".into(),
        models: ModelConfig::default(),
        llm_temperature: 0.3,
        port: 8080,
        rust_log: "info".into(),
    }
}

/// Router state over the given doubles. The pool never connects unless a
/// handler touches it.
pub fn test_state(store: Arc<InMemoryStore>, llm: Arc<ScriptedLlm>) -> AppState {
    let config = test_config(Some("test-key"));
    let db = PgPoolOptions::new()
        .connect_lazy(&config.database_url)
        .expect("lazy pool from a well-formed url");
    AppState {
        db,
        memory: store,
        llm,
        auth: Arc::new(StaticVerifier),
    }
}
