//! Product event log: the signed-in user records what they did, one row per event.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

/// Body as sent. Fields stay untyped so a wrong type is a 400 with a clear
/// message rather than a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub action: Value,
    #[serde(default)]
    pub context: Value,
}

/// A validated event ready for insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub category: String,
    pub action: String,
    pub context: Option<Value>,
}

impl EventRequest {
    pub fn validate(self) -> Result<NewEvent, AppError> {
        let (Value::String(category), Value::String(action)) = (self.category, self.action) else {
            return Err(AppError::Validation(
                "category and action are required strings".to_string(),
            ));
        };
        let context = match self.context {
            Value::Null => None,
            ctx @ Value::Object(_) => Some(ctx),
            _ => {
                return Err(AppError::Validation(
                    "context must be an object when provided".to_string(),
                ))
            }
        };
        Ok(NewEvent {
            category,
            action,
            context,
        })
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct LoggedEvent {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

pub async fn log_event(
    db: &PgPool,
    user_id: Uuid,
    event: &NewEvent,
) -> Result<LoggedEvent, sqlx::Error> {
    sqlx::query_as(
        r#"
        INSERT INTO events (user_id, category, action, context)
        VALUES ($1, $2, $3, $4)
        RETURNING id, created_at
        "#,
    )
    .bind(user_id)
    .bind(&event.category)
    .bind(&event.action)
    .bind(event.context.as_ref().map(sqlx::types::Json))
    .fetch_one(db)
    .await
}

/// POST /api/events/log
pub async fn handle_log_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<EventRequest>,
) -> Result<Json<LoggedEvent>, AppError> {
    let event = req.validate()?;
    let logged = log_event(&state.db, user.id, &event).await.map_err(|e| {
        warn!("Failed to log event {}/{}", event.category, event.action);
        AppError::Database(e)
    })?;
    debug!(
        "Logged event {} ({}/{}) for user {}",
        logged.id, event.category, event.action, user.id
    );
    Ok(Json(logged))
}
