use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Raw `memories` row as stored. `metadata` is free-form jsonb on disk.
#[derive(Debug, Clone, FromRow)]
pub struct MemoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// A user-scoped, append-only memory entry with typed metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// `None` when the stored metadata is absent or carries an unknown `type`.
    pub metadata: Option<MemoryMetadata>,
    pub created_at: DateTime<Utc>,
}

impl MemoryRecord {
    pub fn is_reflection(&self) -> bool {
        matches!(self.metadata, Some(MemoryMetadata::Reflection { .. }))
    }

    pub fn is_mentor_advice(&self) -> bool {
        matches!(self.metadata, Some(MemoryMetadata::MentorAdvice { .. }))
    }
}

impl From<MemoryRow> for MemoryRecord {
    fn from(row: MemoryRow) -> Self {
        let metadata = row
            .metadata
            .and_then(|v| serde_json::from_value::<MemoryMetadata>(v).ok());
        MemoryRecord {
            id: row.id,
            user_id: row.user_id,
            content: row.content,
            metadata,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReflectionOutcome {
    #[default]
    Failure,
    Success,
    #[serde(other)]
    Unknown,
}

/// Decodes a field, falling back to its default on `null` or a wrong type,
/// so one bad field does not untype the whole record.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Accepts integers, whole floats and numeric strings; anything else counts as 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    Ok(count.map_or(0, |c| c as usize))
}

/// Metadata per memory type. Serialized with a `type` discriminator so rows
/// stay readable by anything that expects `metadata.type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MemoryMetadata {
    UserInput {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        context: Option<String>,
    },
    MentorAdvice {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        context: Option<String>,
        /// The message that produced this advice.
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        user_input: Option<String>,
    },
    Reflection {
        #[serde(default, deserialize_with = "lenient")]
        outcome: ReflectionOutcome,
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        source_feedback: Option<String>,
    },
    Trajectory {
        #[serde(default, deserialize_with = "lenient")]
        decision_context: String,
        #[serde(default, deserialize_with = "lenient_count")]
        trajectories_count: usize,
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        context: Option<String>,
    },
    UserProfile {
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        context: Option<String>,
        #[serde(default, deserialize_with = "lenient")]
        profile_data: Value,
        #[serde(
            default,
            deserialize_with = "lenient",
            skip_serializing_if = "Option::is_none"
        )]
        confidence_score: Option<f64>,
    },
}

impl MemoryMetadata {
    pub fn type_str(&self) -> &'static str {
        match self {
            MemoryMetadata::UserInput { .. } => "user_input",
            MemoryMetadata::MentorAdvice { .. } => "mentor_advice",
            MemoryMetadata::Reflection { .. } => "reflection",
            MemoryMetadata::Trajectory { .. } => "trajectory",
            MemoryMetadata::UserProfile { .. } => "user_profile",
        }
    }
}
