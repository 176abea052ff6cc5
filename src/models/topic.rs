//! Topic model: a single teachable unit within a theme.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Duration assumed when none (or zero) is given.
pub const DEFAULT_DURATION_WEEKS: i64 = 1;

/// Longest teaching block a topic or an extension may ask for.
pub const MAX_DURATION_WEEKS: i64 = 520;

/// A topic within a rotor theme, queued by `position`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub theme_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_weeks: i64,
    pub position: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_covered: Option<DateTime<Utc>>,
}

/// Request body for creating a new topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub duration_weeks: i64,
    #[serde(default)]
    pub position: i64,
}

/// Request body for updating an existing topic.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTopicRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_weeks: Option<i64>,
}

/// Request body for reordering the topics of a theme.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTopicsRequest {
    pub topic_ids: Vec<String>,
}

/// Normalize a requested duration: zero means the default, negatives are rejected.
pub fn normalize_duration(weeks: i64) -> Option<i64> {
    match weeks {
        w if !(0..=MAX_DURATION_WEEKS).contains(&w) => None,
        0 => Some(DEFAULT_DURATION_WEEKS),
        w => Some(w),
    }
}
