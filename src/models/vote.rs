//! Vote model: one vote per (topic, account).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: String,
    pub topic_id: String,
    pub account_id: String,
    pub created_at: DateTime<Utc>,
}

/// Request body for casting a vote.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub account_id: String,
}

/// Vote total for a topic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount {
    pub topic_id: String,
    pub votes: i64,
    /// Present when the caller named an account
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
}

/// Query parameters for reading a vote count.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteQuery {
    #[serde(default)]
    pub account_id: Option<String>,
}
