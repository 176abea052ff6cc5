//! Vote ledger: one vote per (topic, account), counted per topic.

use chrono::{DateTime, Utc};

use super::{new_id, Engine};
use crate::db;
use crate::errors::AppError;
use crate::models::Vote;

impl Engine {
    /// Record a vote and return the topic's new total.
    ///
    /// A repeat vote fails with `AlreadyVoted` and leaves the count unchanged.
    pub async fn cast_vote(
        &self,
        topic_id: &str,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> Result<i64, AppError> {
        if account_id.trim().is_empty() {
            return Err(AppError::Validation("Account is required".to_string()));
        }

        let mut tx = self.repo.begin_write().await?;
        if db::get_topic(&mut tx, topic_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Topic {} not found", topic_id)));
        }

        let vote = Vote {
            id: new_id(),
            topic_id: topic_id.to_string(),
            account_id: account_id.to_string(),
            created_at: now,
        };
        db::save_vote(&mut tx, &vote).await?;
        let count = db::count_votes_for_topic(&mut tx, topic_id).await?;
        tx.commit().await?;

        tracing::info!(topic_id = %topic_id, votes = count, "Vote cast");
        Ok(count)
    }

    pub async fn count_votes(&self, topic_id: &str) -> Result<i64, AppError> {
        let mut conn = self.repo.acquire().await?;
        if db::get_topic(&mut conn, topic_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Topic {} not found", topic_id)));
        }
        db::count_votes_for_topic(&mut conn, topic_id).await
    }

    pub async fn has_voted(&self, topic_id: &str, account_id: &str) -> Result<bool, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::has_vote(&mut conn, topic_id, account_id).await
    }

    /// Start a fresh voting round for a topic.
    ///
    /// The scheduler does this on completion and bump; it is exposed for
    /// maintenance only.
    pub async fn clear_votes(&self, topic_id: &str) -> Result<u64, AppError> {
        let mut tx = self.repo.begin_write().await?;
        let removed = db::delete_votes_for_topic(&mut tx, topic_id).await?;
        tx.commit().await?;

        tracing::info!(topic_id = %topic_id, removed, "Cleared votes");
        Ok(removed)
    }
}
