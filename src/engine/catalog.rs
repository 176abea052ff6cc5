//! Topic catalog: the ordered queue of topics inside a theme.

use super::locks::theme_key;
use super::{new_id, require_name, Engine};
use crate::db;
use crate::errors::AppError;
use crate::models::{
    normalize_duration, CreateTopicRequest, Topic, UpdateTopicRequest, MAX_DURATION_WEEKS,
};

/// Topics of one theme in queue order.
///
/// The same total order serves display, reordering and auto-advance, so
/// "next after X" always agrees with what readers see.
#[derive(Debug, Clone)]
pub struct TopicQueue {
    topics: Vec<Topic>,
}

impl TopicQueue {
    /// Build a queue from topics already sorted by position.
    pub fn new(topics: Vec<Topic>) -> Self {
        Self { topics }
    }

    /// The topic that follows `topic_id`, wrapping from last to first.
    ///
    /// A single-topic queue wraps onto itself. Returns `None` when the queue
    /// is empty or `topic_id` is no longer part of it.
    pub fn next_after(&self, topic_id: &str) -> Option<&Topic> {
        let index = self.topics.iter().position(|t| t.id == topic_id)?;
        self.topics.get((index + 1) % self.topics.len())
    }
}

fn validate_duration(weeks: i64) -> Result<i64, AppError> {
    normalize_duration(weeks).ok_or_else(|| {
        AppError::Validation(format!(
            "Duration must be between 0 and {} weeks",
            MAX_DURATION_WEEKS
        ))
    })
}

impl Engine {
    /// Add a topic to a theme. A zero duration becomes the one-week default.
    pub async fn add_topic(
        &self,
        theme_id: &str,
        request: CreateTopicRequest,
    ) -> Result<Topic, AppError> {
        let name = require_name(&request.name, "Topic")?;
        let duration_weeks = validate_duration(request.duration_weeks)?;

        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        if db::get_theme(&mut tx, theme_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
        }

        let topic = Topic {
            id: new_id(),
            theme_id: theme_id.to_string(),
            name,
            description: request.description,
            duration_weeks,
            position: request.position,
            last_covered: None,
        };
        db::save_topic(&mut tx, &topic).await?;
        tx.commit().await?;

        tracing::info!(topic_id = %topic.id, theme_id = %theme_id, "Added topic");
        Ok(topic)
    }

    /// Apply a partial update, validating the merged result.
    pub async fn update_topic(
        &self,
        topic_id: &str,
        patch: UpdateTopicRequest,
    ) -> Result<Topic, AppError> {
        let mut tx = self.repo.begin_write().await?;

        let mut topic = db::get_topic(&mut tx, topic_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic_id)))?;

        if let Some(name) = patch.name {
            topic.name = name;
        }
        if let Some(description) = patch.description {
            topic.description = description;
        }
        if let Some(weeks) = patch.duration_weeks {
            topic.duration_weeks = weeks;
        }
        topic.name = require_name(&topic.name, "Topic")?;
        topic.duration_weeks = validate_duration(topic.duration_weeks)?;

        db::save_topic(&mut tx, &topic).await?;
        tx.commit().await?;

        Ok(topic)
    }

    /// Delete a topic. An active schedule for it goes with it, leaving the theme idle.
    pub async fn delete_topic(&self, topic_id: &str) -> Result<(), AppError> {
        let topic = self.get_topic(topic_id).await?;

        let _guard = self.locks.lock(theme_key(&topic.theme_id)).await;
        let mut tx = self.repo.begin_write().await?;
        db::delete_topic(&mut tx, topic_id).await?;
        tx.commit().await?;

        tracing::info!(topic_id = %topic_id, theme_id = %topic.theme_id, "Deleted topic");
        Ok(())
    }

    /// Set each listed topic's position to its index in `ordered_ids`.
    ///
    /// Topics of the theme missing from the list keep their relative order
    /// and move behind the listed ones. The whole reorder commits at once.
    pub async fn reorder_topics(
        &self,
        theme_id: &str,
        ordered_ids: &[String],
    ) -> Result<Vec<Topic>, AppError> {
        if ordered_ids.is_empty() {
            return Err(AppError::Validation("No topic IDs provided".to_string()));
        }

        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        if db::get_theme(&mut tx, theme_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
        }
        let current = db::list_topics_by_theme(&mut tx, theme_id).await?;

        let mut positions: Vec<(String, i64)> = Vec::with_capacity(current.len());
        for id in ordered_ids {
            if positions.iter().any(|(seen, _)| seen == id) {
                return Err(AppError::Validation(format!("Topic {} listed twice", id)));
            }
            if !current.iter().any(|t| &t.id == id) {
                return Err(AppError::Validation(format!(
                    "Topic {} does not belong to theme {}",
                    id, theme_id
                )));
            }
            positions.push((id.clone(), positions.len() as i64));
        }
        for topic in &current {
            if !ordered_ids.contains(&topic.id) {
                positions.push((topic.id.clone(), positions.len() as i64));
            }
        }

        db::set_topic_positions(&mut tx, theme_id, &positions).await?;
        let reordered = db::list_topics_by_theme(&mut tx, theme_id).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme_id, topics = reordered.len(), "Reordered topics");
        Ok(reordered)
    }

    /// Topics of a theme, ordered by position.
    pub async fn list_topics_by_theme(&self, theme_id: &str) -> Result<Vec<Topic>, AppError> {
        let mut conn = self.repo.acquire().await?;
        if db::get_theme(&mut conn, theme_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
        }
        db::list_topics_by_theme(&mut conn, theme_id).await
    }

    pub async fn get_topic(&self, topic_id: &str) -> Result<Topic, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::get_topic(&mut conn, topic_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic {} not found", topic_id)))
    }
}
