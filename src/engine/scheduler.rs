//! Topic scheduler: drives what each theme is teaching right now.
//!
//! Per theme the state is either idle (no active schedule) or active (exactly
//! one schedule with status `active`). Completed and skipped schedules are
//! history. Every transition below holds the theme lock and commits as one
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;

use super::catalog::TopicQueue;
use super::locks::theme_key;
use super::{new_id, Engine};
use crate::db;
use crate::errors::AppError;
use crate::models::{
    weeks_after, ScheduleAction, ScheduleOutcome, ScheduleStatus, Topic, TopicSchedule,
    MAX_DURATION_WEEKS,
};

/// How a running schedule is closed when something else takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close {
    /// Taught to completion: stamp `last_covered` and reset the topic's votes.
    Covered,
    /// Superseded by a bump: status only.
    Superseded,
    /// Not taught: status only.
    Skipped,
}

impl Engine {
    /// Run one scheduler transition.
    pub async fn apply_schedule_action(
        &self,
        theme_id: &str,
        action: ScheduleAction,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        match action {
            ScheduleAction::Activate { topic_id } => self.activate_topic(theme_id, &topic_id, now).await,
            ScheduleAction::Complete => self.complete_topic(theme_id, now).await,
            ScheduleAction::Skip => self.skip_topic(theme_id, now).await,
            ScheduleAction::Extend { weeks } => self.extend_topic(theme_id, weeks).await,
        }
    }

    /// Start teaching `topic_id`; whatever was running is completed first.
    pub async fn activate_topic(
        &self,
        theme_id: &str,
        topic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let topic = topic_in_theme(&mut tx, theme_id, topic_id).await?;
        let running = db::get_active_schedule_for_theme(&mut tx, theme_id).await?;
        let ended = match running {
            Some(running) => Some(close_schedule(&mut tx, running, Close::Covered, now).await?),
            None => None,
        };
        let started = start_schedule(&mut tx, &topic, now).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme_id, topic_id = %topic_id, "Activated topic");
        Ok(ScheduleOutcome {
            ended,
            active: Some(started),
        })
    }

    /// Complete the running topic and auto-advance to the next one in queue order.
    pub async fn complete_topic(
        &self,
        theme_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let running = require_active(&mut tx, theme_id).await?;
        let completed = close_schedule(&mut tx, running, Close::Covered, now).await?;

        let queue = TopicQueue::new(db::list_topics_by_theme(&mut tx, theme_id).await?);
        let started = match queue.next_after(&completed.topic_id) {
            Some(next) => Some(start_schedule(&mut tx, next, now).await?),
            None => {
                tracing::debug!(theme_id = %theme_id, "No topic to advance to; theme is idle");
                None
            }
        };
        tx.commit().await?;

        tracing::info!(
            theme_id = %theme_id,
            completed_topic_id = %completed.topic_id,
            next_topic_id = started.as_ref().map(|s| s.topic_id.as_str()).unwrap_or("-"),
            "Completed topic"
        );
        Ok(ScheduleOutcome {
            ended: Some(completed),
            active: started,
        })
    }

    /// Stop the running topic without claiming it was taught. Does not advance.
    pub async fn skip_topic(
        &self,
        theme_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let running = require_active(&mut tx, theme_id).await?;
        let skipped = close_schedule(&mut tx, running, Close::Skipped, now).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme_id, topic_id = %skipped.topic_id, "Skipped topic");
        Ok(ScheduleOutcome {
            ended: Some(skipped),
            active: None,
        })
    }

    /// Push the running topic's end date out by `max(weeks, 1)` weeks.
    pub async fn extend_topic(
        &self,
        theme_id: &str,
        extra_weeks: i64,
    ) -> Result<ScheduleOutcome, AppError> {
        if extra_weeks > MAX_DURATION_WEEKS {
            return Err(AppError::Validation(format!(
                "Cannot extend by more than {} weeks",
                MAX_DURATION_WEEKS
            )));
        }

        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let mut running = require_active(&mut tx, theme_id).await?;
        running.end_date = weeks_after(running.end_date, extra_weeks.max(1))?;
        db::save_schedule(&mut tx, &running).await?;
        tx.commit().await?;

        tracing::info!(
            theme_id = %theme_id,
            topic_id = %running.topic_id,
            end_date = %running.end_date,
            "Extended topic"
        );
        Ok(ScheduleOutcome {
            ended: None,
            active: Some(running),
        })
    }

    /// Jump the queue: start `topic_id` now and reset its votes.
    ///
    /// The running schedule is closed as completed but its topic is not
    /// marked covered, and no auto-advance happens.
    pub async fn bump_topic(
        &self,
        theme_id: &str,
        topic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ScheduleOutcome, AppError> {
        let _guard = self.locks.lock(theme_key(theme_id)).await;
        let mut tx = self.repo.begin_write().await?;

        let topic = topic_in_theme(&mut tx, theme_id, topic_id).await?;
        let running = db::get_active_schedule_for_theme(&mut tx, theme_id).await?;
        let ended = match running {
            Some(running) => Some(close_schedule(&mut tx, running, Close::Superseded, now).await?),
            None => None,
        };
        let started = start_schedule(&mut tx, &topic, now).await?;
        db::delete_votes_for_topic(&mut tx, topic_id).await?;
        tx.commit().await?;

        tracing::info!(theme_id = %theme_id, topic_id = %topic_id, "Bumped topic");
        Ok(ScheduleOutcome {
            ended,
            active: Some(started),
        })
    }

    /// The schedule a theme is currently teaching, if any.
    pub async fn get_active_schedule(&self, theme_id: &str) -> Result<Option<TopicSchedule>, AppError> {
        let mut conn = self.repo.acquire().await?;
        db::get_active_schedule_for_theme(&mut conn, theme_id).await
    }

    /// Schedule history of a theme, newest first.
    pub async fn list_schedules(&self, theme_id: &str) -> Result<Vec<TopicSchedule>, AppError> {
        let mut conn = self.repo.acquire().await?;
        if db::get_theme(&mut conn, theme_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
        }
        db::list_schedules_by_theme(&mut conn, theme_id).await
    }
}

async fn require_active(
    conn: &mut SqliteConnection,
    theme_id: &str,
) -> Result<TopicSchedule, AppError> {
    if db::get_theme(conn, theme_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
    }
    db::get_active_schedule_for_theme(conn, theme_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("no active schedule for theme {}", theme_id)))
}

async fn topic_in_theme(
    conn: &mut SqliteConnection,
    theme_id: &str,
    topic_id: &str,
) -> Result<Topic, AppError> {
    if db::get_theme(conn, theme_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Theme {} not found", theme_id)));
    }
    match db::get_topic(conn, topic_id).await? {
        Some(topic) if topic.theme_id == theme_id => Ok(topic),
        _ => Err(AppError::NotFound(format!(
            "Topic {} not found in theme {}",
            topic_id, theme_id
        ))),
    }
}

async fn start_schedule(
    conn: &mut SqliteConnection,
    topic: &Topic,
    now: DateTime<Utc>,
) -> Result<TopicSchedule, AppError> {
    let schedule = TopicSchedule {
        id: new_id(),
        topic_id: topic.id.clone(),
        theme_id: topic.theme_id.clone(),
        start_date: now,
        end_date: weeks_after(now, topic.duration_weeks.max(1))?,
        status: ScheduleStatus::Active,
    };
    db::save_schedule(conn, &schedule).await?;
    Ok(schedule)
}

async fn close_schedule(
    conn: &mut SqliteConnection,
    mut schedule: TopicSchedule,
    how: Close,
    now: DateTime<Utc>,
) -> Result<TopicSchedule, AppError> {
    schedule.status = match how {
        Close::Covered | Close::Superseded => ScheduleStatus::Completed,
        Close::Skipped => ScheduleStatus::Skipped,
    };
    schedule.end_date = now;
    db::save_schedule(&mut *conn, &schedule).await?;

    if how == Close::Covered {
        db::mark_topic_covered(&mut *conn, &schedule.topic_id, now).await?;
        db::delete_votes_for_topic(&mut *conn, &schedule.topic_id).await?;
    }
    Ok(schedule)
}
