//! Topic schedule model: which topic a theme is teaching, and when.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Status of a single schedule instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Active,
    Completed,
    Skipped,
}

impl ScheduleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Active => "active",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ScheduleStatus::Active),
            "completed" => Some(ScheduleStatus::Completed),
            "skipped" => Some(ScheduleStatus::Skipped),
            _ => None,
        }
    }
}

/// A topic being taught in a theme over a date range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicSchedule {
    pub id: String,
    pub topic_id: String,
    pub theme_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: ScheduleStatus,
}

/// The instant `weeks` weeks after `start`.
///
/// Fails with a validation error instead of overflowing the calendar.
pub fn weeks_after(start: DateTime<Utc>, weeks: i64) -> Result<DateTime<Utc>, AppError> {
    TimeDelta::try_weeks(weeks)
        .and_then(|offset| start.checked_add_signed(offset))
        .ok_or_else(|| {
            AppError::Validation(format!("{} weeks after {} is out of range", weeks, start))
        })
}

/// A scheduler transition for one theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleAction {
    Activate { topic_id: String },
    Complete,
    Skip,
    Extend { weeks: i64 },
}

/// Wire name of a scheduler transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleActionKind {
    Activate,
    Complete,
    Skip,
    Extend,
}

/// Request body for the schedule action endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleActionRequest {
    pub action: ScheduleActionKind,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub weeks: Option<i64>,
}

impl TryFrom<ScheduleActionRequest> for ScheduleAction {
    type Error = AppError;

    fn try_from(request: ScheduleActionRequest) -> Result<Self, Self::Error> {
        match request.action {
            ScheduleActionKind::Activate => match request.topic_id {
                Some(topic_id) if !topic_id.trim().is_empty() => {
                    Ok(ScheduleAction::Activate { topic_id })
                }
                _ => Err(AppError::Validation(
                    "topicId is required to activate a topic".to_string(),
                )),
            },
            ScheduleActionKind::Complete => Ok(ScheduleAction::Complete),
            ScheduleActionKind::Skip => Ok(ScheduleAction::Skip),
            ScheduleActionKind::Extend => Ok(ScheduleAction::Extend {
                weeks: request.weeks.unwrap_or(1),
            }),
        }
    }
}

/// Request body for bumping a topic to active.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BumpTopicRequest {
    pub topic_id: String,
}

/// Result of a scheduler transition.
///
/// `ended` is the schedule that was completed or skipped by the transition;
/// `active` is the schedule running for the theme afterwards, if any.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    pub ended: Option<TopicSchedule>,
    pub active: Option<TopicSchedule>,
}
