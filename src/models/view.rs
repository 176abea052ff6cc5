//! Read models assembled for curriculum display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Rotor, RotorStatus, RotorTheme, Topic, TopicSchedule};

/// Who is looking at the curriculum.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    #[default]
    Member,
    Coach,
}

impl ViewerRole {
    /// Coaches see hidden themes and preview-enabled drafts.
    pub fn is_coach(&self) -> bool {
        matches!(self, ViewerRole::Coach)
    }
}

/// Compact rotor description for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RotorSummary {
    pub id: String,
    pub name: String,
    pub version: i64,
    pub status: RotorStatus,
    pub preview_on: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

impl From<&Rotor> for RotorSummary {
    fn from(rotor: &Rotor) -> Self {
        Self {
            id: rotor.id.clone(),
            name: rotor.name.clone(),
            version: rotor.version,
            status: rotor.status,
            preview_on: rotor.preview_on,
            activated_at: rotor.activated_at,
        }
    }
}

/// One class type in the curriculum overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewEntry {
    pub class_type_id: String,
    pub active_rotor: Option<RotorSummary>,
    /// Newest preview-enabled draft; only filled in for coaches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_rotor: Option<RotorSummary>,
}

/// A topic annotated for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicView {
    #[serde(flatten)]
    pub topic: Topic,
    pub votes: i64,
    pub is_active: bool,
    pub has_voted: bool,
}

/// A theme with its queued topics and active schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeView {
    #[serde(flatten)]
    pub theme: RotorTheme,
    pub active_schedule: Option<TopicSchedule>,
    pub topics: Vec<TopicView>,
}

/// Full curriculum for one class type.
///
/// `rotor` is `None` when the class type has no active rotor; that is a
/// normal state rather than an error.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumView {
    pub class_type_id: String,
    pub rotor: Option<RotorSummary>,
    pub themes: Vec<ThemeView>,
}

/// Query parameters for curriculum reads.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewQuery {
    #[serde(default)]
    pub role: ViewerRole,
    #[serde(default)]
    pub account_id: Option<String>,
}
