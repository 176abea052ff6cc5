//! Rotor and rotor theme models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a rotor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotorStatus {
    Draft,
    Active,
    Archived,
}

impl RotorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RotorStatus::Draft => "draft",
            RotorStatus::Active => "active",
            RotorStatus::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(RotorStatus::Draft),
            "active" => Some(RotorStatus::Active),
            "archived" => Some(RotorStatus::Archived),
            _ => None,
        }
    }
}

/// A versioned curriculum definition for one class type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rotor {
    pub id: String,
    pub class_type_id: String,
    pub name: String,
    /// Strictly increasing within a class type, starting at 1
    pub version: i64,
    pub status: RotorStatus,
    /// Lets coaches preview a draft without activating it
    pub preview_on: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_at: Option<DateTime<Utc>>,
}

/// A named track of topics within a rotor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotorTheme {
    pub id: String,
    pub rotor_id: String,
    pub name: String,
    pub position: i64,
    /// Excluded from member-facing views
    pub hidden: bool,
}

/// Request body for creating a new rotor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRotorRequest {
    pub name: String,
    pub created_by: String,
}

/// Request body for renaming a rotor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRotorRequest {
    pub name: String,
}

/// Request body for adding a theme to a draft rotor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateThemeRequest {
    pub name: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub hidden: bool,
}

/// Request body for updating an existing theme.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThemeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<i64>,
    #[serde(default)]
    pub hidden: Option<bool>,
}
