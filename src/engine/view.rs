//! Curriculum view assembler. Read-only.

use sqlx::SqliteConnection;

use super::Engine;
use crate::db;
use crate::errors::AppError;
use crate::models::{
    CurriculumView, OverviewEntry, RotorSummary, RotorTheme, ThemeView, TopicView, ViewerRole,
};

impl Engine {
    /// Active rotor summary for every known class type.
    pub async fn get_overview(&self, role: ViewerRole) -> Result<Vec<OverviewEntry>, AppError> {
        let mut conn = self.repo.acquire().await?;

        let mut entries = Vec::new();
        for class_type_id in db::list_class_type_ids(&mut conn).await? {
            let active_rotor = db::get_active_rotor(&mut conn, &class_type_id)
                .await?
                .as_ref()
                .map(RotorSummary::from);
            let preview_rotor = if role.is_coach() {
                db::get_preview_rotor(&mut conn, &class_type_id)
                    .await?
                    .as_ref()
                    .map(RotorSummary::from)
            } else {
                None
            };
            entries.push(OverviewEntry {
                class_type_id,
                active_rotor,
                preview_rotor,
            });
        }

        Ok(entries)
    }

    /// The active curriculum of a class type with votes and the running topic per theme.
    ///
    /// Members do not see hidden themes. `account_id`, when given, fills in
    /// `has_voted` on each topic.
    pub async fn get_view(
        &self,
        class_type_id: &str,
        role: ViewerRole,
        account_id: Option<&str>,
    ) -> Result<CurriculumView, AppError> {
        let mut conn = self.repo.acquire().await?;

        let Some(rotor) = db::get_active_rotor(&mut conn, class_type_id).await? else {
            return Ok(CurriculumView {
                class_type_id: class_type_id.to_string(),
                rotor: None,
                themes: Vec::new(),
            });
        };

        let mut themes = Vec::new();
        for theme in db::list_themes_by_rotor(&mut conn, &rotor.id).await? {
            if theme.hidden && !role.is_coach() {
                continue;
            }
            themes.push(theme_view(&mut conn, theme, account_id).await?);
        }

        Ok(CurriculumView {
            class_type_id: class_type_id.to_string(),
            rotor: Some(RotorSummary::from(&rotor)),
            themes,
        })
    }
}

async fn theme_view(
    conn: &mut SqliteConnection,
    theme: RotorTheme,
    account_id: Option<&str>,
) -> Result<ThemeView, AppError> {
    let active_schedule = db::get_active_schedule_for_theme(conn, &theme.id).await?;
    let active_topic_id = active_schedule.as_ref().map(|s| s.topic_id.as_str());

    let mut topics = Vec::new();
    for topic in db::list_topics_by_theme(conn, &theme.id).await? {
        let votes = db::count_votes_for_topic(conn, &topic.id).await?;
        let has_voted = match account_id {
            Some(account_id) => db::has_vote(conn, &topic.id, account_id).await?,
            None => false,
        };
        let is_active = active_topic_id == Some(topic.id.as_str());
        topics.push(TopicView {
            topic,
            votes,
            is_active,
            has_voted,
        });
    }

    Ok(ThemeView {
        theme,
        active_schedule,
        topics,
    })
}
