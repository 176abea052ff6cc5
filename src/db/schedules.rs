//! Topic schedule persistence.

use sqlx::{Row, SqliteConnection};

use crate::errors::{is_unique_violation, AppError};
use crate::models::{ScheduleStatus, TopicSchedule};

const SCHEDULE_COLUMNS: &str = "id, topic_id, theme_id, start_date, end_date, status";

/// Insert or update a schedule.
///
/// A second active schedule for the same theme is rejected by the store.
pub async fn save_schedule(
    conn: &mut SqliteConnection,
    schedule: &TopicSchedule,
) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"INSERT INTO topic_schedules (id, topic_id, theme_id, start_date, end_date, status)
           VALUES (?, ?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               start_date = excluded.start_date,
               end_date = excluded.end_date,
               status = excluded.status"#,
    )
    .bind(&schedule.id)
    .bind(&schedule.topic_id)
    .bind(&schedule.theme_id)
    .bind(schedule.start_date)
    .bind(schedule.end_date)
    .bind(schedule.status.as_str())
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Theme {} already has an active schedule",
            schedule.theme_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Get the active schedule of a theme, if any.
pub async fn get_active_schedule_for_theme(
    conn: &mut SqliteConnection,
    theme_id: &str,
) -> Result<Option<TopicSchedule>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {SCHEDULE_COLUMNS} FROM topic_schedules WHERE theme_id = ? AND status = 'active'"
    ))
    .bind(theme_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(schedule_from_row))
}

/// Schedule history of a theme, newest first.
pub async fn list_schedules_by_theme(
    conn: &mut SqliteConnection,
    theme_id: &str,
) -> Result<Vec<TopicSchedule>, AppError> {
    let rows = sqlx::query(&format!(
        r#"SELECT {SCHEDULE_COLUMNS} FROM topic_schedules
           WHERE theme_id = ? ORDER BY start_date DESC, rowid DESC"#
    ))
    .bind(theme_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(schedule_from_row).collect())
}

fn schedule_from_row(row: &sqlx::sqlite::SqliteRow) -> TopicSchedule {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let status = ScheduleStatus::from_str(&status).unwrap_or_else(|| {
        tracing::warn!(schedule_id = %id, status = %status, "Unknown schedule status; treating as completed");
        ScheduleStatus::Completed
    });
    TopicSchedule {
        id,
        topic_id: row.get("topic_id"),
        theme_id: row.get("theme_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status,
    }
}
