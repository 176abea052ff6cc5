//! Topic persistence.

use sqlx::{Row, SqliteConnection};

use crate::errors::AppError;
use crate::models::Topic;

const TOPIC_COLUMNS: &str = "id, theme_id, name, description, duration_weeks, position, last_covered";

/// Insert or update a topic.
pub async fn save_topic(conn: &mut SqliteConnection, topic: &Topic) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO topics (id, theme_id, name, description, duration_weeks, position, last_covered)
           VALUES (?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               name = excluded.name,
               description = excluded.description,
               duration_weeks = excluded.duration_weeks,
               position = excluded.position,
               last_covered = excluded.last_covered"#,
    )
    .bind(&topic.id)
    .bind(&topic.theme_id)
    .bind(&topic.name)
    .bind(&topic.description)
    .bind(topic.duration_weeks)
    .bind(topic.position)
    .bind(topic.last_covered)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a topic by ID.
pub async fn get_topic(conn: &mut SqliteConnection, id: &str) -> Result<Option<Topic>, AppError> {
    let row = sqlx::query(&format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(topic_from_row))
}

/// List the topics of a theme in queue order.
pub async fn list_topics_by_theme(
    conn: &mut SqliteConnection,
    theme_id: &str,
) -> Result<Vec<Topic>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {TOPIC_COLUMNS} FROM topics WHERE theme_id = ? ORDER BY position, name, id"
    ))
    .bind(theme_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(topic_from_row).collect())
}

/// Write a new position for each `(topic_id, position)` pair of a theme.
pub async fn set_topic_positions(
    conn: &mut SqliteConnection,
    theme_id: &str,
    positions: &[(String, i64)],
) -> Result<(), AppError> {
    for (topic_id, position) in positions {
        let result = sqlx::query("UPDATE topics SET position = ? WHERE id = ? AND theme_id = ?")
            .bind(position)
            .bind(topic_id)
            .bind(theme_id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Topic {} not found in theme {}",
                topic_id, theme_id
            )));
        }
    }

    Ok(())
}

/// Stamp the time a topic was last taught to completion.
pub async fn mark_topic_covered(
    conn: &mut SqliteConnection,
    id: &str,
    at: chrono::DateTime<chrono::Utc>,
) -> Result<(), AppError> {
    sqlx::query("UPDATE topics SET last_covered = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Delete a topic; its schedules and votes cascade.
pub async fn delete_topic(conn: &mut SqliteConnection, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM topics WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Topic {} not found", id)));
    }

    Ok(())
}

fn topic_from_row(row: &sqlx::sqlite::SqliteRow) -> Topic {
    Topic {
        id: row.get("id"),
        theme_id: row.get("theme_id"),
        name: row.get("name"),
        description: row.get("description"),
        duration_weeks: row.get("duration_weeks"),
        position: row.get("position"),
        last_covered: row.get("last_covered"),
    }
}
