//! Rotor theme persistence.

use sqlx::{Row, SqliteConnection};

use crate::errors::AppError;
use crate::models::RotorTheme;

/// Insert or update a theme.
pub async fn save_theme(conn: &mut SqliteConnection, theme: &RotorTheme) -> Result<(), AppError> {
    sqlx::query(
        r#"INSERT INTO rotor_themes (id, rotor_id, name, position, hidden) VALUES (?, ?, ?, ?, ?)
           ON CONFLICT(id) DO UPDATE SET
               name = excluded.name, position = excluded.position, hidden = excluded.hidden"#,
    )
    .bind(&theme.id)
    .bind(&theme.rotor_id)
    .bind(&theme.name)
    .bind(theme.position)
    .bind(theme.hidden as i32)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Get a theme by ID.
pub async fn get_theme(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<RotorTheme>, AppError> {
    let row =
        sqlx::query("SELECT id, rotor_id, name, position, hidden FROM rotor_themes WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(row.as_ref().map(theme_from_row))
}

/// List the themes of a rotor in display order.
pub async fn list_themes_by_rotor(
    conn: &mut SqliteConnection,
    rotor_id: &str,
) -> Result<Vec<RotorTheme>, AppError> {
    let rows = sqlx::query(
        r#"SELECT id, rotor_id, name, position, hidden FROM rotor_themes
           WHERE rotor_id = ? ORDER BY position, name, id"#,
    )
    .bind(rotor_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(theme_from_row).collect())
}

/// Delete a theme; its topics, schedules and votes cascade.
pub async fn delete_theme(conn: &mut SqliteConnection, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM rotor_themes WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Theme {} not found", id)));
    }

    Ok(())
}

fn theme_from_row(row: &sqlx::sqlite::SqliteRow) -> RotorTheme {
    let hidden: i32 = row.get("hidden");
    RotorTheme {
        id: row.get("id"),
        rotor_id: row.get("rotor_id"),
        name: row.get("name"),
        position: row.get("position"),
        hidden: hidden != 0,
    }
}
