//! Rotor persistence.

use sqlx::{Row, SqliteConnection};

use crate::errors::{is_unique_violation, AppError};
use crate::models::{Rotor, RotorStatus};

const ROTOR_COLUMNS: &str =
    "id, class_type_id, name, version, status, preview_on, created_by, created_at, activated_at";

/// Reserve the next version number for a class type.
///
/// The number is one more than both the highest version ever handed out and
/// the highest version still stored, so deleting a draft never frees its number.
pub async fn next_rotor_version(
    conn: &mut SqliteConnection,
    class_type_id: &str,
) -> Result<i64, AppError> {
    let issued: Option<i64> =
        sqlx::query_scalar("SELECT last_version FROM rotor_versions WHERE class_type_id = ?")
            .bind(class_type_id)
            .fetch_optional(&mut *conn)
            .await?;
    let stored: Option<i64> =
        sqlx::query_scalar("SELECT MAX(version) FROM rotors WHERE class_type_id = ?")
            .bind(class_type_id)
            .fetch_one(&mut *conn)
            .await?;

    let next = issued.unwrap_or(0).max(stored.unwrap_or(0)) + 1;

    sqlx::query(
        r#"INSERT INTO rotor_versions (class_type_id, last_version) VALUES (?, ?)
           ON CONFLICT(class_type_id) DO UPDATE SET last_version = excluded.last_version"#,
    )
    .bind(class_type_id)
    .bind(next)
    .execute(&mut *conn)
    .await?;

    Ok(next)
}

/// Insert a new rotor.
pub async fn insert_rotor(conn: &mut SqliteConnection, rotor: &Rotor) -> Result<(), AppError> {
    let result = sqlx::query(
        r#"INSERT INTO rotors (id, class_type_id, name, version, status, preview_on, created_by, created_at, activated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(&rotor.id)
    .bind(&rotor.class_type_id)
    .bind(&rotor.name)
    .bind(rotor.version)
    .bind(rotor.status.as_str())
    .bind(rotor.preview_on as i32)
    .bind(&rotor.created_by)
    .bind(rotor.created_at)
    .bind(rotor.activated_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Version {} already exists for class type {}",
            rotor.version, rotor.class_type_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Persist the mutable fields of an existing rotor.
pub async fn save_rotor(conn: &mut SqliteConnection, rotor: &Rotor) -> Result<(), AppError> {
    let result = sqlx::query(
        "UPDATE rotors SET name = ?, status = ?, preview_on = ?, activated_at = ? WHERE id = ?",
    )
    .bind(&rotor.name)
    .bind(rotor.status.as_str())
    .bind(rotor.preview_on as i32)
    .bind(rotor.activated_at)
    .bind(&rotor.id)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(AppError::NotFound(format!("Rotor {} not found", rotor.id)))
        }
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(AppError::Conflict(format!(
            "Another rotor is already active for class type {}",
            rotor.class_type_id
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Get a rotor by ID.
pub async fn get_rotor(conn: &mut SqliteConnection, id: &str) -> Result<Option<Rotor>, AppError> {
    let row = sqlx::query(&format!("SELECT {ROTOR_COLUMNS} FROM rotors WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.as_ref().map(rotor_from_row))
}

/// List all rotors of a class type, newest version first.
pub async fn list_rotors_by_class_type(
    conn: &mut SqliteConnection,
    class_type_id: &str,
) -> Result<Vec<Rotor>, AppError> {
    let rows = sqlx::query(&format!(
        "SELECT {ROTOR_COLUMNS} FROM rotors WHERE class_type_id = ? ORDER BY version DESC"
    ))
    .bind(class_type_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().map(rotor_from_row).collect())
}

/// Get the active rotor of a class type, if any.
pub async fn get_active_rotor(
    conn: &mut SqliteConnection,
    class_type_id: &str,
) -> Result<Option<Rotor>, AppError> {
    let row = sqlx::query(&format!(
        "SELECT {ROTOR_COLUMNS} FROM rotors WHERE class_type_id = ? AND status = 'active'"
    ))
    .bind(class_type_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(rotor_from_row))
}

/// Newest draft rotor of a class type with preview switched on.
pub async fn get_preview_rotor(
    conn: &mut SqliteConnection,
    class_type_id: &str,
) -> Result<Option<Rotor>, AppError> {
    let row = sqlx::query(&format!(
        r#"SELECT {ROTOR_COLUMNS} FROM rotors
           WHERE class_type_id = ? AND status = 'draft' AND preview_on = 1
           ORDER BY version DESC LIMIT 1"#
    ))
    .bind(class_type_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.as_ref().map(rotor_from_row))
}

/// Every class type that has ever had a rotor.
pub async fn list_class_type_ids(conn: &mut SqliteConnection) -> Result<Vec<String>, AppError> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"SELECT class_type_id FROM rotor_versions
           UNION SELECT class_type_id FROM rotors
           ORDER BY class_type_id"#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

/// Delete a rotor; themes, topics, schedules and votes cascade.
pub async fn delete_rotor(conn: &mut SqliteConnection, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM rotors WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Rotor {} not found", id)));
    }

    Ok(())
}

fn rotor_from_row(row: &sqlx::sqlite::SqliteRow) -> Rotor {
    let id: String = row.get("id");
    let status: String = row.get("status");
    let preview_on: i32 = row.get("preview_on");
    // An unreadable status must never be mistaken for the active rotor
    let status = RotorStatus::from_str(&status).unwrap_or_else(|| {
        tracing::warn!(rotor_id = %id, status = %status, "Unknown rotor status; treating as archived");
        RotorStatus::Archived
    });
    Rotor {
        id,
        class_type_id: row.get("class_type_id"),
        name: row.get("name"),
        version: row.get("version"),
        status,
        preview_on: preview_on != 0,
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        activated_at: row.get("activated_at"),
    }
}
