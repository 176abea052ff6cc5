//! Database module for SQLite persistence.
//!
//! SQLite is the source of truth for all engine state. The single-active
//! rules for rotors and schedules and vote uniqueness are enforced here by
//! indexes, so they hold even for writers that bypass the engine.

mod repository;
mod rotors;
mod schedules;
mod themes;
mod topics;
mod votes;

pub use repository::*;
pub use rotors::*;
pub use schedules::*;
pub use themes::*;
pub use topics::*;
pub use votes::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            schema_version INTEGER NOT NULL DEFAULT 1,
            revision_id INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        INSERT OR IGNORE INTO meta (id, schema_version, revision_id, generated_at)
        VALUES (1, 1, 0, datetime('now'));
        "#,
    )
    .execute(pool)
    .await?;

    // Last version handed out per class type; deleted drafts never free a number.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rotor_versions (
            class_type_id TEXT PRIMARY KEY,
            last_version INTEGER NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rotors (
            id TEXT PRIMARY KEY,
            class_type_id TEXT NOT NULL,
            name TEXT NOT NULL,
            version INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft',
            preview_on INTEGER NOT NULL DEFAULT 0,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            activated_at TEXT,
            UNIQUE (class_type_id, version)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rotor_themes (
            id TEXT PRIMARY KEY,
            rotor_id TEXT NOT NULL REFERENCES rotors(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            position INTEGER NOT NULL DEFAULT 0,
            hidden INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id TEXT PRIMARY KEY,
            theme_id TEXT NOT NULL REFERENCES rotor_themes(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            duration_weeks INTEGER NOT NULL DEFAULT 1 CHECK (duration_weeks > 0),
            position INTEGER NOT NULL DEFAULT 0,
            last_covered TEXT
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topic_schedules (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            theme_id TEXT NOT NULL REFERENCES rotor_themes(id) ON DELETE CASCADE,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            status TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS votes (
            id TEXT PRIMARY KEY,
            topic_id TEXT NOT NULL REFERENCES topics(id) ON DELETE CASCADE,
            account_id TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (topic_id, account_id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Single-active pointers and common lookups
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_rotors_one_active
            ON rotors(class_type_id) WHERE status = 'active';
        CREATE UNIQUE INDEX IF NOT EXISTS idx_schedules_one_active
            ON topic_schedules(theme_id) WHERE status = 'active';
        CREATE INDEX IF NOT EXISTS idx_rotors_class_type ON rotors(class_type_id);
        CREATE INDEX IF NOT EXISTS idx_themes_rotor ON rotor_themes(rotor_id);
        CREATE INDEX IF NOT EXISTS idx_topics_theme ON topics(theme_id, position);
        CREATE INDEX IF NOT EXISTS idx_schedules_theme ON topic_schedules(theme_id);
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
