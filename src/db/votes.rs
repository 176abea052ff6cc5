//! Vote persistence.

use sqlx::SqliteConnection;

use crate::errors::{is_unique_violation, AppError};
use crate::models::Vote;

/// Record a vote. A repeat vote by the same account fails with `AlreadyVoted`.
pub async fn save_vote(conn: &mut SqliteConnection, vote: &Vote) -> Result<(), AppError> {
    let result = sqlx::query(
        "INSERT INTO votes (id, topic_id, account_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&vote.id)
    .bind(&vote.topic_id)
    .bind(&vote.account_id)
    .bind(vote.created_at)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(AppError::AlreadyVoted {
            topic_id: vote.topic_id.clone(),
            account_id: vote.account_id.clone(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Number of votes on a topic.
pub async fn count_votes_for_topic(
    conn: &mut SqliteConnection,
    topic_id: &str,
) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE topic_id = ?")
        .bind(topic_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Whether an account has a vote on a topic.
pub async fn has_vote(
    conn: &mut SqliteConnection,
    topic_id: &str,
    account_id: &str,
) -> Result<bool, AppError> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM votes WHERE topic_id = ? AND account_id = ?")
            .bind(topic_id)
            .bind(account_id)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(found.is_some())
}

/// Remove every vote on a topic, returning how many were removed.
pub async fn delete_votes_for_topic(
    conn: &mut SqliteConnection,
    topic_id: &str,
) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM votes WHERE topic_id = ?")
        .bind(topic_id)
        .execute(&mut *conn)
        .await?;

    Ok(result.rows_affected())
}
