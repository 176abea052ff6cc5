//! Database repository: connection pool, transactions and the revision counter.
//!
//! Entity operations live in sibling modules and take a `&mut SqliteConnection`
//! so that several of them can run inside a single transaction.

use chrono::Utc;
use sqlx::pool::PoolConnection;
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool, Transaction};

use crate::errors::AppError;

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Start a transaction that will write. Dropping it without `commit` rolls back.
    ///
    /// The revision bump is the first statement so SQLite's write lock is taken
    /// up front; later reads in the transaction then see the latest committed
    /// state and the commit never has to upgrade a stale snapshot.
    pub async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        let mut tx = self.pool.begin().await?;
        increment_revision(&mut *tx).await?;
        Ok(tx)
    }

    /// Check out a plain connection for reads.
    pub async fn acquire(&self) -> Result<PoolConnection<Sqlite>, AppError> {
        Ok(self.pool.acquire().await?)
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Cheap liveness probe.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Increment the revision ID inside the caller's transaction.
async fn increment_revision(conn: &mut SqliteConnection) -> Result<(), AppError> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
