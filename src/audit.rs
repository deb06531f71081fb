//! Audit recorder: one append-only activity-log row per mutating operation.
//!
//! `record` runs on the caller's connection, which for every mutating
//! handler is the transaction wrapping the mutation itself. If the mutation
//! fails no row is written; if the append fails the mutation rolls back.
//! The log is purely observational and is never read for authorization.

use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::ActivityLog;
use crate::error::ApiError;

pub async fn record(
    conn: &mut SqliteConnection,
    actor_id: i64,
    action: &str,
    target_type: &str,
    target_id: i64,
    details: Option<String>,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO activity_log (user_id, action, target_type, target_id, details, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(actor_id)
    .bind(action)
    .bind(target_type)
    .bind(target_id)
    .bind(details)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn recent(
    conn: &mut SqliteConnection,
    limit: i64,
) -> Result<Vec<ActivityLog>, ApiError> {
    let rows = sqlx::query_as::<_, ActivityLog>(
        "SELECT * FROM activity_log ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
