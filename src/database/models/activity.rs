use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Append-only audit record. Rows are written in the same transaction as the
/// mutation they document and are never updated or deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub action: String,
    pub target_type: String,
    pub target_id: i64,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}
