use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Immutable once created; comments are never edited or deleted.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TicketComment {
    pub id: i64,
    pub ticket_id: i64,
    pub user_id: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
