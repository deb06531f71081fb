use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SystemSetting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub description: String,
    pub category: String,
    pub updated_at: DateTime<Utc>,
}
