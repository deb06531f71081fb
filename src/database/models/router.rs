use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RouterStatus {
    Online,
    Offline,
    Maintenance,
}

impl RouterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouterStatus::Online => "online",
            RouterStatus::Offline => "offline",
            RouterStatus::Maintenance => "maintenance",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Router {
    pub id: i64,
    pub model: String,
    pub serial_number: String,
    pub status: RouterStatus,
    pub client_id: i64,
    pub location: String,
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
