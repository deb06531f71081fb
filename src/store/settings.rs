use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::SystemSetting;
use crate::error::ApiError;

pub async fn find_by_key(
    conn: &mut SqliteConnection,
    key: &str,
) -> Result<Option<SystemSetting>, ApiError> {
    let setting =
        sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings WHERE \"key\" = ?")
            .bind(key)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(setting)
}

pub async fn get_by_key(
    conn: &mut SqliteConnection,
    key: &str,
) -> Result<SystemSetting, ApiError> {
    find_by_key(conn, key)
        .await?
        .ok_or_else(|| ApiError::not_found("Setting not found"))
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<SystemSetting>, ApiError> {
    let settings =
        sqlx::query_as::<_, SystemSetting>("SELECT * FROM system_settings ORDER BY \"key\"")
            .fetch_all(&mut *conn)
            .await?;
    Ok(settings)
}

/// Insert or overwrite one setting, returning the stored row.
pub async fn upsert(
    conn: &mut SqliteConnection,
    key: &str,
    value: &str,
    description: &str,
    category: &str,
) -> Result<SystemSetting, ApiError> {
    let now = Utc::now();

    match find_by_key(conn, key).await? {
        Some(_) => {
            sqlx::query("UPDATE system_settings SET value = ?, updated_at = ? WHERE \"key\" = ?")
                .bind(value)
                .bind(now)
                .bind(key)
                .execute(&mut *conn)
                .await?;
        }
        None => {
            sqlx::query(
                "INSERT INTO system_settings (\"key\", value, description, category, updated_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(key)
            .bind(value)
            .bind(description)
            .bind(category)
            .bind(now)
            .execute(&mut *conn)
            .await?;
        }
    }

    get_by_key(conn, key).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    #[tokio::test]
    async fn upsert_creates_then_overwrites() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let created = upsert(&mut conn, "maintenance_mode", "false", "desc", "system")
            .await
            .unwrap();
        assert_eq!(created.value, "false");

        let updated = upsert(&mut conn, "maintenance_mode", "true", "ignored", "ignored")
            .await
            .unwrap();
        assert_eq!(updated.value, "true");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.description, "desc");

        assert_eq!(list(&mut conn).await.unwrap().len(), 1);
    }
}
