use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::{Router, RouterStatus};
use crate::error::ApiError;
use crate::store::clients;

pub struct NewRouter {
    pub model: String,
    pub serial_number: String,
    pub status: RouterStatus,
    pub client_id: i64,
    pub location: String,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Router>, ApiError> {
    let router = sqlx::query_as::<_, Router>("SELECT * FROM routers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(router)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Router, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Router not found"))
}

pub async fn serial_taken(
    conn: &mut SqliteConnection,
    serial_number: &str,
    exclude_id: Option<i64>,
) -> Result<bool, ApiError> {
    let count: i64 = match exclude_id {
        Some(id) => sqlx::query_scalar(
            "SELECT COUNT(*) FROM routers WHERE serial_number = ? AND id != ?",
        )
        .bind(serial_number)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?,
        None => sqlx::query_scalar("SELECT COUNT(*) FROM routers WHERE serial_number = ?")
            .bind(serial_number)
            .fetch_one(&mut *conn)
            .await?,
    };
    Ok(count > 0)
}

/// The owning client must exist before the write; a dangling reference is a
/// lookup failure, not a raw constraint violation.
pub async fn require_client(conn: &mut SqliteConnection, client_id: i64) -> Result<(), ApiError> {
    if clients::find(conn, client_id).await?.is_none() {
        return Err(ApiError::reference_not_found("Client not found"));
    }
    Ok(())
}

pub async fn insert(conn: &mut SqliteConnection, new: NewRouter) -> Result<Router, ApiError> {
    if serial_taken(conn, &new.serial_number, None).await? {
        return Err(ApiError::duplicate("Serial number already exists"));
    }
    require_client(conn, new.client_id).await?;

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO routers (model, serial_number, status, client_id, location, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.model)
    .bind(&new.serial_number)
    .bind(new.status)
    .bind(new.client_id)
    .bind(&new.location)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

pub async fn update(conn: &mut SqliteConnection, router: &Router) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE routers SET model = ?, serial_number = ?, status = ?, client_id = ?, \
         location = ?, last_seen = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&router.model)
    .bind(&router.serial_number)
    .bind(router.status)
    .bind(router.client_id)
    .bind(&router.location)
    .bind(router.last_seen)
    .bind(router.updated_at)
    .bind(router.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM routers WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Router>, ApiError> {
    let routers = sqlx::query_as::<_, Router>("SELECT * FROM routers ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(routers)
}
