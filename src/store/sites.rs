use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::Site;
use crate::error::ApiError;

pub struct NewSite {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub site_type: String,
    pub status: String,
    pub address: String,
    pub contact: String,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Site>, ApiError> {
    let site = sqlx::query_as::<_, Site>("SELECT * FROM sites WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(site)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Site, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Site not found"))
}

pub async fn insert(conn: &mut SqliteConnection, new: NewSite) -> Result<Site, ApiError> {
    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO sites (name, description, latitude, longitude, site_type, status, \
         address, contact, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.description)
    .bind(new.latitude)
    .bind(new.longitude)
    .bind(&new.site_type)
    .bind(&new.status)
    .bind(&new.address)
    .bind(&new.contact)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

pub async fn update(conn: &mut SqliteConnection, site: &Site) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE sites SET name = ?, description = ?, latitude = ?, longitude = ?, \
         site_type = ?, status = ?, address = ?, contact = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&site.name)
    .bind(&site.description)
    .bind(site.latitude)
    .bind(site.longitude)
    .bind(&site.site_type)
    .bind(&site.status)
    .bind(&site.address)
    .bind(&site.contact)
    .bind(site.updated_at)
    .bind(site.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM sites WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Site>, ApiError> {
    let sites = sqlx::query_as::<_, Site>("SELECT * FROM sites ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(sites)
}
