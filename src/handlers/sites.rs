use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::audit;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::{sites, users};

use super::payload::{self, JsonBody};

/// GET /api/sites
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::SiteList)?;

    let sites = sites::list(&mut conn).await?;
    Ok(Json(json!({ "sites": sites })))
}

/// POST /api/sites - map locations; the payload carries the kind as "type".
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::SiteCreate)?;

    let new = sites::NewSite {
        name: payload::require_str(&data, "name")?,
        description: payload::optional_str(&data, "description")?.unwrap_or_default(),
        latitude: payload::require_f64(&data, "latitude")?,
        longitude: payload::require_f64(&data, "longitude")?,
        site_type: payload::optional_str(&data, "type")?.unwrap_or_else(|| "office".to_string()),
        status: payload::optional_str(&data, "status")?.unwrap_or_else(|| "active".to_string()),
        address: payload::optional_str(&data, "address")?.unwrap_or_default(),
        contact: payload::optional_str(&data, "contact")?.unwrap_or_default(),
    };

    let site = sites::insert(&mut tx, new).await?;
    audit::record(
        &mut tx,
        user.id,
        "Created site",
        "site",
        site.id,
        Some(format!("Created site: {}", site.name)),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "site": site }))))
}

/// PUT /api/sites/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::SiteUpdate)?;

    let mut site = sites::get(&mut tx, id).await?;

    if let Some(name) = payload::optional_str(&data, "name")? {
        site.name = name;
    }
    if let Some(description) = payload::optional_str(&data, "description")? {
        site.description = description;
    }
    if let Some(latitude) = payload::optional_f64(&data, "latitude")? {
        site.latitude = latitude;
    }
    if let Some(longitude) = payload::optional_f64(&data, "longitude")? {
        site.longitude = longitude;
    }
    if let Some(site_type) = payload::optional_str(&data, "type")? {
        site.site_type = site_type;
    }
    if let Some(status) = payload::optional_str(&data, "status")? {
        site.status = status;
    }
    if let Some(address) = payload::optional_str(&data, "address")? {
        site.address = address;
    }
    if let Some(contact) = payload::optional_str(&data, "contact")? {
        site.contact = contact;
    }

    site.updated_at = Utc::now();
    sites::update(&mut tx, &site).await?;

    audit::record(
        &mut tx,
        user.id,
        "Updated site",
        "site",
        site.id,
        Some(format!("Updated site: {}", site.name)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "site": site })))
}

/// DELETE /api/sites/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::SiteDelete)?;

    let site = sites::get(&mut tx, id).await?;
    sites::delete(&mut tx, site.id).await?;

    audit::record(
        &mut tx,
        user.id,
        "Deleted site",
        "site",
        site.id,
        Some(format!("Deleted site: {}", site.name)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Site deleted successfully" })))
}
