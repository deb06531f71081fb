use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::audit;
use crate::database::models::RouterStatus;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::{routers, users};

use super::payload::{self, JsonBody};

/// GET /api/routers
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::RouterList)?;

    let routers = routers::list(&mut conn).await?;
    Ok(Json(json!({ "routers": routers })))
}

/// POST /api/routers
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::RouterCreate)?;

    let new = routers::NewRouter {
        model: payload::require_str(&data, "model")?,
        serial_number: payload::require_str(&data, "serial_number")?,
        status: payload::optional_enum::<RouterStatus>(&data, "status")?
            .unwrap_or(RouterStatus::Offline),
        client_id: payload::require_i64(&data, "client_id")?,
        location: payload::optional_str(&data, "location")?.unwrap_or_default(),
    };

    let router = routers::insert(&mut tx, new).await?;
    audit::record(
        &mut tx,
        user.id,
        "Created router",
        "router",
        router.id,
        Some(format!("Created router: {} ({})", router.model, router.serial_number)),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "router": router }))))
}

/// PUT /api/routers/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::RouterUpdate)?;

    let mut router = routers::get(&mut tx, id).await?;

    if let Some(serial) = payload::optional_str(&data, "serial_number")? {
        if routers::serial_taken(&mut tx, &serial, Some(router.id)).await? {
            return Err(ApiError::duplicate("Serial number already exists"));
        }
        router.serial_number = serial;
    }
    if let Some(model) = payload::optional_str(&data, "model")? {
        router.model = model;
    }
    if let Some(status) = payload::optional_enum::<RouterStatus>(&data, "status")? {
        router.status = status;
        router.last_seen = Some(Utc::now());
    }
    if let Some(client_id) = payload::optional_i64(&data, "client_id")? {
        routers::require_client(&mut tx, client_id).await?;
        router.client_id = client_id;
    }
    if let Some(location) = payload::optional_str(&data, "location")? {
        router.location = location;
    }

    router.updated_at = Utc::now();
    routers::update(&mut tx, &router).await?;

    audit::record(
        &mut tx,
        user.id,
        "Updated router",
        "router",
        router.id,
        Some(format!("Updated router: {} ({})", router.model, router.serial_number)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "router": router })))
}

/// PUT /api/routers/:id/status - monitoring ping; also bumps last_seen.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let status = payload::optional_enum::<RouterStatus>(&data, "status")?
        .ok_or_else(|| ApiError::validation("Status is required"))?;

    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::RouterUpdate)?;

    let mut router = routers::get(&mut tx, id).await?;
    router.status = status;
    router.last_seen = Some(Utc::now());
    router.updated_at = Utc::now();
    routers::update(&mut tx, &router).await?;

    audit::record(
        &mut tx,
        user.id,
        "Updated router status",
        "router",
        router.id,
        Some(format!("Changed router status to {}: {}", status.as_str(), router.model)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "router": router })))
}

/// DELETE /api/routers/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::RouterDelete)?;

    let router = routers::get(&mut tx, id).await?;
    routers::delete(&mut tx, router.id).await?;

    audit::record(
        &mut tx,
        user.id,
        "Deleted router",
        "router",
        router.id,
        Some(format!("Deleted router: {} ({})", router.model, router.serial_number)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Router deleted successfully" })))
}
