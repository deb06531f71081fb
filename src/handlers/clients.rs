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
use crate::store::{clients, users};

use super::payload::{self, JsonBody};

/// GET /api/clients
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::ClientList)?;

    let clients = clients::list(&mut conn).await?;
    Ok(Json(json!({ "clients": clients })))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::ClientCreate)?;

    let new = clients::NewClient {
        name: payload::require_str(&data, "name")?,
        email: payload::require_str(&data, "email")?,
        phone: payload::require_str(&data, "phone")?,
        address: payload::require_str(&data, "address")?,
        status: payload::optional_str(&data, "status")?.unwrap_or_else(|| "active".to_string()),
    };

    let client = clients::insert(&mut tx, new).await?;
    audit::record(
        &mut tx,
        user.id,
        "Created client",
        "client",
        client.id,
        Some(format!("Created client: {}", client.name)),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "client": client }))))
}

/// GET /api/clients/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::ClientView)?;

    let client = clients::get(&mut conn, id).await?;
    Ok(Json(json!({ "client": client })))
}

/// PUT /api/clients/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::ClientUpdate)?;

    let mut client = clients::get(&mut tx, id).await?;

    if let Some(email) = payload::optional_str(&data, "email")? {
        if clients::email_taken(&mut tx, &email, Some(client.id)).await? {
            return Err(ApiError::duplicate("Email already exists"));
        }
        client.email = email;
    }
    if let Some(name) = payload::optional_str(&data, "name")? {
        client.name = name;
    }
    if let Some(phone) = payload::optional_str(&data, "phone")? {
        client.phone = phone;
    }
    if let Some(address) = payload::optional_str(&data, "address")? {
        client.address = address;
    }
    if let Some(status) = payload::optional_str(&data, "status")? {
        client.status = status;
    }

    client.updated_at = Utc::now();
    clients::update(&mut tx, &client).await?;

    audit::record(
        &mut tx,
        user.id,
        "Updated client",
        "client",
        client.id,
        Some(format!("Updated client: {}", client.name)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "client": client })))
}

/// DELETE /api/clients/:id - refused while the client still owns tickets.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::ClientDelete)?;

    let client = clients::get(&mut tx, id).await?;
    clients::delete(&mut tx, client.id).await?;

    audit::record(
        &mut tx,
        user.id,
        "Deleted client",
        "client",
        client.id,
        Some(format!("Deleted client: {}", client.name)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Client deleted successfully" })))
}
