use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::audit;
use crate::auth::password;
use crate::database::models::{Role, UserStatus};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::users::{self, NewUser};

use super::payload::{self, JsonBody};

/// GET /api/users - admin only.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let actor = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&actor, Action::UserList)?;

    let users = users::list(&mut conn).await?;
    Ok(Json(json!({ "users": users })))
}

/// POST /api/users - admin only.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.pool.begin().await?;
    let actor = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&actor, Action::UserCreate)?;

    let name = payload::require_str(&data, "name")?;
    let email = payload::require_str(&data, "email")?;
    let secret = payload::require_str(&data, "password")?;
    let role = payload::require_enum::<Role>(&data, "role")?;
    let status = payload::optional_enum::<UserStatus>(&data, "status")?.unwrap_or(UserStatus::Active);

    let user = users::insert(
        &mut tx,
        NewUser {
            name,
            email,
            password_hash: password::hash_password(&secret)?,
            role,
            status,
        },
    )
    .await?;

    audit::record(
        &mut tx,
        actor.id,
        "Created user",
        "user",
        user.id,
        Some(format!("Created user: {} ({})", user.name, user.role.as_str())),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "user": user }))))
}

/// PUT /api/users/:id - admin only.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let actor = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&actor, Action::UserUpdate)?;

    let mut user = users::get(&mut tx, id).await?;

    if let Some(email) = payload::optional_str(&data, "email")? {
        if users::email_taken(&mut tx, &email, Some(user.id)).await? {
            return Err(ApiError::duplicate("Email already exists"));
        }
        user.email = email;
    }
    if let Some(name) = payload::optional_str(&data, "name")? {
        user.name = name;
    }
    if let Some(role) = payload::optional_enum::<Role>(&data, "role")? {
        user.role = role;
    }
    if let Some(status) = payload::optional_enum::<UserStatus>(&data, "status")? {
        user.status = status;
    }
    // An empty password field means "leave it alone", matching the admin UI.
    if let Some(secret) = payload::optional_str(&data, "password")? {
        if !secret.is_empty() {
            user.password_hash = password::hash_password(&secret)?;
        }
    }

    user.updated_at = Utc::now();
    users::update(&mut tx, &user).await?;

    audit::record(
        &mut tx,
        actor.id,
        "Updated user",
        "user",
        user.id,
        Some(format!("Updated user: {}", user.name)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "user": user })))
}

/// DELETE /api/users/:id - admin only, and never your own account.
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let actor = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&actor, Action::UserDelete)?;

    if actor.id == id {
        return Err(ApiError::forbidden("Cannot delete your own account"));
    }

    let user = users::get(&mut tx, id).await?;
    users::delete(&mut tx, user.id).await?;

    audit::record(
        &mut tx,
        actor.id,
        "Deleted user",
        "user",
        user.id,
        Some(format!("Deleted user: {} ({})", user.name, user.role.as_str())),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}

/// GET /api/users/technicians - active technicians, any authenticated role.
pub async fn technicians(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let actor = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&actor, Action::TechnicianList)?;

    let technicians = users::list_active_technicians(&mut conn).await?;
    Ok(Json(json!({ "technicians": technicians })))
}
