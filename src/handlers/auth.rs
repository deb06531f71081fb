use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::audit;
use crate::auth::{issue_token, password};
use crate::database::models::{Role, UserStatus};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::users::{self, NewUser};

use super::payload::{self, JsonBody};

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let email = data.get("email").and_then(Value::as_str).unwrap_or_default();
    let secret = data.get("password").and_then(Value::as_str).unwrap_or_default();
    if email.is_empty() || secret.is_empty() {
        return Err(ApiError::validation("Email and password are required"));
    }

    let mut tx = state.pool.begin().await?;
    let user = users::verify_credentials(&mut tx, email, secret).await?;
    audit::record(&mut tx, user.id, "User logged in", "user", user.id, None).await?;
    tx.commit().await?;

    let token = issue_token(user.id)?;
    Ok(Json(json!({ "access_token": token, "user": user })))
}

/// POST /api/auth/register - open registration, defaults to the agent role.
pub async fn register(
    State(state): State<AppState>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let name = data.get("name").and_then(Value::as_str).unwrap_or_default();
    let email = data.get("email").and_then(Value::as_str).unwrap_or_default();
    let secret = data.get("password").and_then(Value::as_str).unwrap_or_default();
    if name.is_empty() || email.is_empty() || secret.is_empty() {
        return Err(ApiError::validation("Name, email, and password are required"));
    }

    let role = payload::optional_enum::<Role>(&data, "role")?.unwrap_or(Role::Agent);

    let mut tx = state.pool.begin().await?;
    let user = users::insert(
        &mut tx,
        NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password::hash_password(secret)?,
            role,
            status: UserStatus::Active,
        },
    )
    .await?;
    audit::record(
        &mut tx,
        user.id,
        "User registered",
        "user",
        user.id,
        Some(format!("Registered user: {}", user.name)),
    )
    .await?;
    tx.commit().await?;

    let token = issue_token(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "access_token": token, "user": user })),
    ))
}

/// GET /api/auth/profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::ProfileView)?;
    Ok(Json(json!({ "user": user })))
}

/// PUT /api/auth/profile - a user may always edit their own name and email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let mut user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::ProfileUpdate)?;

    if let Some(name) = payload::optional_str(&data, "name")? {
        user.name = name;
    }
    if let Some(email) = payload::optional_str(&data, "email")? {
        if users::email_taken(&mut tx, &email, Some(user.id)).await? {
            return Err(ApiError::duplicate("Email already exists"));
        }
        user.email = email;
    }

    user.updated_at = Utc::now();
    users::update(&mut tx, &user).await?;
    audit::record(&mut tx, user.id, "Updated profile", "user", user.id, None).await?;
    tx.commit().await?;

    Ok(Json(json!({ "user": user })))
}
