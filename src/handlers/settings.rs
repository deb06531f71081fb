use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::audit;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::{settings, users};

use super::payload::JsonBody;

/// GET /api/settings - admin only.
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let actor = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&actor, Action::SettingsRead)?;

    let settings = settings::list(&mut conn).await?;
    Ok(Json(json!({ "settings": settings })))
}

/// GET /api/settings/:key - admin only.
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let actor = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&actor, Action::SettingsRead)?;

    let setting = settings::get_by_key(&mut conn, &key).await?;
    Ok(Json(json!({ "setting": setting })))
}

/// POST /api/settings - admin only. The body is a flat key/value object;
/// every entry is upserted and the batch is audited as one action.
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let actor = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&actor, Action::SettingsWrite)?;

    let entries = data.as_object().cloned().unwrap_or_default();
    if entries.is_empty() {
        return Err(ApiError::validation("Invalid data format"));
    }

    let mut updated = Vec::with_capacity(entries.len());
    for (key, value) in &entries {
        let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let setting = settings::upsert(
            &mut tx,
            key,
            &value,
            &setting_description(key),
            setting_category(key),
        )
        .await?;
        updated.push(setting);
    }

    audit::record(
        &mut tx,
        actor.id,
        "Updated system settings",
        "system",
        0,
        Some(format!("Updated {} settings", updated.len())),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({
        "message": "Settings updated successfully",
        "settings": updated,
    })))
}

fn setting_description(key: &str) -> String {
    match key {
        "enable_tech_site_add" => "Allow technicians to add sites on the map".to_string(),
        "maintenance_mode" => {
            "Enable maintenance mode to restrict access to admin users only".to_string()
        }
        "enable_notifications" => "Enable system notifications".to_string(),
        "auto_save_interval" => "Auto-save interval in minutes".to_string(),
        "max_file_size" => "Maximum file upload size in MB".to_string(),
        "session_timeout" => "Session timeout in minutes".to_string(),
        "backup_frequency" => "Database backup frequency (daily, weekly, monthly)".to_string(),
        "email_notifications" => "Enable email notifications for important events".to_string(),
        other => format!("Setting for {}", other),
    }
}

fn setting_category(key: &str) -> &'static str {
    match key {
        "enable_tech_site_add" => "permissions",
        "maintenance_mode" => "system",
        "enable_notifications" => "notifications",
        "auto_save_interval" => "system",
        "max_file_size" => "uploads",
        "session_timeout" => "security",
        "backup_frequency" => "maintenance",
        "email_notifications" => "notifications",
        _ => "general",
    }
}
