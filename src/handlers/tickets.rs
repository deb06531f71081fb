use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::audit;
use crate::database::models::{Role, TicketPriority, TicketStatus, User};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::{comments, tickets, users};

use super::payload::{self, JsonBody};

/// A technician may only touch tickets assigned to them; admin and agent may
/// touch any.
fn require_ownership(actor: &User, assigned_tech_id: Option<i64>) -> Result<(), ApiError> {
    if actor.role == Role::Technician && assigned_tech_id != Some(actor.id) {
        return Err(ApiError::forbidden("You can only update your assigned tickets"));
    }
    Ok(())
}

/// GET /api/tickets
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::TicketList)?;

    let tickets = if user.role == Role::Technician {
        tickets::list_assigned_to(&mut conn, user.id).await?
    } else {
        tickets::list(&mut conn).await?
    };
    Ok(Json(json!({ "tickets": tickets })))
}

/// POST /api/tickets
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::TicketCreate)?;

    let title = payload::require_str(&data, "title")?;
    let client_id = payload::require_i64(&data, "client_id")?;
    let description = payload::optional_str(&data, "description")?.unwrap_or_default();
    let priority =
        payload::optional_enum::<TicketPriority>(&data, "priority")?.unwrap_or(TicketPriority::Medium);
    let status =
        payload::optional_enum::<TicketStatus>(&data, "status")?.unwrap_or(TicketStatus::Pending);
    let assigned_tech_id = payload::nullable_i64(&data, "assigned_tech_id")?.flatten();

    let ticket = tickets::insert(
        &mut tx,
        tickets::NewTicket {
            title,
            description,
            priority,
            status,
            client_id,
            assigned_tech_id,
            created_by_id: user.id,
        },
    )
    .await?;

    audit::record(
        &mut tx,
        user.id,
        "Created ticket",
        "ticket",
        ticket.id,
        Some(format!("Created ticket: {}", ticket.title)),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "ticket": ticket }))))
}

/// GET /api/tickets/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::TicketView)?;

    let ticket = tickets::get(&mut conn, id).await?;
    Ok(Json(json!({ "ticket": ticket })))
}

/// PUT /api/tickets/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::TicketUpdate)?;

    let mut ticket = tickets::get(&mut tx, id).await?;
    require_ownership(&user, ticket.assigned_tech_id)?;

    if let Some(title) = payload::optional_str(&data, "title")? {
        ticket.title = title;
    }
    if let Some(description) = payload::optional_str(&data, "description")? {
        ticket.description = description;
    }
    if let Some(priority) = payload::optional_enum::<TicketPriority>(&data, "priority")? {
        ticket.priority = priority;
    }
    if let Some(status) = payload::optional_enum::<TicketStatus>(&data, "status")? {
        ticket.status = status;
        // Completion time records the moment of this specific update; other
        // statuses leave any previous completion time untouched.
        if status == TicketStatus::Completed {
            ticket.completed_at = Some(Utc::now());
        }
    }
    if let Some(assigned) = payload::nullable_i64(&data, "assigned_tech_id")? {
        ticket.assigned_tech_id = assigned;
    }
    if let Some(time_spent) = payload::optional_i64(&data, "time_spent")? {
        ticket.time_spent = time_spent;
    }

    ticket.updated_at = Utc::now();
    tickets::update(&mut tx, &ticket).await?;

    audit::record(
        &mut tx,
        user.id,
        "Updated ticket",
        "ticket",
        ticket.id,
        Some(format!("Updated ticket: {}", ticket.title)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "ticket": ticket })))
}

/// DELETE /api/tickets/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::TicketDelete)?;

    let ticket = tickets::get(&mut tx, id).await?;
    tickets::delete(&mut tx, ticket.id).await?;

    audit::record(
        &mut tx,
        user.id,
        "Deleted ticket",
        "ticket",
        ticket.id,
        Some(format!("Deleted ticket: {}", ticket.title)),
    )
    .await?;
    tx.commit().await?;

    Ok(Json(json!({ "message": "Ticket deleted successfully" })))
}

/// GET /api/tickets/:id/comments
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let user = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&user, Action::TicketView)?;

    let ticket = tickets::get(&mut conn, id).await?;
    let comments = comments::list_for_ticket(&mut conn, ticket.id).await?;
    Ok(Json(json!({ "comments": comments })))
}

/// POST /api/tickets/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    JsonBody(data): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let comment_text = data.get("comment").and_then(Value::as_str).unwrap_or_default();
    if comment_text.is_empty() {
        return Err(ApiError::validation("Comment is required"));
    }

    let mut tx = state.pool.begin().await?;
    let user = users::load_actor(&mut tx, auth.user_id).await?;
    policy::require(&user, Action::CommentCreate)?;

    let ticket = tickets::get(&mut tx, id).await?;
    let comment = comments::insert(&mut tx, ticket.id, user.id, comment_text).await?;

    audit::record(
        &mut tx,
        user.id,
        "Commented on ticket",
        "ticket",
        ticket.id,
        Some(format!("Commented on ticket: {}", ticket.title)),
    )
    .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}
