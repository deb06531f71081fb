use axum::extract::State;
use axum::{Extension, Json};
use serde_json::{json, Value};

use crate::audit;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::policy::{self, Action};
use crate::state::AppState;
use crate::store::{analytics, users};

/// GET /api/analytics/dashboard
///
/// Open to every role; the technician-performance section is only included
/// for admin and agent viewers.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.pool.acquire().await?;
    let actor = users::load_actor(&mut conn, auth.user_id).await?;
    policy::require(&actor, Action::DashboardView)?;

    let totals = analytics::entity_totals(&mut conn).await?;
    let status = analytics::ticket_status_breakdown(&mut conn).await?;
    let priority = analytics::ticket_priority_breakdown(&mut conn).await?;
    let todays_tickets = analytics::tickets_created_today(&mut conn).await?;
    let completed_today = analytics::tickets_completed_today(&mut conn).await?;
    let recent_activities = audit::recent(&mut conn, 10).await?;

    let mut tech_performance = Vec::new();
    if matches!(actor.role, Role::Admin | Role::Agent) {
        for tech in users::list_active_technicians(&mut conn).await? {
            let completed = analytics::completed_tickets_for_tech(&mut conn, tech.id).await?;
            let avg_time = analytics::avg_time_spent_for_tech(&mut conn, tech.id).await?;
            tech_performance.push(json!({
                "id": tech.id,
                "name": tech.name,
                "completed_tickets": completed,
                "avg_time_spent": (avg_time * 100.0).round() / 100.0,
            }));
        }
    }

    Ok(Json(json!({
        "summary": {
            "total_tickets": totals.tickets,
            "total_clients": totals.clients,
            "total_routers": totals.routers,
            "total_sites": totals.sites,
            "todays_tickets": todays_tickets,
            "completed_today": completed_today,
        },
        "ticket_status": status
            .iter()
            .map(|row| json!({ "status": row.label, "count": row.count }))
            .collect::<Vec<Value>>(),
        "ticket_priority": priority
            .iter()
            .map(|row| json!({ "priority": row.label, "count": row.count }))
            .collect::<Vec<Value>>(),
        "recent_activities": recent_activities,
        "tech_performance": tech_performance,
    })))
}
