//! Read-only aggregates behind the dashboard. Never part of a transaction.

use sqlx::{FromRow, SqliteConnection};

use crate::error::ApiError;

#[derive(Debug, FromRow)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

pub struct EntityTotals {
    pub tickets: i64,
    pub clients: i64,
    pub routers: i64,
    pub sites: i64,
}

async fn count_table(conn: &mut SqliteConnection, table: &str) -> Result<i64, ApiError> {
    // `table` is one of our fixed table names, never user input.
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(&mut *conn)
        .await?;
    Ok(count)
}

pub async fn entity_totals(conn: &mut SqliteConnection) -> Result<EntityTotals, ApiError> {
    Ok(EntityTotals {
        tickets: count_table(conn, "tickets").await?,
        clients: count_table(conn, "clients").await?,
        routers: count_table(conn, "routers").await?,
        sites: count_table(conn, "sites").await?,
    })
}

pub async fn ticket_status_breakdown(
    conn: &mut SqliteConnection,
) -> Result<Vec<LabelCount>, ApiError> {
    let rows = sqlx::query_as::<_, LabelCount>(
        "SELECT status AS label, COUNT(*) AS count FROM tickets GROUP BY status",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn ticket_priority_breakdown(
    conn: &mut SqliteConnection,
) -> Result<Vec<LabelCount>, ApiError> {
    let rows = sqlx::query_as::<_, LabelCount>(
        "SELECT priority AS label, COUNT(*) AS count FROM tickets GROUP BY priority",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub async fn tickets_created_today(conn: &mut SqliteConnection) -> Result<i64, ApiError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE date(created_at) = date('now')")
            .fetch_one(&mut *conn)
            .await?;
    Ok(count)
}

pub async fn tickets_completed_today(conn: &mut SqliteConnection) -> Result<i64, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tickets WHERE completed_at IS NOT NULL \
         AND date(completed_at) = date('now')",
    )
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

pub async fn completed_tickets_for_tech(
    conn: &mut SqliteConnection,
    tech_id: i64,
) -> Result<i64, ApiError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM tickets WHERE assigned_tech_id = ? AND status = 'completed'",
    )
    .bind(tech_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(count)
}

pub async fn avg_time_spent_for_tech(
    conn: &mut SqliteConnection,
    tech_id: i64,
) -> Result<f64, ApiError> {
    let avg: Option<f64> = sqlx::query_scalar(
        "SELECT AVG(time_spent) FROM tickets WHERE assigned_tech_id = ? AND status = 'completed'",
    )
    .bind(tech_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(avg.unwrap_or(0.0))
}
