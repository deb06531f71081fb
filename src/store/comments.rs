use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::TicketComment;
use crate::error::ApiError;

pub async fn insert(
    conn: &mut SqliteConnection,
    ticket_id: i64,
    user_id: i64,
    comment: &str,
) -> Result<TicketComment, ApiError> {
    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO ticket_comments (ticket_id, user_id, comment, created_at) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(ticket_id)
    .bind(user_id)
    .bind(comment)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    let row = sqlx::query_as::<_, TicketComment>("SELECT * FROM ticket_comments WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn list_for_ticket(
    conn: &mut SqliteConnection,
    ticket_id: i64,
) -> Result<Vec<TicketComment>, ApiError> {
    let rows = sqlx::query_as::<_, TicketComment>(
        "SELECT * FROM ticket_comments WHERE ticket_id = ? ORDER BY id",
    )
    .bind(ticket_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
