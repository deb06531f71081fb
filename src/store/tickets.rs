use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::{Ticket, TicketPriority, TicketStatus};
use crate::error::ApiError;
use crate::store::clients;

pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub client_id: i64,
    pub assigned_tech_id: Option<i64>,
    pub created_by_id: i64,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Ticket>, ApiError> {
    let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(ticket)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Ticket, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Ticket not found"))
}

pub async fn insert(conn: &mut SqliteConnection, new: NewTicket) -> Result<Ticket, ApiError> {
    if clients::find(conn, new.client_id).await?.is_none() {
        return Err(ApiError::reference_not_found("Client not found"));
    }

    let now = Utc::now();
    // A ticket created directly in the completed state gets its completion
    // timestamp immediately.
    let completed_at = (new.status == TicketStatus::Completed).then_some(now);

    let id = sqlx::query(
        "INSERT INTO tickets (title, description, priority, status, client_id, \
         assigned_tech_id, created_by_id, time_spent, created_at, completed_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.priority)
    .bind(new.status)
    .bind(new.client_id)
    .bind(new.assigned_tech_id)
    .bind(new.created_by_id)
    .bind(now)
    .bind(completed_at)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

pub async fn update(conn: &mut SqliteConnection, ticket: &Ticket) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE tickets SET title = ?, description = ?, priority = ?, status = ?, \
         client_id = ?, assigned_tech_id = ?, time_spent = ?, completed_at = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&ticket.title)
    .bind(&ticket.description)
    .bind(ticket.priority)
    .bind(ticket.status)
    .bind(ticket.client_id)
    .bind(ticket.assigned_tech_id)
    .bind(ticket.time_spent)
    .bind(ticket.completed_at)
    .bind(ticket.updated_at)
    .bind(ticket.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM tickets WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Ticket>, ApiError> {
    let tickets = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(tickets)
}

/// Technicians only ever see tickets assigned to them.
pub async fn list_assigned_to(
    conn: &mut SqliteConnection,
    tech_id: i64,
) -> Result<Vec<Ticket>, ApiError> {
    let tickets =
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE assigned_tech_id = ? ORDER BY id")
            .bind(tech_id)
            .fetch_all(&mut *conn)
            .await?;
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::store::clients::NewClient;

    async fn seed_client(conn: &mut SqliteConnection) -> i64 {
        clients::insert(
            conn,
            NewClient {
                name: "TicketCo".into(),
                email: "ticketco@example.com".into(),
                phone: "".into(),
                address: "".into(),
                status: "active".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn new_ticket(client_id: i64) -> NewTicket {
        NewTicket {
            title: "Link down".into(),
            description: "".into(),
            priority: TicketPriority::Medium,
            status: TicketStatus::Pending,
            client_id,
            assigned_tech_id: None,
            created_by_id: 1,
        }
    }

    #[tokio::test]
    async fn missing_client_fails_the_insert() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let err = insert(&mut conn, new_ticket(404)).await.unwrap_err();
        assert!(matches!(err, ApiError::ReferenceNotFound(_)));
    }

    #[tokio::test]
    async fn pending_ticket_has_no_completion_time() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let client_id = seed_client(&mut conn).await;

        let ticket = insert(&mut conn, new_ticket(client_id)).await.unwrap();
        assert_eq!(ticket.status, TicketStatus::Pending);
        assert!(ticket.completed_at.is_none());
    }

    #[tokio::test]
    async fn listing_scopes_by_assigned_technician() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let client_id = seed_client(&mut conn).await;

        let mut mine = new_ticket(client_id);
        mine.assigned_tech_id = Some(7);
        insert(&mut conn, mine).await.unwrap();

        let mut other = new_ticket(client_id);
        other.assigned_tech_id = Some(8);
        insert(&mut conn, other).await.unwrap();

        insert(&mut conn, new_ticket(client_id)).await.unwrap();

        assert_eq!(list(&mut conn).await.unwrap().len(), 3);
        let scoped = list_assigned_to(&mut conn, 7).await.unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].assigned_tech_id, Some(7));
    }
}
