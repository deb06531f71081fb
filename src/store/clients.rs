use chrono::Utc;
use sqlx::SqliteConnection;

use crate::database::models::Client;
use crate::error::ApiError;

pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub status: String,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<Client>, ApiError> {
    let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(client)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<Client, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Client not found"))
}

pub async fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool, ApiError> {
    let count: i64 = match exclude_id {
        Some(id) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_one(&mut *conn)
                .await?
        }
        None => sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *conn)
            .await?,
    };
    Ok(count > 0)
}

pub async fn insert(conn: &mut SqliteConnection, new: NewClient) -> Result<Client, ApiError> {
    if email_taken(conn, &new.email, None).await? {
        return Err(ApiError::duplicate("Email already exists"));
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO clients (name, email, phone, address, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.phone)
    .bind(&new.address)
    .bind(&new.status)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

pub async fn update(conn: &mut SqliteConnection, client: &Client) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE clients SET name = ?, email = ?, phone = ?, address = ?, status = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&client.name)
    .bind(&client.email)
    .bind(&client.phone)
    .bind(&client.address)
    .bind(&client.status)
    .bind(client.updated_at)
    .bind(client.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Delete a client. Blocked while the client still owns tickets; deletion is
/// refused, never cascaded.
pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), ApiError> {
    let tickets: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE client_id = ?")
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    if tickets > 0 {
        return Err(ApiError::has_dependents("Cannot delete client with active tickets"));
    }

    sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<Client>, ApiError> {
    let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(clients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;

    pub(crate) async fn seed(conn: &mut SqliteConnection, email: &str) -> Client {
        insert(
            conn,
            NewClient {
                name: "Acme Networks".into(),
                email: email.into(),
                phone: "555-0100".into(),
                address: "1 Main St".into(),
                status: "active".into(),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        seed(&mut conn, "acme@example.com").await;
        let err = insert(
            &mut conn,
            NewClient {
                name: "Other".into(),
                email: "acme@example.com".into(),
                phone: "".into(),
                address: "".into(),
                status: "active".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateValue(_)));
    }

    #[tokio::test]
    async fn delete_without_tickets_succeeds() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let client = seed(&mut conn, "free@example.com").await;
        delete(&mut conn, client.id).await.unwrap();
        assert!(find(&mut conn, client.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_with_tickets_is_blocked() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let client = seed(&mut conn, "busy@example.com").await;
        sqlx::query(
            "INSERT INTO tickets (title, client_id, created_by_id, created_at, updated_at) \
             VALUES ('Outage', ?, 1, datetime('now'), datetime('now'))",
        )
        .bind(client.id)
        .execute(&mut *conn)
        .await
        .unwrap();

        let err = delete(&mut conn, client.id).await.unwrap_err();
        assert!(matches!(err, ApiError::HasDependents(_)));
        assert!(find(&mut conn, client.id).await.unwrap().is_some());
    }
}
