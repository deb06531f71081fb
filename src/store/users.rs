use chrono::Utc;
use sqlx::SqliteConnection;

use crate::auth::password;
use crate::database::models::{Role, User, UserStatus};
use crate::error::ApiError;

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

pub async fn find(conn: &mut SqliteConnection, id: i64) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

pub async fn get(conn: &mut SqliteConnection, id: i64) -> Result<User, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// Load the acting user behind a resolved token. A valid token whose user
/// row has since been deleted fails authentication, not lookup.
pub async fn load_actor(conn: &mut SqliteConnection, id: i64) -> Result<User, ApiError> {
    find(conn, id)
        .await?
        .ok_or_else(|| ApiError::unauthenticated("User account no longer exists"))
}

pub async fn find_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<User>, ApiError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(user)
}

/// Live uniqueness check, excluding the record's own id on update.
/// Comparison is a case-sensitive exact match.
pub async fn email_taken(
    conn: &mut SqliteConnection,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool, ApiError> {
    let count: i64 = match exclude_id {
        Some(id) => {
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_one(&mut *conn)
                .await?
        }
        None => sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&mut *conn)
            .await?,
    };
    Ok(count > 0)
}

pub async fn insert(conn: &mut SqliteConnection, new: NewUser) -> Result<User, ApiError> {
    if email_taken(conn, &new.email, None).await? {
        return Err(ApiError::duplicate("Email already exists"));
    }

    let now = Utc::now();
    let id = sqlx::query(
        "INSERT INTO users (name, email, password_hash, role, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.name)
    .bind(&new.email)
    .bind(&new.password_hash)
    .bind(new.role)
    .bind(new.status)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    get(conn, id).await
}

/// Write back a fully loaded user row. Callers apply patch semantics by
/// mutating only the fields present in the incoming payload.
pub async fn update(conn: &mut SqliteConnection, user: &User) -> Result<(), ApiError> {
    sqlx::query(
        "UPDATE users SET name = ?, email = ?, password_hash = ?, role = ?, status = ?, \
         updated_at = ? WHERE id = ?",
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(user.role)
    .bind(user.status)
    .bind(user.updated_at)
    .bind(user.id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn list(conn: &mut SqliteConnection) -> Result<Vec<User>, ApiError> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;
    Ok(users)
}

pub async fn list_active_technicians(
    conn: &mut SqliteConnection,
) -> Result<Vec<User>, ApiError> {
    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE role = 'technician' AND status = 'active' ORDER BY id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(users)
}

/// Credential check for login. Unknown email and wrong password fail with
/// the same error so the response does not reveal which check failed.
pub async fn verify_credentials(
    conn: &mut SqliteConnection,
    email: &str,
    secret: &str,
) -> Result<User, ApiError> {
    let user = find_by_email(conn, email).await?;

    let user = match user {
        Some(u) if password::verify_password(&u.password_hash, secret) => u,
        _ => return Err(ApiError::unauthenticated("Invalid credentials")),
    };

    if user.status != UserStatus::Active {
        return Err(ApiError::unauthenticated("Account is not active"));
    }

    Ok(user)
}
