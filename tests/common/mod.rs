use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// An in-process server over a private in-memory database. Each test spawns
/// its own so tests never share state.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    pub pool: SqlitePool,
}

pub async fn spawn_app() -> Result<TestServer> {
    // One connection keeps the in-memory database alive for the whole test.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("failed to open in-memory database")?;
    helpdesk_api::database::migrate(&pool).await?;

    let app = helpdesk_api::routes::app(pool.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(TestServer {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        pool,
    })
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return their bearer token. Role defaults to agent
    /// server-side when not given.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({ "name": name, "email": email, "password": password });
        if let Some(role) = role {
            body["role"] = json!(role);
        }
        let res = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&body)
            .send()
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "register failed with {}",
            res.status()
        );
        let body: Value = res.json().await?;
        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("register response missing access_token")
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed with {}", res.status());
        let body: Value = res.json().await?;
        body.get("access_token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("login response missing access_token")
    }

    pub async fn get(&self, token: &str, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    pub async fn post(&self, token: &str, path: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn put(&self, token: &str, path: &str, body: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    pub async fn delete(&self, token: &str, path: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await?)
    }

    /// Create a client record and return its id.
    pub async fn create_client(&self, token: &str, name: &str, email: &str) -> Result<i64> {
        let res = self
            .post(
                token,
                "/api/clients",
                &json!({
                    "name": name,
                    "email": email,
                    "phone": "555-0100",
                    "address": "1 Main St",
                }),
            )
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create client failed with {}",
            res.status()
        );
        let body: Value = res.json().await?;
        body.pointer("/client/id")
            .and_then(Value::as_i64)
            .context("create client response missing id")
    }

    /// Create a ticket for a client and return its id.
    pub async fn create_ticket(&self, token: &str, title: &str, client_id: i64) -> Result<i64> {
        let res = self
            .post(
                token,
                "/api/tickets",
                &json!({ "title": title, "client_id": client_id }),
            )
            .await?;
        anyhow::ensure!(
            res.status() == StatusCode::CREATED,
            "create ticket failed with {}",
            res.status()
        );
        let body: Value = res.json().await?;
        body.pointer("/ticket/id")
            .and_then(Value::as_i64)
            .context("create ticket response missing id")
    }

    pub async fn audit_count(&self) -> Result<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM activity_log")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0)
    }

    pub async fn last_audit_action(&self) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT action FROM activity_log ORDER BY id DESC LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|r| r.0))
    }
}

/// Pull the error message out of an error response body.
pub async fn error_message(res: reqwest::Response) -> Result<String> {
    let body: Value = res.json().await?;
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .context("response missing error field")
}
