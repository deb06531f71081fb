use anyhow::Context;

use helpdesk_api::{config, database, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting helpdesk API in {:?} mode", config.environment);

    let pool = database::connect(&config.database.url, config.database.max_connections)
        .await
        .context("failed to open database")?;
    database::migrate(&pool).await.context("failed to run migrations")?;

    let app = routes::app(pool);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
