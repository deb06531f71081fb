pub mod models;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

/// Embedded schema migrations, applied at startup (and by tests against
/// throwaway databases).
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Open the connection pool for the configured database URL.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    info!("connected to database: {}", url);
    Ok(pool)
}

/// Run pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Fresh in-memory database with the full schema; used by unit tests.
/// A single connection keeps every handle on the same in-memory store.
/// Foreign keys stay at SQLite's default (off) so fixtures can reference
/// users that are not seeded.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqliteConnectOptions;
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("in-memory database options")
        .foreign_keys(false);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("in-memory database");
    migrate(&pool).await.expect("migrations");
    pool
}
