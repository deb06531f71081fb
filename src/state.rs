use sqlx::SqlitePool;

/// Shared application state. The pool is the only cross-request resource;
/// each handler opens its own connection or transaction from it.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
}
