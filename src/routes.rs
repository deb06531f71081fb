use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{middleware, Json, Router};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::config;
use crate::handlers::{analytics, auth, clients, routers, settings, sites, tickets, users};
use crate::middleware::auth::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router over the given pool.
pub fn app(pool: SqlitePool) -> Router {
    let state = AppState { pool };

    let mut router = Router::new()
        .route("/api/health", get(health))
        .merge(public_auth_routes())
        .merge(protected_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if config().security.enable_cors {
        router = router.layer(cors_layer());
    }

    router
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn public_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/register", post(auth::register))
}

fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/profile", get(auth::get_profile).put(auth::update_profile))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", put(users::update).delete(users::delete))
        .route("/api/users/technicians", get(users::technicians))
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::get).put(clients::update).delete(clients::delete),
        )
        .route("/api/routers", get(routers::list).post(routers::create))
        .route("/api/routers/:id", put(routers::update).delete(routers::delete))
        .route("/api/routers/:id/status", put(routers::update_status))
        .route("/api/sites", get(sites::list).post(sites::create))
        .route("/api/sites/:id", put(sites::update).delete(sites::delete))
        .route("/api/tickets", get(tickets::list).post(tickets::create))
        .route(
            "/api/tickets/:id",
            get(tickets::get).put(tickets::update).delete(tickets::delete),
        )
        .route(
            "/api/tickets/:id/comments",
            get(tickets::list_comments).post(tickets::add_comment),
        )
        .route("/api/settings", get(settings::list).post(settings::update))
        .route("/api/settings/:key", get(settings::get))
        .route("/api/analytics/dashboard", get(analytics::dashboard))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let origins = &config().security.cors_origins;
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}
