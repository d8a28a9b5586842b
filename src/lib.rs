pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod resource;
pub mod schema;
pub mod store;

use std::sync::Arc;

use axum::http::{header, Method};
use axum::{middleware as layers, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::store::DocumentStore;

/// Shared per-request context: read-only configuration, the signing keys and
/// the store handle. Everything here is safe for concurrent use.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub tokens: TokenService,
    pub http: reqwest::Client,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .route("/docs", get(handlers::system::docs))
        // OAuth login flow
        .merge(auth_routes())
        // Resource groups; mutating operations are guarded per-route
        .nest("/api/users", handlers::resources::resource_router(&resource::USERS, &state))
        .nest("/api/games", handlers::resources::resource_router(&resource::GAMES, &state))
        .nest(
            "/api/characters",
            handlers::resources::resource_router(&resource::CHARACTERS, &state),
        )
        .nest(
            "/api/developers",
            handlers::resources::resource_router(&resource::DEVELOPERS, &state),
        )
        .nest(
            "/api/reviews",
            handlers::resources::resource_router(&resource::REVIEWS, &state),
        )
        // Global middleware; the bridge runs before routing so every handler
        // under /api sees credentials on the Authorization header only
        .layer(layers::from_fn(middleware::cookie_auth_bridge))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::auth;

    Router::new()
        .route("/api/auth/token", get(auth::token))
        .route("/api/auth/:provider", get(auth::login))
        .route("/api/auth/:provider/callback", get(auth::callback))
}
