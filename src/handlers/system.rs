use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::AppState;

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "GameDB API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Game database REST API with OAuth login and JWT-protected CRUD",
        "docs": "/docs",
    }))
}

/// GET /docs - endpoint map; stands in for an interactive documentation UI
/// and is where the browser login flow lands after setting the session cookie.
pub async fn docs() -> Json<Value> {
    Json(json!({
        "auth": {
            "login": "GET /api/auth/google (302 to provider; ?response=json for the API flow)",
            "callback": "GET /api/auth/google/callback",
            "token": "GET /api/auth/token (session required)",
        },
        "resources": {
            "users": "/api/users[/:id]",
            "games": "/api/games[/:id]",
            "characters": "/api/characters[/:id]",
            "developers": "/api/developers[/:id]",
            "reviews": "/api/reviews[/:id]",
        },
        "notes": "GET is public; POST/PUT/DELETE require `Authorization: Bearer <token>` or the jwt cookie",
    }))
}

/// GET /health - liveness plus store connectivity
pub async fn health(State(app): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match app.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "timestamp": now })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "error": e.to_string(),
            })),
        ),
    }
}
