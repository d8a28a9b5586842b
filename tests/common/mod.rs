#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gamedb_api::auth::TokenService;
use gamedb_api::config::{AppConfig, ProviderCredentials};
use gamedb_api::store::MemStore;
use gamedb_api::{app, AppState};

pub const SESSION_SECRET: &str = "integration-test-session";

/// In-process app over the in-memory store; no external services needed.
pub fn test_app() -> (Router, AppState) {
    let config = AppConfig {
        database_url: None,
        port: 0,
        public_url: "http://localhost:3000".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        session_secret: SESSION_SECRET.to_string(),
        jwt_expiry_hours: 1,
        google: ProviderCredentials {
            client_id: "test-client".to_string(),
            client_secret: "test-client-secret".to_string(),
        },
    };

    let state = AppState {
        tokens: TokenService::new(&config.jwt_secret, config.jwt_expiry_hours).unwrap(),
        config: Arc::new(config),
        store: Arc::new(MemStore::new()),
        http: reqwest::Client::new(),
    };

    (app(state.clone()), state)
}

/// A bearer token the route guard accepts.
pub fn bearer(state: &AppState) -> String {
    state.tokens.issue(Uuid::new_v4(), "user").unwrap()
}

/// Drives one request through the router and decodes the JSON body
/// (Null for empty bodies).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("infallible");
    let status = response.status();

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn get_with_headers(uri: &str, headers: &[(header::HeaderName, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// POST helper asserting 201 and returning the created record.
pub async fn create(app: &Router, token: &str, path: &str, payload: Value) -> Value {
    let (status, body) = send(app, json_request(Method::POST, path, Some(token), &payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create {} failed: {}", path, body);
    body
}

pub fn id_of(record: &Value) -> String {
    record["id"].as_str().expect("record id").to_string()
}
