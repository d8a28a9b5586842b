use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{Claims, TokenService};
use crate::error::ApiError;
use crate::AppState;

/// Session cookie carrying the signed token for browser clients.
pub const TOKEN_COOKIE: &str = "jwt";

/// Authenticated user context extracted from a verified token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
        }
    }
}

/// Cookie-to-header bridge: if a `jwt` session cookie is present on a request
/// under the API prefix, rewrite it into a standard `Authorization: Bearer`
/// header (overwriting any existing one) so downstream handlers read
/// credentials from exactly one place. Never rejects a request.
pub async fn cookie_auth_bridge(mut request: Request, next: Next) -> Response {
    if request.uri().path().starts_with("/api") {
        if let Some(bearer) = bearer_from_cookie(request.headers()) {
            if let Ok(value) = HeaderValue::from_str(&bearer) {
                request.headers_mut().insert(header::AUTHORIZATION, value);
            }
        }
    }
    next.run(request).await
}

/// Pure part of the bridge: (incoming headers) -> synthesized header value.
pub fn bearer_from_cookie(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').map(str::trim).find_map(|pair| {
        let (name, token) = pair.split_once('=')?;
        (name == TOKEN_COOKIE && !token.is_empty()).then(|| format!("Bearer {}", token))
    })
}

/// Route guard for mutating operations: rejects requests without a valid
/// bearer token, otherwise attaches the decoded identity to the request and
/// invokes the wrapped handler.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;
    let claims = state
        .tokens
        .verify(&token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Header-based authentication without rejection semantics; the token refresh
/// endpoint uses this to distinguish "authenticated" from "not".
pub fn claims_from_headers(headers: &HeaderMap, tokens: &TokenService) -> Option<Claims> {
    let token = extract_bearer(headers).ok()?;
    tokens.verify(&token).ok()
}

/// Extract the bearer token from the Authorization header
fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err("Empty bearer token".to_string()),
        None => Err("Authorization header must use Bearer token format".to_string()),
    }
}
