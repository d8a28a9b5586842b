//! OAuth login flow: redirect to the identity provider, receive the callback
//! with a verified identity, upsert the local user record and hand off to the
//! token service.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ProviderCredentials;
use crate::error::ApiError;
use crate::middleware::auth::claims_from_headers;
use crate::middleware::TOKEN_COOKIE;
use crate::models::User;
use crate::oauth::{self, Provider, ProviderIdentity, ResponseMode};
use crate::store::Document;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    /// `response=json` requests the API flow; the default is the browser flow.
    pub response: Option<String>,
}

/// GET /api/auth/:provider - redirect the browser to the identity provider
pub async fn login(
    State(app): State<AppState>,
    Path(provider_name): Path<String>,
    Query(query): Query<LoginQuery>,
) -> Result<Response, ApiError> {
    let provider =
        oauth::provider(&provider_name).ok_or_else(|| ApiError::not_found("Provider"))?;

    let mode = match query.response.as_deref() {
        Some("json") => ResponseMode::Json,
        _ => ResponseMode::Browser,
    };
    let state = oauth::sign_state(mode, &app.config.session_secret);
    let url = oauth::authorize_url(
        provider,
        credentials(&app, provider),
        &callback_uri(&app, provider),
        &state,
    )
    .map_err(|e| ApiError::internal(format!("bad provider authorize URL: {}", e)))?;

    Ok(found(&url))
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/:provider/callback - complete the login and issue a token.
/// On any failure the user is redirected to the failure location; no retry is
/// attempted.
pub async fn callback(
    State(app): State<AppState>,
    Path(provider_name): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(provider) = oauth::provider(&provider_name) else {
        return ApiError::not_found("Provider").into_response();
    };

    match run_callback(&app, provider, query).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!("oauth callback failed: {}", err.message());
            found("/")
        }
    }
}

async fn run_callback(
    app: &AppState,
    provider: &'static Provider,
    query: CallbackQuery,
) -> Result<Response, ApiError> {
    if let Some(error) = query.error {
        return Err(ApiError::unauthorized(format!("provider returned error: {}", error)));
    }

    let mode = query
        .state
        .as_deref()
        .and_then(|s| oauth::verify_state(s, &app.config.session_secret))
        .ok_or_else(|| ApiError::unauthorized("invalid state parameter"))?;
    let code = query
        .code
        .ok_or_else(|| ApiError::unauthorized("missing authorization code"))?;

    let identity = oauth::fetch_identity(
        &app.http,
        provider,
        credentials(app, provider),
        &callback_uri(app, provider),
        &code,
    )
    .await?;

    let user = upsert_user(app, provider, identity).await?;
    let token = app.tokens.issue(user.id, user.role.as_str())?;

    Ok(match mode {
        ResponseMode::Json => Json(json!({ "token": token, "user": user })).into_response(),
        ResponseMode::Browser => {
            let mut response = found("/docs");
            let cookie = format!("{}={}; HttpOnly; Path=/", TOKEN_COOKIE, token);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            response
        }
    })
}

/// GET /api/auth/token - fresh token for the current session (cookie or
/// header; the bridge has already normalized both onto the header)
pub async fn token(
    State(app): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let claims = claims_from_headers(&headers, &app.tokens)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let token = app.tokens.issue(claims.sub, &claims.role)?;
    Ok(Json(json!({ "token": token })))
}

/// Looks up the local user keyed by (provider, external id), creating it on
/// first login.
async fn upsert_user(
    app: &AppState,
    provider: &Provider,
    identity: ProviderIdentity,
) -> Result<User, ApiError> {
    let existing = app.store.find_all("users").await?.into_iter().find(|doc| {
        doc.get("provider").and_then(Value::as_str) == Some(provider.name)
            && doc.get("oauthId").and_then(Value::as_str) == Some(identity.sub.as_str())
    });

    let doc = match existing {
        Some(doc) => doc,
        None => {
            let email = identity
                .email
                .ok_or_else(|| ApiError::unauthorized("identity provider did not supply an email"))?;
            let name = identity.name.unwrap_or_else(|| email.clone());

            let mut doc = Document::new();
            doc.insert("oauthId".to_string(), json!(identity.sub));
            doc.insert("provider".to_string(), json!(provider.name));
            doc.insert("email".to_string(), json!(email));
            doc.insert("name".to_string(), json!(name));
            if let Some(picture) = identity.picture {
                doc.insert("avatar".to_string(), json!(picture));
            }
            doc.insert("role".to_string(), json!("user"));
            doc.insert("createdAt".to_string(), json!(chrono::Utc::now()));

            app.store.insert("users", doc).await?
        }
    };

    serde_json::from_value(Value::Object(doc)).map_err(|e| {
        tracing::error!("stored user record is malformed: {}", e);
        ApiError::internal("Stored user record is malformed")
    })
}

fn credentials<'a>(app: &'a AppState, provider: &Provider) -> &'a ProviderCredentials {
    // Single registered provider today; extend alongside oauth::PROVIDERS.
    debug_assert_eq!(provider.name, "google");
    &app.config.google
}

fn callback_uri(app: &AppState, provider: &Provider) -> String {
    format!("{}/api/auth/{}/callback", app.config.public_url, provider.name)
}

/// 302 redirect; axum's `Redirect` only emits 303/307/308.
fn found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
