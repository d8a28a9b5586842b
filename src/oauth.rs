//! OAuth identity-provider plumbing: the provider registry, the signed
//! `state` parameter, and the code-exchange/userinfo HTTP calls.
//!
//! The flow is stateless on our side: instead of a server-side session, the
//! `state` round-tripped through the provider carries the requested response
//! mode plus a digest keyed by the session secret, so the callback can verify
//! it minted the value without any storage.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use url::Url;
use uuid::Uuid;

use crate::config::ProviderCredentials;

/// A supported identity provider's endpoints.
#[derive(Debug)]
pub struct Provider {
    pub name: &'static str,
    pub auth_url: &'static str,
    pub token_url: &'static str,
    pub userinfo_url: &'static str,
    pub scopes: &'static str,
}

pub static PROVIDERS: &[Provider] = &[Provider {
    name: "google",
    auth_url: "https://accounts.google.com/o/oauth2/v2/auth",
    token_url: "https://oauth2.googleapis.com/token",
    userinfo_url: "https://openidconnect.googleapis.com/v1/userinfo",
    scopes: "openid profile email",
}];

pub fn provider(name: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.name == name)
}

/// How the callback should hand the issued token back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Set the HTTP-only `jwt` cookie and redirect to the docs UI.
    Browser,
    /// Respond with a `{token, user}` JSON body.
    Json,
}

impl ResponseMode {
    fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Browser => "web",
            ResponseMode::Json => "json",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "web" => Some(ResponseMode::Browser),
            "json" => Some(ResponseMode::Json),
            _ => None,
        }
    }
}

/// Mints a `state` value of the form `nonce.mode.signature`.
pub fn sign_state(mode: ResponseMode, session_secret: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    let sig = state_signature(&nonce, mode.as_str(), session_secret);
    format!("{}.{}.{}", nonce, mode.as_str(), sig)
}

/// Verifies a callback `state` and recovers the response mode.
pub fn verify_state(state: &str, session_secret: &str) -> Option<ResponseMode> {
    let mut parts = state.splitn(3, '.');
    let nonce = parts.next()?;
    let mode_str = parts.next()?;
    let sig = parts.next()?;

    let mode = ResponseMode::parse(mode_str)?;
    if state_signature(nonce, mode_str, session_secret) != sig {
        return None;
    }
    Some(mode)
}

fn state_signature(nonce: &str, mode: &str, session_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(b".");
    hasher.update(mode.as_bytes());
    hasher.update(b".");
    hasher.update(session_secret.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// Builds the provider authorize URL the login handler redirects to.
pub fn authorize_url(
    provider: &Provider,
    credentials: &ProviderCredentials,
    redirect_uri: &str,
    state: &str,
) -> Result<String, url::ParseError> {
    let mut url = Url::parse(provider.auth_url)?;
    url.query_pairs_mut()
        .append_pair("client_id", &credentials.client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", provider.scopes)
        .append_pair("state", state);
    Ok(url.into())
}

#[derive(Debug, Deserialize)]
struct TokenExchange {
    access_token: String,
}

/// The verified identity the provider reports for the logged-in user.
#[derive(Debug, Deserialize)]
pub struct ProviderIdentity {
    /// Provider-scoped stable user identifier.
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Exchanges an authorization code for the provider's access token, then
/// fetches the user's profile with it.
pub async fn fetch_identity(
    http: &reqwest::Client,
    provider: &Provider,
    credentials: &ProviderCredentials,
    redirect_uri: &str,
    code: &str,
) -> Result<ProviderIdentity, reqwest::Error> {
    let exchange: TokenExchange = http
        .post(provider.token_url)
        .form(&[
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    http.get(provider.userinfo_url)
        .bearer_auth(&exchange.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
