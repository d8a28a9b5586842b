use std::env;

/// Runtime configuration, read from the environment once at startup and
/// injected into `AppState`. The signing secret lives here rather than in a
/// process-wide global so the token service can be constructed explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string. When absent the server falls back to the
    /// in-memory store (development convenience).
    pub database_url: Option<String>,
    pub port: u16,
    /// Public base URL used to build OAuth redirect URIs.
    pub public_url: String,
    pub jwt_secret: String,
    pub session_secret: String,
    pub jwt_expiry_hours: u64,
    pub google: ProviderCredentials,
}

/// Client credentials registered with an OAuth identity provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = parse_port(env::var("PORT").ok());

        Self {
            database_url: env::var("DATABASE_URL").ok(),
            port,
            public_url: env::var("PUBLIC_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
            session_secret: env::var("SESSION_SECRET")
                .unwrap_or_else(|_| "keyboard cat".to_string()),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24 * 7),
            google: ProviderCredentials {
                client_id: env::var("GOOGLE_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default(),
            },
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(3000)
}
