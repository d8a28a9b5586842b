pub mod auth;

pub use auth::{cookie_auth_bridge, require_auth, AuthUser, TOKEN_COOKIE};
