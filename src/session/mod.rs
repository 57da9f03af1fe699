//! Session store adapter.
//!
//! # Responsibilities
//! - Read and write the one server-controlled session cookie
//! - Own the cookie's name, flags, and lifetime in a single place
//!
//! # Design Decisions
//! - httpOnly always: the cookie is never readable by page scripts; the only
//!   legitimate reader is the gateway itself
//! - Value is the raw bearer token string, no additional encoding
//! - `secure` is environment-dependent and comes from configuration

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::SessionConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "token";

/// Build the session cookie holding a freshly issued token.
pub fn session_cookie(token: &str, config: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token.to_string()))
        .http_only(true)
        .secure(config.secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(config.max_age_secs as i64))
        .build()
}

/// Build the removal cookie used on logout.
pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Read the raw session token from the request's cookie jar, if present.
pub fn token_from_jar(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_string())
}
