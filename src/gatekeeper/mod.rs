//! Edge gatekeeper.
//!
//! # Responsibilities
//! - Run before any protected resource is served
//! - Allow excluded paths through unconditionally
//! - Redirect unauthenticated requests to the login resource, preserving the
//!   originally requested path as a resumption parameter
//!
//! # Design Decisions
//! - Check order: exclusion first (cheapest, and it prevents redirect loops
//!   on the login page), then cookie presence, then token expiry
//! - No side effects besides the redirect: the session cookie is never
//!   mutated here, and auth failure never produces an error body

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use url::form_urlencoded;

use crate::config::GatekeeperConfig;
use crate::http::server::AppState;
use crate::session;
use crate::token;

/// Middleware applied to the whole router.
pub async fn gatekeeper_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let config = &state.config.gatekeeper;
    let path = request.uri().path().to_string();

    if is_excluded(config, &path) {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    match session::token_from_jar(&jar) {
        Some(token) if !token::is_expired_or_invalid(&token) => next.run(request).await,
        _ => {
            tracing::debug!(path = %path, "unauthenticated, redirecting to login");
            login_redirect(config, &path).into_response()
        }
    }
}

/// Whether a path bypasses the session check entirely.
pub fn is_excluded(config: &GatekeeperConfig, path: &str) -> bool {
    path == config.login_path
        || config.excluded_paths.iter().any(|p| p == path)
        || config.excluded_prefixes.iter().any(|p| path.starts_with(p.as_str()))
}

fn login_redirect(config: &GatekeeperConfig, original_path: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", original_path)
        .finish();
    Redirect::temporary(&format!("{}?{}", config.login_path, query))
}
