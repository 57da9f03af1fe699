//! Credential exchange handler.
//!
//! # Responsibilities
//! - Accept a login submission as JSON or form fields
//! - Forward credentials to the backend's sign-in endpoint, once
//! - Extract the issued token from the backend's Authorization response
//!   header and commit it to the session cookie
//! - Tell the caller where to resume navigation
//!
//! # Design Decisions
//! - A backend 2xx without the Authorization header is a contract breach
//!   (500), deliberately distinct from wrong credentials (401)
//! - Exactly one cookie write per successful call, no retries: replaying a
//!   login POST risks duplicate-submission ambiguity

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::relay::forward::SignInOutcome;
use crate::session;

/// Login submission; both JSON and form encodings deserialize into this.
#[derive(Debug, Default, Deserialize)]
struct LoginSubmission {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    next: Option<String>,
}

/// `POST /api/auth/login`.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
) -> Response {
    match exchange_credentials(&state, request).await {
        Ok((token, next)) => {
            // The one cookie write of this call.
            let jar = jar.add(session::session_cookie(&token, &state.config.session));
            tracing::info!(next = %next, "credential exchange succeeded");
            (jar, Json(json!({ "ok": true, "next": next }))).into_response()
        }
        Err(err) => {
            tracing::warn!(error = %err, "credential exchange failed");
            err.into_response()
        }
    }
}

/// `POST /api/auth/logout`: destroy the session cookie.
pub async fn logout_handler(jar: CookieJar) -> Response {
    let jar = jar.add(session::clear_session_cookie());
    (jar, Json(json!({ "ok": true }))).into_response()
}

async fn exchange_credentials(
    state: &AppState,
    request: Request<Body>,
) -> Result<(String, String), GatewayError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let bytes = axum::body::to_bytes(request.into_body(), state.config.limits.max_body_bytes)
        .await
        .map_err(|e| GatewayError::Unexpected(format!("body read failed: {e}")))?;

    // JSON or form, picked by Content-Type; an unparseable body degrades to
    // empty fields and is reported as missing credentials.
    let submission: LoginSubmission = if content_type.contains("application/json") {
        serde_json::from_slice(&bytes).unwrap_or_default()
    } else {
        serde_urlencoded::from_bytes(&bytes).unwrap_or_default()
    };

    let email = submission.email.trim();
    let password = submission.password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(GatewayError::MissingCredentials);
    }

    let next = submission
        .next
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "/".to_string());

    match state.backend.sign_in(email, password).await? {
        SignInOutcome::Denied => Err(GatewayError::InvalidCredentials),
        SignInOutcome::MissingAuthHeader => Err(GatewayError::NoAuthHeaderFromBackend),
        SignInOutcome::Token(token) => Ok((token, next)),
    }
}
