//! Gateway error taxonomy.
//!
//! # Responsibilities
//! - One error type covering every failure the gateway surfaces to callers
//! - Map each variant to a status code and a stable machine-readable body
//! - Convert backend-call faults at the boundary; nothing propagates unhandled
//!
//! # Design Decisions
//! - Error bodies use the shape `{error, hint?, message?}` with a stable
//!   `error` code field for programmatic handling
//! - The edge gatekeeper never uses this type: auth failures there redirect,
//!   they do not produce an error body

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Every failure the gateway can surface to a caller.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Login submission with an empty email or password.
    #[error("missing credentials")]
    MissingCredentials,

    /// Backend rejected the submitted credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Backend accepted the login but omitted the Authorization header.
    /// Distinct from `InvalidCredentials` so operators can tell "wrong
    /// password" from "backend contract broken".
    #[error("backend returned no Authorization header")]
    NoAuthHeaderFromBackend,

    /// A required configuration value was absent at call time.
    #[error("missing configuration value: {0}")]
    MissingConfig(&'static str),

    /// The caller-supplied forward target failed the allowlist check.
    #[error("invalid forward target")]
    InvalidTarget { hint: &'static str },

    /// Method outside the gateway's allowed set.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// No session token at a point where a protected call needs one.
    #[error("no session token")]
    Unauthorized,

    /// The backend did not answer within the relay timeout window.
    #[error("upstream timeout")]
    UpstreamTimeout,

    /// Transport-level failure talking to the backend.
    #[error("upstream request failed: {0}")]
    Upstream(String),

    /// Catch-all for internal faults; never leaks as an unhandled error page.
    #[error("unexpected gateway error: {0}")]
    Unexpected(String),
}

impl GatewayError {
    /// Status code this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredentials => StatusCode::BAD_REQUEST,
            GatewayError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GatewayError::NoAuthHeaderFromBackend => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::MissingConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::UpstreamTimeout => StatusCode::BAD_GATEWAY,
            GatewayError::Upstream(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body for this error.
    ///
    /// Upstream failures echo the underlying message as the `error` field
    /// (the scoped-relay contract); everything else uses a fixed code.
    pub fn body(&self) -> serde_json::Value {
        match self {
            GatewayError::MissingCredentials => json!({ "error": "missing_credentials" }),
            GatewayError::InvalidCredentials => json!({ "error": "invalid_credentials" }),
            GatewayError::NoAuthHeaderFromBackend => {
                json!({ "error": "no_auth_header_from_backend" })
            }
            GatewayError::MissingConfig(name) => json!({ "error": format!("missing_{name}") }),
            GatewayError::InvalidTarget { hint } => {
                json!({ "error": "invalid_to", "hint": hint })
            }
            GatewayError::MethodNotAllowed => json!({ "error": "method_not_allowed" }),
            GatewayError::Unauthorized => json!({ "error": "unauthorized" }),
            GatewayError::UpstreamTimeout => json!({ "error": "upstream timeout" }),
            GatewayError::Upstream(msg) => json!({ "error": msg }),
            GatewayError::Unexpected(msg) => json!({ "error": "unexpected", "message": msg }),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
