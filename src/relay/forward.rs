//! Unified backend forwarder.
//!
//! # Responsibilities
//! - Build the outbound request: target URL, constrained header set,
//!   synthesized bearer header, pass-through body
//! - Enforce the open-relay guard for caller-supplied targets
//! - Apply an optional hard timeout with clean cancellation
//! - Map transport faults to the caller's error style
//!
//! # Design Decisions
//! - One forwarding component serves both the generic auth gateway
//!   (caller-supplied target, no timeout, internal-error mapping) and the
//!   scoped relay endpoints (fixed target, hard timeout, bad-gateway
//!   mapping). The two differ only in the policy fields of [`Forward`].
//! - Past the authorization boundary the forwarder is a transparent byte
//!   pipe: status, body text, and Content-Type are passed through untouched;
//!   no other response header is copied and the payload is never reparsed.
//! - Responses are never cached; everything relayed here is session-bound.

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::BackendConfig;
use crate::error::GatewayError;

/// Upper bound on a buffered backend response.
const MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;

/// Hint returned when a caller-supplied target fails the allowlist check.
const TARGET_HINT: &str = "supply ?to=/api/... (targets must stay under the protected API prefix)";

/// How a transport-level failure is surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorStyle {
    /// Generic gateway: an internal fault, 500 `unexpected`.
    Internal,
    /// Scoped relay: 502 with the underlying message.
    BadGateway,
}

/// A fully resolved forward request descriptor.
pub struct Forward<'a> {
    pub method: Method,
    /// Backend path, already validated against the allowlist where needed.
    pub path: &'a str,
    /// Query string to forward, minus any routing parameters.
    pub query: Option<String>,
    /// Raw pass-through body for body-bearing methods.
    pub body: Option<Bytes>,
    /// Caller's Content-Type; defaulted to JSON when a body is present.
    pub content_type: Option<String>,
    /// Inbound trace id, copied through for cross-service correlation.
    pub request_id: Option<String>,
    /// Session token to synthesize the Authorization header from.
    pub bearer: &'a str,
    /// Hard wait bound; the in-flight call is dropped when it elapses.
    pub timeout: Option<Duration>,
    pub error_style: UpstreamErrorStyle,
}

/// Backend response, buffered as text for transparent pass-through.
pub struct ForwardResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
}

impl IntoResponse for ForwardResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Outcome of a credential exchange with the backend.
pub enum SignInOutcome {
    /// Backend answered non-2xx.
    Denied,
    /// Backend answered 2xx but without an Authorization header.
    MissingAuthHeader,
    /// Issued token, Bearer prefix already stripped.
    Token(String),
}

/// HTTP client bound to the configured backend base address.
///
/// The base address is injected at construction; nothing in the relay path
/// reads process-wide state at call time.
pub struct BackendClient {
    client: Client<HttpConnector, Body>,
    base_url: String,
    sign_in_path: String,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            base_url: config.base_url.clone(),
            sign_in_path: config.sign_in_path.clone(),
        }
    }

    /// Forward a request to the backend and buffer the response for
    /// pass-through.
    pub async fn forward(&self, fwd: Forward<'_>) -> Result<ForwardResponse, GatewayError> {
        if self.base_url.is_empty() {
            return Err(GatewayError::MissingConfig("backend_base_url"));
        }

        let mut url = format!("{}{}", self.base_url, fwd.path);
        if let Some(ref qs) = fwd.query {
            if !qs.is_empty() {
                url.push('?');
                url.push_str(qs);
            }
        }
        let uri: Uri = url
            .parse()
            .map_err(|e| GatewayError::Unexpected(format!("bad forward url: {e}")))?;

        let mut builder = Request::builder()
            .method(fwd.method)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, format!("Bearer {}", fwd.bearer));

        if fwd.body.is_some() || fwd.content_type.is_some() {
            let content_type = fwd
                .content_type
                .as_deref()
                .unwrap_or("application/json")
                .to_string();
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        if let Some(ref rid) = fwd.request_id {
            if let Ok(value) = HeaderValue::from_str(rid) {
                builder = builder.header("x-request-id", value);
            }
        }

        let request = builder
            .body(match fwd.body {
                Some(bytes) => Body::from(bytes),
                None => Body::empty(),
            })
            .map_err(|e| GatewayError::Unexpected(format!("bad forward request: {e}")))?;

        let style = fwd.error_style;
        let call = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| transport_error(style, &e.to_string()))?;

            let status = response.status();
            let content_type = response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("application/json")
                .to_string();
            let bytes = axum::body::to_bytes(Body::new(response.into_body()), MAX_RESPONSE_BYTES)
                .await
                .map_err(|e| transport_error(style, &e.to_string()))?;

            Ok(ForwardResponse {
                status,
                content_type,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            })
        };

        // Timeout cancellation drops the in-flight call; neither the timer
        // nor the backend request outlives this function.
        match fwd.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| GatewayError::UpstreamTimeout)?,
            None => call.await,
        }
    }

    /// Exchange credentials for a token at the backend's sign-in endpoint.
    ///
    /// One backend call, never retried: replaying a login POST risks
    /// duplicate-submission ambiguity.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignInOutcome, GatewayError> {
        if self.base_url.is_empty() {
            return Err(GatewayError::MissingConfig("backend_base_url"));
        }

        let uri: Uri = format!("{}{}", self.base_url, self.sign_in_path)
            .parse()
            .map_err(|e| GatewayError::Unexpected(format!("bad sign-in url: {e}")))?;
        let payload = serde_json::json!({ "user": { "email": email, "password": password } });

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .map_err(|e| GatewayError::Unexpected(format!("bad sign-in request: {e}")))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| GatewayError::Unexpected(format!("sign-in request failed: {e}")))?;

        if !response.status().is_success() {
            return Ok(SignInOutcome::Denied);
        }

        match response
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            Some(auth) => Ok(SignInOutcome::Token(strip_bearer_prefix(auth).to_string())),
            None => Ok(SignInOutcome::MissingAuthHeader),
        }
    }
}

fn transport_error(style: UpstreamErrorStyle, message: &str) -> GatewayError {
    match style {
        UpstreamErrorStyle::Internal => GatewayError::Unexpected(message.to_string()),
        UpstreamErrorStyle::BadGateway => GatewayError::Upstream(message.to_string()),
    }
}

/// Validate a caller-supplied target path against the allowlist prefix.
///
/// This runs before any session check or backend call; a target outside the
/// protected prefix must never produce upstream traffic.
pub fn resolve_caller_target<'a>(
    to: Option<&'a str>,
    allowed_prefix: &str,
) -> Result<&'a str, GatewayError> {
    match to {
        Some(path) if !path.is_empty() && path.starts_with(allowed_prefix) => Ok(path),
        _ => Err(GatewayError::InvalidTarget { hint: TARGET_HINT }),
    }
}

/// Strip a case-insensitive `Bearer` prefix plus surrounding whitespace.
fn strip_bearer_prefix(auth: &str) -> &str {
    let trimmed = auth.trim_start();
    if trimmed.len() >= 6 && trimmed[..6].eq_ignore_ascii_case("bearer") {
        let rest = &trimmed[6..];
        if rest.starts_with(char::is_whitespace) {
            return rest.trim_start();
        }
    }
    trimmed
}
