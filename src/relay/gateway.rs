//! Generic auth gateway route.
//!
//! # Responsibilities
//! - Single multiplexed endpoint: the caller names the backend target via
//!   the `to` query parameter
//! - Enforce the method allowlist and the protected-prefix allowlist
//! - Translate the session cookie into the backend's bearer header
//! - Pass the backend's status/body/content-type through untouched
//!
//! # Design Decisions
//! - Check order is fixed: method, target, session, then forward. The target
//!   check precedes the session check so caller misuse is reported without
//!   decoding cost, and nothing reaches the backend for a bad target.
//! - Session check is presence-only; expiry is left to the backend's own
//!   rejection. The edge gatekeeper is the layer that fails fast on expiry.
//! - No caller-side timeout here; the underlying transport's behavior
//!   applies. Scoped relays are the timed variant.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, Request};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use url::form_urlencoded;

use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::forward::{resolve_caller_target, Forward, UpstreamErrorStyle};
use crate::session;

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
];

/// Handler for the single `/api/auth` gateway route, registered with `any()`
/// so the method check below owns the 405 response shape.
pub async fn gateway_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();

    match relay_to_target(&state, &jar, request).await {
        Ok((target, response)) => {
            metrics::record_request(method.as_str(), response.status.as_u16(), &target, start);
            response.into_response()
        }
        Err(err) => {
            metrics::record_request(method.as_str(), err.status().as_u16(), "rejected", start);
            err.into_response()
        }
    }
}

async fn relay_to_target(
    state: &AppState,
    jar: &CookieJar,
    request: Request<Body>,
) -> Result<(String, crate::relay::forward::ForwardResponse), GatewayError> {
    // 1. Method allowlist.
    let method = request.method().clone();
    if !ALLOWED_METHODS.contains(&method) {
        return Err(GatewayError::MethodNotAllowed);
    }

    // 2. Target resolution. `to` is a path, never a complete upstream URL;
    //    the prefix check is the open-relay guard.
    let query = request.uri().query().unwrap_or("");
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let to = pairs.iter().find(|(k, _)| k == "to").map(|(_, v)| v.as_str());
    let target = resolve_caller_target(to, &state.config.backend.protected_prefix)?.to_string();

    // 3. Remaining query parameters forwarded verbatim, minus the routing one.
    let forward_query = {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in pairs.iter().filter(|(k, _)| k != "to") {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    };

    // 4. Session presence.
    let token = session::token_from_jar(jar).ok_or(GatewayError::Unauthorized)?;

    // 5. Raw body for body-bearing methods; Content-Type from the caller.
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let has_body = method != Method::GET && method != Method::HEAD;
    let body = if has_body {
        let bytes = axum::body::to_bytes(request.into_body(), state.config.limits.max_body_bytes)
            .await
            .map_err(|e| GatewayError::Unexpected(format!("body read failed: {e}")))?;
        Some(bytes)
    } else {
        None
    };

    tracing::debug!(
        method = %method,
        target = %target,
        "forwarding via auth gateway"
    );

    // 6. Forward with the synthesized bearer header.
    let response = state
        .backend
        .forward(Forward {
            method,
            path: &target,
            query: (!forward_query.is_empty()).then_some(forward_query),
            body,
            content_type: if has_body { content_type } else { None },
            request_id,
            bearer: &token,
            timeout: None,
            error_style: UpstreamErrorStyle::Internal,
        })
        .await?;

    Ok((target, response))
}
