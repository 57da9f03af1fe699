//! Scoped relay endpoints for the onboarding workflow.
//!
//! # Responsibilities
//! - Fixed-path POST relays: start, pebble, reply, finish
//! - Session presence check, hard timeout, bad-gateway error mapping
//! - Derive the workflow state from the reply payload for observability
//!
//! # Design Decisions
//! - Each route is bound to exactly one backend path; the caller never picks
//!   a target here, which eliminates the allowlist check at this layer
//! - Workflow continuation is an explicit two-state machine: the finish call
//!   is issued by the caller if and only if the reply result carried
//!   `done == true`, never inferred implicitly

use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{Method, Request};
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;

use crate::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::forward::{Forward, ForwardResponse, UpstreamErrorStyle};
use crate::session;

const START_PATH: &str = "/api/onboarding/start";
const PEBBLE_PATH: &str = "/api/onboarding/pebble";
const REPLY_PATH: &str = "/api/onboarding/reply";
const FINISH_PATH: &str = "/api/onboarding/finish";

/// Caller-visible progress of the onboarding workflow.
///
/// The transition out of `InProgress` happens on exactly one condition: the
/// reply payload carries `done == true`. A caller issues the finish call iff
/// [`WorkflowState::should_finish`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    InProgress,
    Completed,
}

impl WorkflowState {
    /// Apply the single transition rule to a reply result.
    pub fn after_reply(done: bool) -> Self {
        if done {
            WorkflowState::Completed
        } else {
            WorkflowState::InProgress
        }
    }

    /// Whether the finish step may be issued.
    pub fn should_finish(self) -> bool {
        self == WorkflowState::Completed
    }
}

/// `POST /api/relay/onboarding/start` — forwards the raw body.
pub async fn start(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
) -> Response {
    let started = Instant::now();
    let body = match read_body(&state, request).await {
        Ok(bytes) => bytes,
        Err(err) => return respond(START_PATH, started, Err(err)),
    };
    let result = relay_step(&state, &jar, START_PATH, Some(body)).await;
    respond(START_PATH, started, result)
}

/// `POST /api/relay/onboarding/pebble` — no body; fetches the initial prompt.
pub async fn pebble(State(state): State<AppState>, jar: CookieJar) -> Response {
    let started = Instant::now();
    let result = relay_step(&state, &jar, PEBBLE_PATH, None).await;
    respond(PEBBLE_PATH, started, result)
}

/// `POST /api/relay/onboarding/reply` — forwards the raw body and derives
/// the workflow state from the passthrough payload.
pub async fn reply(
    State(state): State<AppState>,
    jar: CookieJar,
    request: Request<Body>,
) -> Response {
    let started = Instant::now();
    let body = match read_body(&state, request).await {
        Ok(bytes) => bytes,
        Err(err) => return respond(REPLY_PATH, started, Err(err)),
    };
    let result = relay_step(&state, &jar, REPLY_PATH, Some(body)).await;

    // Observability only: the payload is inspected for the done flag but
    // returned to the caller byte-for-byte as the backend produced it.
    if let Ok(forwarded) = &result {
        if forwarded.status.is_success() {
            let workflow = workflow_state_of(forwarded);
            tracing::info!(
                workflow = ?workflow,
                finish_next = workflow.should_finish(),
                "reply relayed"
            );
        }
    }
    respond(REPLY_PATH, started, result)
}

/// `POST /api/relay/onboarding/finish` — no body; closes the workflow.
/// Callers issue this only when the reply result said `done == true`.
pub async fn finish(State(state): State<AppState>, jar: CookieJar) -> Response {
    let started = Instant::now();
    let result = relay_step(&state, &jar, FINISH_PATH, None).await;
    respond(FINISH_PATH, started, result)
}

/// Shared scoped-relay step: session presence, fixed path, hard timeout.
async fn relay_step(
    state: &AppState,
    jar: &CookieJar,
    path: &'static str,
    body: Option<Bytes>,
) -> Result<ForwardResponse, GatewayError> {
    let token = session::token_from_jar(jar).ok_or(GatewayError::Unauthorized)?;

    state
        .backend
        .forward(Forward {
            method: Method::POST,
            path,
            query: None,
            body,
            // The scoped relay always declares JSON, body or not.
            content_type: Some("application/json".to_string()),
            request_id: None,
            bearer: &token,
            timeout: Some(Duration::from_millis(state.config.timeouts.relay_ms)),
            error_style: UpstreamErrorStyle::BadGateway,
        })
        .await
}

fn respond(
    path: &'static str,
    started: Instant,
    result: Result<ForwardResponse, GatewayError>,
) -> Response {
    match result {
        Ok(forwarded) => {
            metrics::record_request("POST", forwarded.status.as_u16(), path, started);
            forwarded.into_response()
        }
        Err(err) => {
            tracing::warn!(path = path, error = %err, "scoped relay failed");
            metrics::record_request("POST", err.status().as_u16(), path, started);
            err.into_response()
        }
    }
}

async fn read_body(state: &AppState, request: Request<Body>) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(request.into_body(), state.config.limits.max_body_bytes)
        .await
        .map_err(|e| GatewayError::Unexpected(format!("body read failed: {e}")))
}

fn workflow_state_of(forwarded: &ForwardResponse) -> WorkflowState {
    let done = serde_json::from_str::<serde_json::Value>(&forwarded.body)
        .ok()
        .and_then(|v| v.get("done").and_then(serde_json::Value::as_bool))
        .unwrap_or(false);
    WorkflowState::after_reply(done)
}
