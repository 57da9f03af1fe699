//! Relay subsystem: everything that turns an inbound authenticated request
//! into a backend call.
//!
//! # Data Flow
//! ```text
//! inbound request (session cookie)
//!     → gateway.rs  (caller-supplied target, allowlist-checked)   ─┐
//!     → onboarding.rs (fixed targets, hard timeout)               ─┤
//!     → login.rs    (credential exchange, cookie write)           ─┤
//!                                                                  ▼
//!                                  forward.rs (one forwarding component:
//!                                  bearer synthesis, header assembly,
//!                                  timeout policy, error mapping)
//!                                                                  ▼
//!                                             backend HTTP contract
//! ```

pub mod forward;
pub mod gateway;
pub mod login;
pub mod onboarding;

pub use forward::{BackendClient, Forward, ForwardResponse, UpstreamErrorStyle};
pub use onboarding::WorkflowState;
