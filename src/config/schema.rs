//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so minimal configs work.

use serde::{Deserialize, Serialize};

/// Root configuration for the authentication gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Protected backend the gateway relays to.
    pub backend: BackendConfig,

    /// Session cookie settings.
    pub session: SessionConfig,

    /// Edge gatekeeper exclusions and login resource.
    pub gatekeeper: GatekeeperConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1:8080".to_string() }
    }
}

/// Backend the gateway forwards to. The base address is a fixed external
/// configuration value; there is no service discovery.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend API (e.g., "http://localhost:3001").
    /// No trailing slash; forward paths are appended verbatim.
    pub base_url: String,

    /// Sign-in endpoint path on the backend.
    pub sign_in_path: String,

    /// Allowlist prefix for caller-supplied forward targets. This is the
    /// open-relay guard: the generic gateway refuses any target outside it.
    pub protected_prefix: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            sign_in_path: "/users/sign_in".to_string(),
            protected_prefix: "/api/".to_string(),
        }
    }
}

/// Session cookie settings. The cookie name and flags are fixed; only the
/// environment-dependent parts are configurable.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Set the Secure attribute (true in production deployments).
    pub secure: bool,

    /// Cookie lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { secure: false, max_age_secs: 86_400 }
    }
}

/// Edge gatekeeper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatekeeperConfig {
    /// Login resource unauthenticated requests are redirected to. The login
    /// page itself always passes through (avoids redirect loops).
    pub login_path: String,

    /// Path prefixes exempt from the session check (static assets, the
    /// API surface which enforces its own session handling).
    pub excluded_prefixes: Vec<String>,

    /// Exact paths exempt from the session check.
    pub excluded_paths: Vec<String>,
}

impl Default for GatekeeperConfig {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            excluded_prefixes: vec!["/assets".to_string(), "/api".to_string()],
            excluded_paths: vec!["/favicon.ico".to_string(), "/robots.txt".to_string()],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout at the server boundary, in seconds.
    pub request_secs: u64,

    /// Hard wait bound for scoped relay calls, in milliseconds. The generic
    /// gateway deliberately carries no caller-side timeout.
    pub relay_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30, relay_ms: 10_000 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self { max_body_bytes: 2 * 1024 * 1024 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
