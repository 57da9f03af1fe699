//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the backend base URL is present and well-formed
//! - Validate value ranges (timeouts > 0, paths absolute)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig -> Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system, so handlers can assume
//!   an injected, well-formed backend address

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.base_url.is_empty() {
        errors.push(ValidationError {
            field: "backend.base_url",
            message: "missing_backend_base_url".to_string(),
        });
    } else {
        match Url::parse(&config.backend.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    errors.push(ValidationError {
                        field: "backend.base_url",
                        message: format!("unsupported scheme '{}'", url.scheme()),
                    });
                }
                if config.backend.base_url.ends_with('/') {
                    errors.push(ValidationError {
                        field: "backend.base_url",
                        message: "must not end with '/' (paths are appended verbatim)".to_string(),
                    });
                }
            }
            Err(e) => errors.push(ValidationError {
                field: "backend.base_url",
                message: format!("not a valid URL: {e}"),
            }),
        }
    }

    for (field, path) in [
        ("backend.sign_in_path", &config.backend.sign_in_path),
        ("backend.protected_prefix", &config.backend.protected_prefix),
        ("gatekeeper.login_path", &config.gatekeeper.login_path),
    ] {
        if !path.starts_with('/') {
            errors.push(ValidationError {
                field,
                message: format!("'{path}' must start with '/'"),
            });
        }
    }

    if config.timeouts.relay_ms == 0 {
        errors.push(ValidationError {
            field: "timeouts.relay_ms",
            message: "must be greater than zero".to_string(),
        });
    }
    if config.session.max_age_secs == 0 {
        errors.push(ValidationError {
            field: "session.max_age_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
