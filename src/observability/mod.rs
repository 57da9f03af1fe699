//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, tracing)
//!     → metrics.rs (counters, histograms, Prometheus exposition)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The request id flows through logs and onto backend calls
//! - Metric updates are cheap (atomic increments)
//! - The metrics endpoint is optional and off by default

pub mod logging;
pub mod metrics;
