//! Authentication gateway (BFF relay).
//!
//! Sits between an untrusted browser and a protected backend API. The user's
//! credential lives exclusively in a server-controlled, httpOnly cookie; on
//! every inbound request the gateway decides whether the caller is
//! authenticated, whether the requested backend path is one it may reach,
//! and how to translate the session cookie into the backend's bearer header
//! while forwarding method, body, and a constrained header set.
//!
//! # Architecture Overview
//!
//! ```text
//!              ┌──────────────────────────────────────────────────────┐
//!              │                    AUTH GATEWAY                      │
//!   Browser    │  ┌────────────┐   ┌──────────────────────────────┐   │
//!   ──────────►│  │ gatekeeper │──►│ relay routes                 │   │
//!   (cookie)   │  │ (redirect  │   │  /api/auth       (generic)   │   │
//!              │  │  or pass)  │   │  /api/auth/login (exchange)  │   │
//!              │  └────────────┘   │  /api/relay/...  (scoped)    │   │
//!              │                   └──────────────┬───────────────┘   │
//!              │                                  ▼                   │
//!              │                   ┌──────────────────────────────┐   │
//!   Browser    │                   │ forward.rs                   │   │    Backend
//!   ◄──────────│◄──────────────────│ cookie → Bearer, allowlist,  │──►│──► API
//!   (payload   │                   │ timeout policy, passthrough  │   │
//!    untouched)│                   └──────────────────────────────┘   │
//!              │                                                      │
//!              │  cross-cutting: config · session · token ·           │
//!              │                 observability · error taxonomy       │
//!              └──────────────────────────────────────────────────────┘
//! ```
//!
//! # Security Property
//!
//! The gateway checks token *liveness* (expiry) at the edge but never
//! *authenticity*: signatures are validated by the backend on every
//! forwarded call, so no signing secret is ever held here.

pub mod config;
pub mod error;
pub mod gatekeeper;
pub mod http;
pub mod observability;
pub mod relay;
pub mod session;
pub mod token;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
