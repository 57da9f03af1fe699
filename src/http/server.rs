//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all gateway routes
//! - Wire up middleware (gatekeeper, tracing, limits, request ID, timeout)
//! - Construct the backend client and inject it into handlers
//! - Bind the server to a listener and serve with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{any, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::gatekeeper::gatekeeper_middleware;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::relay::forward::BackendClient;
use crate::relay::{gateway, login, onboarding};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub config: Arc<GatewayConfig>,
}

/// HTTP server for the authentication gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// The backend base address is injected here, once; handlers never read
    /// process-wide state at call time.
    pub fn new(config: GatewayConfig) -> Self {
        let backend = Arc::new(BackendClient::new(&config.backend));
        let state = AppState {
            backend,
            config: Arc::new(config.clone()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        // `/api/auth` is registered with `any()` so the handler owns the 405
        // response shape for disallowed methods.
        Router::new()
            .route("/api/auth", any(gateway::gateway_handler))
            .route("/api/auth/login", post(login::login_handler))
            .route("/api/auth/logout", post(login::logout_handler))
            .route("/api/relay/onboarding/start", post(onboarding::start))
            .route("/api/relay/onboarding/pebble", post(onboarding::pebble))
            .route("/api/relay/onboarding/reply", post(onboarding::reply))
            .route("/api/relay/onboarding/finish", post(onboarding::finish))
            .layer(axum::middleware::from_fn_with_state(
                state.clone(),
                gatekeeper_middleware,
            ))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// The assembled router; used by tests to drive the gateway in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "auth gateway starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("auth gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        return;
    }
    tracing::info!("shutdown signal received");
}
