//! Relay HTTP server.
//!
//! Routing, shared state and start-up.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument, warn};

use ideaforge_core::{ChatProvider, IdeaError};

use crate::cors;
use crate::health_api;
use crate::relay;

/// Path the hosted function runtime exposes the relay under.
pub const FUNCTION_PATH: &str = "/functions/v1/generate-ideas";
/// Short alias for self-hosted deployments.
pub const SHORT_PATH: &str = "/generate-ideas";

#[derive(Clone)]
enum Upstream {
    Ready(Arc<dyn ChatProvider>),
    Unconfigured(&'static str),
}

/// State shared by every relay request. Holds no per-request data.
#[derive(Clone)]
pub struct RelayState {
    upstream: Upstream,
    model: String,
    started_at: Instant,
}

impl RelayState {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            upstream: Upstream::Ready(provider),
            model: model.into(),
            started_at: Instant::now(),
        }
    }

    /// State for a relay whose upstream credential is missing. Every
    /// generation request fails with a configuration error naming `variable`.
    pub fn unconfigured(variable: &'static str, model: impl Into<String>) -> Self {
        warn!(variable, "Upstream credential missing, generation requests will fail");
        Self {
            upstream: Upstream::Unconfigured(variable),
            model: model.into(),
            started_at: Instant::now(),
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn ChatProvider>, IdeaError> {
        match &self.upstream {
            Upstream::Ready(provider) => Ok(provider),
            Upstream::Unconfigured(variable) => Err(IdeaError::MissingCredential(*variable)),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Build the router with the relay routes, CORS and request tracing.
pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route(FUNCTION_PATH, post(relay::generate_ideas))
        .route(SHORT_PATH, post(relay::generate_ideas))
        .route("/api/health", get(health_api::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors::cors_layer())
        .layer(cors::allow_headers_layer())
}

/// Bind and serve until Ctrl-C.
#[instrument(skip(state))]
pub async fn start_server(addr: SocketAddr, state: RelayState) -> Result<()> {
    let app = build_router(state);

    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "Relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
