//! Relay Health API
//!
//! Reports whether the relay is up and whether its upstream is usable.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::RelayState;

#[derive(Debug, Serialize)]
pub struct UpstreamStatus {
    pub configured: bool,
    pub provider: Option<String>,
    pub model: String,
    /// Configuration problem, when the upstream cannot be used.
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub upstream: UpstreamStatus,
    pub timestamp: DateTime<Utc>,
}

/// Handler for `GET /api/health`
pub async fn get_health(State(state): State<RelayState>) -> Json<HealthReport> {
    let upstream = match state.provider() {
        Ok(provider) => UpstreamStatus {
            configured: true,
            provider: Some(provider.name().to_string()),
            model: state.model().to_string(),
            error: None,
        },
        Err(e) => UpstreamStatus {
            configured: false,
            provider: None,
            model: state.model().to_string(),
            error: Some(e.to_string()),
        },
    };

    // The relay process is healthy even when unconfigured; callers read
    // `upstream.configured` for the rest.
    Json(HealthReport {
        status: if upstream.configured { "ok" } else { "degraded" }.into(),
        service: "ideaforge".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.uptime_seconds(),
        upstream,
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use ideaforge_providers::MockProvider;
    use tower::ServiceExt;

    use crate::server::build_router;

    async fn health_of(state: RelayState) -> serde_json::Value {
        let response = build_router(state)
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_success());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_provider() {
        let state = RelayState::new(Arc::new(MockProvider::new("mock")), "m1");
        let report = health_of(state).await;
        assert_eq!(report["status"], "ok");
        assert_eq!(report["upstream"]["provider"], "mock");
        assert_eq!(report["upstream"]["model"], "m1");
    }

    #[tokio::test]
    async fn test_health_reports_missing_credential() {
        let report = health_of(RelayState::unconfigured("AI_GATEWAY_API_KEY", "m1")).await;
        assert_eq!(report["status"], "degraded");
        assert_eq!(report["upstream"]["configured"], false);
        assert_eq!(
            report["upstream"]["error"],
            "AI_GATEWAY_API_KEY is not configured"
        );
    }
}
