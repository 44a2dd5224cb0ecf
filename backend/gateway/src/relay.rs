//! Idea-generation relay.
//!
//! Reads `{ topic?, mode, category? }`, picks the prompt for the mode, opens a
//! streaming completion upstream and hands the body back byte for byte.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};

use ideaforge_core::{build_chat, GenerationRequest, IdeaError};
use ideaforge_logging::redact_for_log;

use crate::server::RelayState;

/// Handler for `POST /functions/v1/generate-ideas`.
///
/// The body is parsed by hand so a malformed request becomes the same
/// `500 { error }` as any other setup failure.
pub async fn generate_ideas(State(state): State<RelayState>, body: Bytes) -> Response {
    match relay(&state, &body).await {
        Ok(response) => response,
        Err(e) => error_response(&e),
    }
}

async fn relay(state: &RelayState, body: &[u8]) -> Result<Response, IdeaError> {
    let provider = state.provider()?;

    let request: GenerationRequest = serde_json::from_slice(body)
        .map_err(|e| IdeaError::InvalidRequest(e.to_string()))?;
    request.validate()?;

    info!(
        mode = %request.mode,
        category = ?request.category,
        provider = provider.name(),
        "Relaying generation request"
    );

    let chat = build_chat(&request, state.model());
    let stream = provider.stream_chat(&chat).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(stream))
        .map_err(|e| IdeaError::Other(e.into()))
}

/// Log the failure and turn it into `{ error }` with the matching status.
pub fn error_response(err: &IdeaError) -> Response {
    match err {
        IdeaError::UpstreamStatus { status, body } => {
            error!(status, body = %redact_for_log(body), "AI gateway error");
        }
        IdeaError::RateLimited | IdeaError::PaymentRequired => {
            warn!(status = err.status_code(), "AI gateway refused request");
        }
        other => {
            error!(error = %other, "generate-ideas error");
        }
    }

    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "error": err.client_message() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{http::Request, Router};
    use ideaforge_core::error::{CREDITS_MESSAGE, RATE_LIMIT_MESSAGE, SERVICE_ERROR_MESSAGE};
    use ideaforge_core::prompts::{system_prompt, RANDOM_USER_MESSAGE};
    use ideaforge_core::Mode;
    use ideaforge_providers::{delta_frame, MockProvider, DONE_FRAME};
    use tower::ServiceExt;

    use crate::server::{build_router, FUNCTION_PATH, SHORT_PATH};

    fn app_with(provider: Arc<MockProvider>) -> Router {
        build_router(RelayState::new(provider, "test-model"))
    }

    fn post_json(path: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn error_of(response: Response) -> String {
        let value: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        value["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_streams_upstream_body_unchanged() {
        let provider = Arc::new(MockProvider::new("mock").with_deltas(&["1. ", " Idea A\n", "2. Idea B"]));
        let response = app_with(provider.clone())
            .oneshot(post_json(FUNCTION_PATH, r#"{"topic":"бизнес идеи","mode":"list"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/event-stream");
        assert_eq!(response.headers()["access-control-allow-origin"], "*");

        let expected = format!(
            "{}{}{}{}",
            delta_frame("1. "),
            delta_frame(" Idea A\n"),
            delta_frame("2. Idea B"),
            DONE_FRAME
        );
        assert_eq!(body_string(response).await, expected);

        let chat = provider.last_request().unwrap();
        assert_eq!(chat.model, "test-model");
        assert!(chat.stream);
        assert_eq!(chat.messages[0].content, system_prompt(Mode::List, None));
        assert_eq!(chat.messages[1].content, "Тема: бизнес идеи");
    }

    #[tokio::test]
    async fn test_random_without_category_uses_fixed_message() {
        let provider = Arc::new(MockProvider::new("mock").with_deltas(&["x"]));
        let response = app_with(provider.clone())
            .oneshot(post_json(SHORT_PATH, r#"{"mode":"random"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let chat = provider.last_request().unwrap();
        assert_eq!(chat.messages[0].content, system_prompt(Mode::Random, None));
        assert_eq!(chat.messages[1].content, RANDOM_USER_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_upstream_call() {
        let app = build_router(RelayState::unconfigured("AI_GATEWAY_API_KEY", "test-model"));
        let response = app
            .oneshot(post_json(FUNCTION_PATH, r#"{"topic":"x","mode":"list"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(error_of(response).await, "AI_GATEWAY_API_KEY is not configured");
    }

    #[tokio::test]
    async fn test_upstream_status_mapping() {
        let cases = [
            (429, StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE),
            (402, StatusCode::PAYMENT_REQUIRED, CREDITS_MESSAGE),
            (503, StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_MESSAGE),
        ];
        for (upstream, expected_status, expected_message) in cases {
            let provider =
                Arc::new(MockProvider::new("mock").with_status(upstream, "internal detail sk-leak"));
            let response = app_with(provider)
                .oneshot(post_json(FUNCTION_PATH, r#"{"topic":"x","mode":"single"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), expected_status);
            assert_eq!(response.headers()["content-type"], "application/json");
            let message = error_of(response).await;
            assert_eq!(message, expected_message);
            assert!(!message.contains("internal detail"));
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_500_with_message() {
        let provider = Arc::new(MockProvider::new("mock"));
        let response = app_with(provider.clone())
            .oneshot(post_json(FUNCTION_PATH, "{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error_of(response).await.starts_with("invalid request:"));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_topic_rejected_before_upstream() {
        let provider = Arc::new(MockProvider::new("mock"));
        let response = app_with(provider.clone())
            .oneshot(post_json(FUNCTION_PATH, r#"{"topic":"   ","mode":"list"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_of(response).await, IdeaError::EmptyTopic.to_string());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let provider = Arc::new(MockProvider::new("mock"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri(FUNCTION_PATH)
            .header("origin", "https://example.app")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type, x-client-info")
            .body(Body::empty())
            .unwrap();
        let response = app_with(provider.clone()).oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let allowed = headers["access-control-allow-headers"].to_str().unwrap();
        assert!(allowed.contains("x-client-info"));
        assert!(allowed.contains("apikey"));
        assert!(body_string(response).await.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_bare_options_gets_cors_headers() {
        let provider = Arc::new(MockProvider::new("mock"));
        let request = Request::builder()
            .method("OPTIONS")
            .uri(SHORT_PATH)
            .body(Body::empty())
            .unwrap();
        let response = app_with(provider.clone()).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert!(response.headers().contains_key("access-control-allow-headers"));
        assert!(body_string(response).await.is_empty());
        assert_eq!(provider.calls(), 0);
    }
}
