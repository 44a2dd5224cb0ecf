use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use ideaforge_core::{ByteStream, ChatProvider, ChatRequest, IdeaError};

pub const DEFAULT_BASE_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// OpenAI-compatible chat-completion gateway, called with `stream: true`.
pub struct AiGatewayProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AiGatewayProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: build_client(DEFAULT_CONNECT_TIMEOUT, DEFAULT_STREAM_TIMEOUT),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// `total` bounds the whole call, body included, so it also caps how long
    /// a stream may run.
    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.client = build_client(connect, total);
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn build_client(connect: Duration, total: Duration) -> Client {
    Client::builder()
        .connect_timeout(connect)
        .timeout(total)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            Client::new()
        })
}

#[async_trait]
impl ChatProvider for AiGatewayProvider {
    fn name(&self) -> &str {
        "ai-gateway"
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<ByteStream, IdeaError> {
        let start = Instant::now();

        debug!(model = %request.model, "Opening stream to AI gateway");

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| IdeaError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IdeaError::from_upstream(status.as_u16(), body));
        }

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            "AI gateway stream opened"
        );

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| IdeaError::Transport(e.to_string())));
        Ok(Box::pin(stream))
    }
}
