//! Stream consumer for the relay endpoint.
//!
//! Posts a generation request, decodes the event stream and reports each text
//! delta, then exactly one of `on_done` / `on_error`.

use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

use ideaforge_core::error::FALLBACK_CLIENT_MESSAGE;
use ideaforge_core::{delta_stream, DeltaEvent, GenerationRequest};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/functions/v1/generate-ideas";

/// Receiver of a single generation's events.
pub trait DeltaHandler {
    /// A fragment of text, in arrival order.
    fn on_delta(&mut self, text: &str);
    /// The stream finished. Never follows `on_error`.
    fn on_done(&mut self);
    /// The generation failed. Never follows `on_done`.
    fn on_error(&mut self, message: String);
}

/// `DeltaHandler` built from three closures.
pub struct Callbacks<D, F, E> {
    on_delta: D,
    on_done: F,
    on_error: E,
}

impl<D, F, E> Callbacks<D, F, E>
where
    D: FnMut(&str),
    F: FnMut(),
    E: FnMut(String),
{
    pub fn new(on_delta: D, on_done: F, on_error: E) -> Self {
        Self {
            on_delta,
            on_done,
            on_error,
        }
    }
}

impl<D, F, E> DeltaHandler for Callbacks<D, F, E>
where
    D: FnMut(&str),
    F: FnMut(),
    E: FnMut(String),
{
    fn on_delta(&mut self, text: &str) {
        (self.on_delta)(text)
    }

    fn on_done(&mut self) {
        (self.on_done)()
    }

    fn on_error(&mut self, message: String) {
        (self.on_error)(message)
    }
}

/// HTTP client for the relay.
#[derive(Clone)]
pub struct IdeaStreamClient {
    client: Client,
    endpoint: String,
    anon_key: Option<String>,
}

impl IdeaStreamClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: build_client(Duration::from_secs(10), Duration::from_secs(300)),
            endpoint: endpoint.into(),
            anon_key: None,
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, total: Duration) -> Self {
        self.client = build_client(connect, total);
        self
    }

    /// Publishable key for hosted function runtimes, sent as `apikey` and as
    /// a bearer token.
    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = Some(key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one generation. Never fails: every outcome reaches `handler`.
    pub async fn stream<H: DeltaHandler>(&self, request: &GenerationRequest, handler: &mut H) {
        match self.run(request, handler).await {
            Ok(()) => handler.on_done(),
            Err(message) => handler.on_error(message),
        }
    }

    async fn run<H: DeltaHandler>(
        &self,
        request: &GenerationRequest,
        handler: &mut H,
    ) -> Result<(), String> {
        request.validate().map_err(|e| e.to_string())?;

        let mut builder = self.client.post(&self.endpoint).json(&request.normalized());
        if let Some(key) = &self.anon_key {
            builder = builder
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, endpoint = %self.endpoint, "Relay request failed");
            format!("{FALLBACK_CLIENT_MESSAGE}: {e}")
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Relay returned an error");
            return Err(extract_error_message(&body));
        }

        let events = delta_stream(response.bytes_stream());
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                Ok(DeltaEvent::Text(text)) => handler.on_delta(&text),
                Ok(DeltaEvent::Done) => break,
                Err(e) => {
                    warn!(error = %e, "Stream interrupted");
                    return Err(format!("{FALLBACK_CLIENT_MESSAGE}: {e}"));
                }
            }
        }
        Ok(())
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

/// Pull the message out of an `{ "error": ... }` body, falling back to a
/// generic message.
pub fn extract_error_message(body: &str) -> String {
    let value: Option<serde_json::Value> = serde_json::from_str(body).ok();
    value
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(|e| e.as_str().or_else(|| e.get("message").and_then(|m| m.as_str())))
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_CLIENT_MESSAGE.to_string())
}
