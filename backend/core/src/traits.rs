use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::IdeaError;

/// Raw upstream response body, chunked as it arrives.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, IdeaError>> + Send>>;

/// Trait for upstream chat-completion providers used by the relay.
///
/// Given a system + user conversation, a provider returns the streamed body
/// untouched, or the typed error for a failed call.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "ai-gateway", "mock").
    fn name(&self) -> &str;

    /// Open a streaming completion and return its body.
    async fn stream_chat(&self, request: &ChatRequest) -> Result<ByteStream, IdeaError>;
}

/// Chat-completion request body sent upstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
