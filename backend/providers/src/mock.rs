use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;

use ideaforge_core::{ByteStream, ChatProvider, ChatRequest, IdeaError};

/// Format one chat-completion delta as an upstream event line.
pub fn delta_frame(text: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({ "choices": [{ "index": 0, "delta": { "content": text } }] })
    )
}

pub const DONE_FRAME: &str = "data: [DONE]\n\n";

enum Script {
    Chunks(Vec<Bytes>),
    Status { status: u16, body: String },
}

/// A mock provider that replays canned chunks or fails with a canned status.
pub struct MockProvider {
    name: String,
    script: Script,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: Script::Chunks(Vec::new()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Replay these raw chunks exactly as given.
    pub fn with_chunks<I, C>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.script = Script::Chunks(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// One well-formed event per delta, then the end marker.
    pub fn with_deltas(self, deltas: &[&str]) -> Self {
        let mut chunks: Vec<String> = deltas.iter().map(|d| delta_frame(d)).collect();
        chunks.push(DONE_FRAME.to_string());
        self.with_chunks(chunks)
    }

    pub fn with_status(mut self, status: u16, body: impl Into<String>) -> Self {
        self.script = Script::Status {
            status,
            body: body.into(),
        };
        self
    }

    /// How many times `stream_chat` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().ok().and_then(|r| r.clone())
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stream_chat(&self, request: &ChatRequest) -> Result<ByteStream, IdeaError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.script {
            Script::Chunks(chunks) => {
                let items: Vec<Result<Bytes, IdeaError>> =
                    chunks.iter().cloned().map(Ok).collect();
                Ok(Box::pin(stream::iter(items)))
            }
            Script::Status { status, body } => Err(IdeaError::from_upstream(*status, body.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use ideaforge_core::{delta_stream, DeltaEvent};

    fn chat() -> ChatRequest {
        ChatRequest {
            model: "mock".into(),
            messages: Vec::new(),
            stream: true,
        }
    }

    #[tokio::test]
    async fn test_mock_replays_deltas() {
        let provider = MockProvider::new("mock").with_deltas(&["a", "b"]);
        let bytes = provider.stream_chat(&chat()).await.unwrap();
        let events: Vec<DeltaEvent> = delta_stream(bytes)
            .map(|e| e.unwrap())
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                DeltaEvent::Text("a".into()),
                DeltaEvent::Text("b".into()),
                DeltaEvent::Done
            ]
        );
        assert_eq!(provider.calls(), 1);
        assert_eq!(provider.last_request(), Some(chat()));
    }

    #[tokio::test]
    async fn test_mock_scripted_status() {
        let provider = MockProvider::new("mock").with_status(429, "");
        assert!(matches!(
            provider.stream_chat(&chat()).await,
            Err(IdeaError::RateLimited)
        ));
        assert_eq!(provider.calls(), 1);
    }
}
