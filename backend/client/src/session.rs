//! Presentation state for one user: the form fields, the text being streamed
//! and the last few finished generations.

use ideaforge_core::{Category, GenerationRequest, HistoryEntry, HistoryRing, Mode};

use crate::consumer::{DeltaHandler, IdeaStreamClient};

/// Form state plus a bounded history of finished generations.
///
/// `generate` borrows the session mutably, so only one generation can be in
/// flight per session.
pub struct IdeaSession {
    client: IdeaStreamClient,
    pub topic: String,
    pub mode: Mode,
    pub category: Option<Category>,
    result: String,
    result_mode: Mode,
    history: HistoryRing<HistoryEntry>,
}

struct Accumulator<'a, F> {
    text: &'a mut String,
    forward: F,
    outcome: Option<Result<(), String>>,
}

impl<F: FnMut(&str)> DeltaHandler for Accumulator<'_, F> {
    fn on_delta(&mut self, text: &str) {
        self.text.push_str(text);
        (self.forward)(text);
    }

    fn on_done(&mut self) {
        self.outcome = Some(Ok(()));
    }

    fn on_error(&mut self, message: String) {
        self.outcome = Some(Err(message));
    }
}

impl IdeaSession {
    pub fn new(client: IdeaStreamClient) -> Self {
        Self {
            client,
            topic: String::new(),
            mode: Mode::default(),
            category: None,
            result: String::new(),
            result_mode: Mode::default(),
            history: HistoryRing::new(),
        }
    }

    /// The request the current form would send.
    pub fn request(&self) -> GenerationRequest {
        GenerationRequest {
            mode: self.mode,
            topic: Some(self.topic.clone()),
            category: self.category,
        }
        .normalized()
    }

    /// Whether the generate action is currently allowed.
    pub fn can_generate(&self) -> bool {
        self.request().validate().is_ok()
    }

    /// Stream a new result, forwarding each delta to `on_delta` as it lands.
    ///
    /// Returns the full text, or the error message. A finished, non-empty
    /// result is pushed onto the history.
    pub async fn generate<F: FnMut(&str)>(&mut self, on_delta: F) -> Result<&str, String> {
        let request = self.request();
        request.validate().map_err(|e| e.to_string())?;

        self.result.clear();
        self.result_mode = request.mode;

        let outcome = {
            let mut accumulator = Accumulator {
                text: &mut self.result,
                forward: on_delta,
                outcome: None,
            };
            self.client.stream(&request, &mut accumulator).await;
            accumulator.outcome
        };

        match outcome {
            Some(Ok(())) => {
                if !self.result.is_empty() {
                    self.history
                        .push(HistoryEntry::from_request(&request, self.result.clone()));
                }
                Ok(&self.result)
            }
            Some(Err(message)) => Err(message),
            None => Err(ideaforge_core::error::FALLBACK_CLIENT_MESSAGE.to_string()),
        }
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    /// Heading for the current result.
    pub fn result_title(&self) -> &'static str {
        self.result_mode.result_title()
    }

    pub fn history(&self) -> &HistoryRing<HistoryEntry> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Load a history entry (0 = newest) back into the form and result.
    pub fn restore(&mut self, index: usize) -> Option<&HistoryEntry> {
        let entry = self.history.get(index)?.clone();
        self.topic = match entry.mode {
            Mode::Random => String::new(),
            _ => entry.topic.clone(),
        };
        self.mode = entry.mode;
        self.category = entry.category;
        self.result = entry.result.clone();
        self.result_mode = entry.mode;
        self.history.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ideaforge_core::error::RATE_LIMIT_MESSAGE;
    use ideaforge_core::HISTORY_CAPACITY;
    use ideaforge_gateway::{build_router, RelayState, FUNCTION_PATH};
    use ideaforge_providers::MockProvider;
    use tokio::net::TcpListener;

    async fn session_with(provider: MockProvider) -> (IdeaSession, Arc<MockProvider>) {
        let provider = Arc::new(provider);
        let app = build_router(RelayState::new(provider.clone(), "test-model"));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = IdeaStreamClient::new(format!("http://{addr}{FUNCTION_PATH}"));
        (IdeaSession::new(client), provider)
    }

    #[tokio::test]
    async fn test_history_keeps_three_most_recent() {
        let (mut session, _) =
            session_with(MockProvider::new("mock").with_deltas(&["idea ", "text"])).await;

        for (n, topic) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            session.topic = topic.to_string();
            let mut streamed = String::new();
            let result = session.generate(|d| streamed.push_str(d)).await.unwrap();
            assert_eq!(result, "idea text");
            assert_eq!(streamed, "idea text");
            assert_eq!(session.history().len(), (n + 1).min(HISTORY_CAPACITY));
        }

        let topics: Vec<&str> = session.history().iter().map(|e| e.topic.as_str()).collect();
        assert_eq!(topics, vec!["e", "d", "c"]);

        session.clear_history();
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_not_recorded() {
        let (mut session, provider) = session_with(MockProvider::new("mock").with_deltas(&[])).await;
        session.topic = "пусто".into();

        let result = session.generate(|_| {}).await.unwrap();
        assert_eq!(result, "");
        assert!(session.history().is_empty());
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_error_not_recorded() {
        let (mut session, _) = session_with(MockProvider::new("mock").with_status(429, "")).await;
        session.topic = "x".into();

        let err = session.generate(|_| {}).await.unwrap_err();
        assert_eq!(err, RATE_LIMIT_MESSAGE);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn test_blank_topic_blocks_generate() {
        let (mut session, provider) = session_with(MockProvider::new("mock").with_deltas(&["x"])).await;
        session.topic = "  ".into();
        assert!(!session.can_generate());
        assert!(session.generate(|_| {}).await.is_err());
        assert_eq!(provider.calls(), 0);

        session.mode = Mode::Random;
        assert!(session.can_generate());
    }

    #[tokio::test]
    async fn test_random_category_entry_and_restore() {
        let (mut session, provider) =
            session_with(MockProvider::new("mock").with_deltas(&["**Идея:** ..."])).await;
        session.mode = Mode::Random;
        session.category = Some(Category::Business);
        session.generate(|_| {}).await.unwrap();

        let chat = provider.last_request().unwrap();
        assert!(chat.messages[0].content.contains("«бизнес»"));

        session.mode = Mode::List;
        session.topic = "кофе".into();
        session.generate(|_| {}).await.unwrap();
        assert_eq!(session.result_title(), "Ваши идеи");

        let restored = session.restore(1).unwrap().clone();
        assert_eq!(restored.topic, "Случайная идея: бизнес");
        assert_eq!(session.mode, Mode::Random);
        assert_eq!(session.category, Some(Category::Business));
        assert_eq!(session.result(), "**Идея:** ...");
        assert_eq!(session.result_title(), "Ваша идея");
        assert!(session.restore(5).is_none());
    }
}
