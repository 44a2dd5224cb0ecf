//! Upstream chat-completion providers for the IdeaForge relay.

pub mod ai_gateway;
pub mod mock;

pub use ai_gateway::{AiGatewayProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use mock::{delta_frame, MockProvider, DONE_FRAME};
