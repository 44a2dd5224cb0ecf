//! IdeaForge relay server
//!
//! Forwards idea-generation requests to a streaming chat-completion upstream
//! and pipes the event stream back to browser callers.

pub mod cors;
pub mod health_api;
pub mod relay;
pub mod server;

pub use server::{build_router, start_server, RelayState, FUNCTION_PATH, SHORT_PATH};
