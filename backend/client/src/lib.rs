//! Client side of IdeaForge: the relay stream consumer and the session state
//! a front end renders.

pub mod consumer;
pub mod session;

pub use consumer::{extract_error_message, Callbacks, DeltaHandler, IdeaStreamClient, DEFAULT_ENDPOINT};
pub use session::IdeaSession;
