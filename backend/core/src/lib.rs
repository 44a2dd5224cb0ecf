pub mod error;
pub mod history;
pub mod prompts;
pub mod sse;
pub mod traits;
pub mod types;

pub use error::IdeaError;
pub use history::{HistoryRing, HISTORY_CAPACITY};
pub use prompts::build_chat;
pub use sse::{delta_stream, DeltaDecoder, DeltaEvent};
pub use traits::{ByteStream, ChatMessage, ChatProvider, ChatRequest};
pub use types::{Category, GenerationRequest, HistoryEntry, Mode};
