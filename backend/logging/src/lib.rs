//! Structured logging for IdeaForge.
//!
//! Console/file subscriber set-up and redaction of secrets in diagnostic output.

pub mod logger;
pub mod redact;

pub use logger::{init_logger, LogOptions};
pub use redact::{redact_for_log, redact_sensitive_data};
