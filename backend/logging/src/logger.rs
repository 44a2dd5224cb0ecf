//! Structured Logger
//!
//! Wraps `tracing` with a console layer (plain or JSON) and an optional
//! daily-rolling NDJSON file layer.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logger settings, usually filled from the process configuration.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Fallback filter when `RUST_LOG` is unset.
    pub level: String,
    /// JSON lines on the console instead of human-readable output.
    pub json: bool,
    /// Directory for `ideaforge.log.YYYY-MM-DD`, if file logging is wanted.
    pub log_dir: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

/// Initialize the global structured logger. Calling it twice is a no-op.
pub fn init_logger(options: &LogOptions) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    let file_layer = options.log_dir.as_ref().map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "ideaforge.log");
        fmt::layer()
            .json()
            .with_writer(appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
