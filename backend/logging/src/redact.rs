//! Log Redaction
//!
//! Scrubs credentials from upstream payloads before they reach the log, and
//! caps their length.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static API_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(sk|pk|lov)[-_][a-zA-Z0-9\-_]{16,}").unwrap());
static KEY_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)"(api_?key|authorization|token|secret)"\s*:\s*"[^"]*""#).unwrap()
});

/// Longest upstream body written to a single log record.
pub const MAX_LOGGED_BODY: usize = 2048;

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_KEY]");
    KEY_FIELD_RE
        .replace_all(&redacted, "\"$1\":\"[REDACTED]\"")
        .into_owned()
}

/// Redact and cut an upstream body down to `MAX_LOGGED_BODY` bytes,
/// respecting char boundaries.
pub fn redact_for_log(body: &str) -> String {
    let mut clean = redact_sensitive_data(body);
    if clean.len() > MAX_LOGGED_BODY {
        let mut cut = MAX_LOGGED_BODY;
        while !clean.is_char_boundary(cut) {
            cut -= 1;
        }
        clean.truncate(cut);
        clean.push_str("…[truncated]");
    }
    clean
}
