//! CLI Status Command
//!
//! Queries a running relay's health endpoint and reports its upstream.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;

use crate::terminal_output::{note_error, note_success, note_warn, render_table, Column};

pub async fn run(base_url: &str) -> Result<()> {
    let url = format!("{}/api/health", base_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let body: Value = match client.get(&url).send().await {
        Ok(resp) => resp.json().await?,
        Err(e) => {
            note_error(&format!("IdeaForge relay is not reachable at {base_url}"));
            tracing::debug!(error = %e, url = %url, "health request failed");
            return Ok(());
        }
    };

    print!("{}", report_table(&body));
    match body["status"].as_str() {
        Some("ok") => note_success("Relay is up and its upstream is configured"),
        _ => note_warn(
            body["upstream"]["error"]
                .as_str()
                .unwrap_or("Relay is up but its upstream is not configured"),
        ),
    }
    Ok(())
}

fn report_table(body: &Value) -> String {
    let field = |v: &Value| match v {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let rows = [
        ("status", &body["status"]),
        ("version", &body["version"]),
        ("uptime (s)", &body["uptime_seconds"]),
        ("provider", &body["upstream"]["provider"]),
        ("model", &body["upstream"]["model"]),
    ]
    .into_iter()
    .map(|(name, value)| vec![name.to_string(), field(value)])
    .collect::<Vec<_>>();
    render_table(&[Column::left("Field"), Column::left("Value").max(48)], &rows)
}
