//! CLI Generate Command
//!
//! One-shot generation: streams the relay's text to stdout as it arrives.

use anyhow::{bail, Result};

use ideaforge_client::{Callbacks, IdeaStreamClient};
use ideaforge_core::{Category, GenerationRequest, Mode};

use crate::terminal_output::{heading, stream_write};

pub async fn run(
    client: &IdeaStreamClient,
    mode: Mode,
    topic: Option<String>,
    category: Option<Category>,
) -> Result<()> {
    let request = GenerationRequest {
        mode,
        topic,
        category,
    }
    .normalized();
    request.validate()?;

    println!("{}\n", heading(mode.result_title()));

    let mut failure: Option<String> = None;
    let mut handler = Callbacks::new(
        |delta: &str| {
            if let Err(e) = stream_write(&mut std::io::stdout(), delta) {
                tracing::debug!(error = %e, "stdout write failed");
            }
        },
        || {},
        |message: String| failure = Some(message),
    );
    client.stream(&request, &mut handler).await;
    drop(handler);
    println!();

    match failure {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}
