//! Chat-completion event stream decoding.
//!
//! The upstream frames every event as a `data: <json>` line and ends the stream
//! with `data: [DONE]`. `DeltaDecoder` turns arbitrary byte chunks into ordered
//! text deltas without knowing anything about the transport; `delta_stream`
//! drives it from any byte stream.

use std::collections::VecDeque;
use std::fmt::Display;

use bytes::Bytes;
use futures::{stream, Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::error::IdeaError;

pub const DONE_MARKER: &str = "[DONE]";

/// One decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    /// A non-empty fragment of generated text.
    Text(String),
    /// The end-of-stream marker.
    Done,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

impl StreamChunk {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.delta)
            .and_then(|d| d.content)
            .filter(|t| !t.is_empty())
    }
}

/// Incremental line-oriented decoder.
///
/// Lines are only decoded once their terminating `\n` has arrived, so an event
/// (or a multi-byte character) split across chunks is reassembled first.
#[derive(Debug, Default)]
pub struct DeltaDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl DeltaDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `[DONE]` has been seen. Later input is ignored.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk and collect every event completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<DeltaEvent> {
        if self.done {
            return Vec::new();
        }
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = self.decode_line(&line) {
                events.push(event);
                if self.done {
                    self.buffer.clear();
                    break;
                }
            }
        }
        events
    }

    /// Flush a trailing line that never got its newline.
    pub fn finish(&mut self) -> Vec<DeltaEvent> {
        if self.done || self.buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.buffer);
        self.decode_line(&line).into_iter().collect()
    }

    fn decode_line(&mut self, raw: &[u8]) -> Option<DeltaEvent> {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() || line.starts_with(':') {
            return None;
        }

        let data = line.strip_prefix("data:")?;
        let data = data.strip_prefix(' ').unwrap_or(data);

        if data.trim() == DONE_MARKER {
            self.done = true;
            return Some(DeltaEvent::Done);
        }

        match serde_json::from_str::<StreamChunk>(data) {
            Ok(chunk) => chunk.into_text().map(DeltaEvent::Text),
            Err(e) => {
                debug!(error = %e, line = %data, "Skipping malformed stream event");
                None
            }
        }
    }
}

struct DecodeState<S> {
    bytes: S,
    decoder: DeltaDecoder,
    pending: VecDeque<DeltaEvent>,
    finished: bool,
}

/// Decode a byte stream lazily into delta events.
///
/// The stream ends after `Done`, or when the bytes run out. A transport error
/// is yielded once and ends the stream.
pub fn delta_stream<S, E>(bytes: S) -> impl Stream<Item = Result<DeltaEvent, IdeaError>> + Send
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        bytes: Box::pin(bytes),
        decoder: DeltaDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((Ok(event), st));
            }
            if st.finished || st.decoder.is_done() {
                return None;
            }
            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = st.decoder.push(&chunk);
                    st.pending.extend(events);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(IdeaError::Transport(e.to_string())), st));
                }
                None => {
                    st.finished = true;
                    let events = st.decoder.finish();
                    st.pending.extend(events);
                }
            }
        }
    })
}
