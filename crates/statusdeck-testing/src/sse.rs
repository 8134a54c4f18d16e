//! Builder for `text/event-stream` response bodies.
//!
//! Produces the wire framing the backend emits: one `id:` line, one
//! `event:` line, one `data:` line per event, frames separated by a blank
//! line, comment lines for heartbeats.

use serde_json::Value;
use statusdeck_core::StreamEventKind;

/// Accumulates event-stream frames into a single response body.
#[derive(Debug, Default)]
pub struct SseBody {
    buf: String,
}

impl SseBody {
    /// Starts an empty body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a well-formed event frame.
    #[must_use]
    pub fn event(mut self, id: u64, kind: StreamEventKind, data: &Value) -> Self {
        self.buf.push_str(&format!("id: {id}\nevent: {kind}\ndata: {data}\n\n"));
        self
    }

    /// Appends a frame with an arbitrary event name and raw data text, for
    /// exercising unknown names and malformed payloads.
    #[must_use]
    pub fn named_event(mut self, name: &str, data: &str) -> Self {
        self.buf.push_str(&format!("event: {name}\ndata: {data}\n\n"));
        self
    }

    /// Appends a comment frame, as sent for keep-alive heartbeats.
    #[must_use]
    pub fn comment(mut self, text: &str) -> Self {
        self.buf.push_str(&format!(": {text}\n\n"));
        self
    }

    /// Appends raw bytes verbatim.
    #[must_use]
    pub fn raw(mut self, chunk: &str) -> Self {
        self.buf.push_str(chunk);
        self
    }

    /// Finishes the body.
    pub fn build(self) -> String {
        self.buf
    }
}
