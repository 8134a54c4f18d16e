//! Live event feed over server-sent events.
//!
//! [`EventChannel::open`] spawns a reader task that connects to the audience
//! feed, parses the `text/event-stream` wire format incrementally, and hands
//! decoded [`StreamEvent`]s to the single consumer over a bounded channel.
//! Delivery preserves wire order. Malformed payloads and unknown event names
//! are logged and dropped; they never tear the channel down.
//!
//! The channel never reconnects on its own. When the connection drops — or
//! the server ends the stream — the reader task exits and the consumer sees
//! `None` from [`EventChannel::next_event`] once buffered events drain. The
//! owner decides whether to open a fresh channel, resuming from
//! [`EventChannel::last_event_id`].

use std::sync::{Arc, Mutex};

use futures::StreamExt;
use reqwest::header::{HeaderName, ACCEPT};
use statusdeck_core::events::{Audience, StreamEvent, StreamEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use crate::request::ApiClient;

const LAST_EVENT_ID_HEADER: HeaderName = HeaderName::from_static("last-event-id");

/// Events buffered between the reader task and a slow consumer.
const EVENT_BUFFER: usize = 64;

/// Options for opening an event channel.
#[derive(Debug, Clone, Default)]
pub struct StreamOptions {
    /// Resume point: the server replays missed history after this event id.
    pub last_event_id: Option<String>,
}

impl StreamOptions {
    /// Options that resume the feed after `last_event_id`.
    pub fn resume_from(last_event_id: impl Into<String>) -> Self {
        Self { last_event_id: Some(last_event_id.into()) }
    }
}

/// A live subscription to one audience feed.
///
/// Single-consumer: whoever holds the channel calls
/// [`next_event`](EventChannel::next_event) and eventually
/// [`close`](EventChannel::close). Closing twice is safe, and dropping the
/// channel closes it.
#[derive(Debug)]
pub struct EventChannel {
    audience: Audience,
    events: mpsc::Receiver<StreamEvent>,
    shutdown: CancellationToken,
    last_event_id: Arc<Mutex<Option<String>>>,
}

impl EventChannel {
    /// Opens the feed for `audience` from the beginning.
    pub fn open(client: &ApiClient, audience: Audience) -> Self {
        Self::open_with(client, audience, StreamOptions::default())
    }

    /// Opens the feed for `audience` with explicit options.
    ///
    /// Returns immediately; the connection is established by a background
    /// task. Connection failures are logged, not returned — the consumer
    /// observes them as an ended stream.
    pub fn open_with(client: &ApiClient, audience: Audience, options: StreamOptions) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let shutdown = CancellationToken::new();
        let last_event_id = Arc::new(Mutex::new(options.last_event_id.clone()));

        let span = info_span!("event_stream", audience = %audience);
        tokio::spawn(
            run_stream(
                client.stream_http().clone(),
                client.config().stream_url(audience),
                options,
                tx,
                shutdown.clone(),
                Arc::clone(&last_event_id),
            )
            .instrument(span),
        );

        Self { audience, events: rx, shutdown, last_event_id }
    }

    /// The audience this channel follows.
    pub fn audience(&self) -> Audience {
        self.audience
    }

    /// Waits for the next event.
    ///
    /// Events arrive in the order the server sent them. Returns `None` once
    /// the channel is closed and every buffered event has been consumed.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// The id of the last event frame received, from the feed's `id:` lines.
    ///
    /// Feed this into [`StreamOptions::resume_from`] when re-opening after a
    /// drop so the server replays what was missed.
    pub fn last_event_id(&self) -> Option<String> {
        let guard = self.last_event_id.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.clone()
    }

    /// Closes the channel and stops the reader task.
    ///
    /// Idempotent. Buffered events remain readable until
    /// [`next_event`](EventChannel::next_event) drains them.
    pub fn close(&mut self) {
        if self.shutdown.is_cancelled() {
            return;
        }
        self.shutdown.cancel();
        self.events.close();
        debug!(audience = %self.audience, "event channel closed");
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Reader task: connect, parse frames, forward decoded events.
async fn run_stream(
    http: reqwest::Client,
    url: String,
    options: StreamOptions,
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
    last_seen: Arc<Mutex<Option<String>>>,
) {
    let mut request = http.get(&url).header(ACCEPT, "text/event-stream");
    if let Some(id) = &options.last_event_id {
        request = request.header(LAST_EVENT_ID_HEADER, id.clone());
    }

    let response = tokio::select! {
        () = cancel.cancelled() => return,
        result = request.send() => result,
    };

    let response = match response {
        Ok(response) if response.status().is_success() => response,
        Ok(response) => {
            warn!(status = response.status().as_u16(), "event stream rejected");
            return;
        },
        Err(error) => {
            warn!(error = %error, "event stream connection failed");
            return;
        },
    };

    debug!("event stream connected");

    let mut byte_stream = response.bytes_stream();
    let mut parser = FrameParser::default();

    loop {
        let chunk = tokio::select! {
            () = cancel.cancelled() => return,
            chunk = byte_stream.next() => chunk,
        };

        let bytes = match chunk {
            Some(Ok(bytes)) => bytes,
            Some(Err(error)) => {
                // No automatic reconnect: surface end-of-stream and let the
                // owner decide when to re-open.
                warn!(error = %error, "event stream transport error");
                return;
            },
            None => {
                debug!("event stream ended");
                return;
            },
        };

        for frame in parser.push(&bytes) {
            if let Some(id) = &frame.id {
                let mut guard =
                    last_seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                *guard = Some(id.clone());
            }

            let Some(event) = decode_event(&frame) else { continue };

            let delivered = tokio::select! {
                () = cancel.cancelled() => return,
                sent = tx.send(event) => sent.is_ok(),
            };
            if !delivered {
                return;
            }
        }
    }
}

/// One wire frame: the fields accumulated up to a blank line.
#[derive(Debug, Default, PartialEq)]
struct Frame {
    id: Option<String>,
    event: Option<String>,
    data: Vec<String>,
}

/// Incremental parser for the `text/event-stream` format.
///
/// Frames can arrive split across arbitrary chunk boundaries; bytes are
/// buffered until a full line is available. Comment lines (the server's
/// heartbeats) are discarded.
#[derive(Debug, Default)]
struct FrameParser {
    buffer: Vec<u8>,
    current: Frame,
}

impl FrameParser {
    /// Feeds a chunk and returns every frame completed by it.
    fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                let frame = std::mem::take(&mut self.current);
                if frame.id.is_some() || frame.event.is_some() || !frame.data.is_empty() {
                    frames.push(frame);
                }
                continue;
            }

            if line.starts_with(':') {
                // Comment line, used by the server as a heartbeat.
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "id" => self.current.id = Some(value.to_string()),
                "event" => self.current.event = Some(value.to_string()),
                "data" => self.current.data.push(value.to_string()),
                _ => {},
            }
        }
        frames
    }
}

/// Decodes a frame into a typed event, or drops it with a log line.
fn decode_event(frame: &Frame) -> Option<StreamEvent> {
    let name = match frame.event.as_deref() {
        Some(name) => name,
        None => {
            debug!("dropping frame without an event name");
            return None;
        },
    };

    let Some(kind) = StreamEventKind::from_wire(name) else {
        warn!(event = name, "dropping event with unrecognized name");
        return None;
    };

    let data = frame.data.join("\n");
    match serde_json::from_str(&data) {
        Ok(value) => Some(StreamEvent { kind, data: value }),
        Err(error) => {
            warn!(event = name, error = %error, "dropping event with malformed payload");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_complete_frame() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"id: 7\nevent: INCIDENT_CREATED\ndata: {\"id\":\"x\"}\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].id.as_deref(), Some("7"));
        assert_eq!(frames[0].event.as_deref(), Some("INCIDENT_CREATED"));
        assert_eq!(frames[0].data, vec!["{\"id\":\"x\"}"]);
    }

    #[test]
    fn reassembles_frames_split_across_chunks() {
        let mut parser = FrameParser::default();

        assert!(parser.push(b"event: INCIDENT_UP").is_empty());
        assert!(parser.push(b"DATED\ndata: {\"a\"").is_empty());
        let frames = parser.push(b":1}\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("INCIDENT_UPDATED"));
        assert_eq!(frames[0].data, vec!["{\"a\":1}"]);
    }

    #[test]
    fn heartbeat_comments_produce_no_frames() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b": heartbeat\n\n: heartbeat\n\n");
        assert!(frames.is_empty());
    }

    #[test]
    fn multiple_data_lines_join_with_newlines() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"event: INCIDENT_CREATED\ndata: line one\ndata: line two\n\n");

        assert_eq!(frames[0].data, vec!["line one", "line two"]);

        // Joined with newlines, a payload split across data lines still
        // parses: JSON tolerates the embedded whitespace.
        let frame = Frame {
            id: None,
            event: Some("INCIDENT_CREATED".to_string()),
            data: vec!["{\"id\":".to_string(), "\"x\"}".to_string()],
        };
        let event = decode_event(&frame).unwrap();
        assert_eq!(event.data["id"], "x");
    }

    #[test]
    fn tolerates_crlf_line_endings() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"event: INCIDENT_CREATED\r\ndata: {}\r\n\r\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event.as_deref(), Some("INCIDENT_CREATED"));
        assert_eq!(frames[0].data, vec!["{}"]);
    }

    #[test]
    fn field_values_keep_only_one_leading_space() {
        let mut parser = FrameParser::default();
        let frames = parser.push(b"data:no-space\ndata:  two-spaces\n\n");

        assert_eq!(frames[0].data, vec!["no-space", " two-spaces"]);
    }

    #[test]
    fn decode_drops_unknown_event_names() {
        let frame = Frame {
            id: Some("3".to_string()),
            event: Some("SUBSCRIBER_ADDED".to_string()),
            data: vec!["{}".to_string()],
        };
        assert!(decode_event(&frame).is_none());
    }

    #[test]
    fn decode_drops_malformed_json() {
        let frame = Frame {
            id: None,
            event: Some("INCIDENT_CREATED".to_string()),
            data: vec!["{not json".to_string()],
        };
        assert!(decode_event(&frame).is_none());
    }

    #[test]
    fn decode_accepts_known_events() {
        let frame = Frame {
            id: None,
            event: Some("POSTMORTEM_PUBLISHED".to_string()),
            data: vec!["{\"incident\":{\"id\":\"abc\"}}".to_string()],
        };
        let event = decode_event(&frame).unwrap();
        assert_eq!(event.kind, StreamEventKind::PostmortemPublished);
        assert_eq!(event.data["incident"]["id"], "abc");
    }
}
