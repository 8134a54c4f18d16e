//! Live event vocabulary for the incident stream.
//!
//! The backend pushes server-sent events on two audience-scoped feeds. The
//! event names form a closed set: anything outside [`StreamEventKind`] is a
//! protocol drift and gets dropped (with a log line) before it reaches a
//! consumer, so downstream match statements never need a catch-all arm for
//! unknown names.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::IncidentId;

/// Which feed a subscription attaches to.
///
/// The admin feed carries every incident; the public feed only carries
/// incidents flagged as publicly visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    /// Internal console feed, all incidents.
    Admin,
    /// Status-page feed, public incidents only.
    Public,
}

impl Audience {
    /// Path segment used when building the stream URL.
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Admin => "admin",
            Audience::Public => "public",
        }
    }

    /// Parses the path-segment form, e.g. from a CLI argument.
    pub fn from_wire(value: &str) -> Option<Audience> {
        match value {
            "admin" => Some(Audience::Admin),
            "public" => Some(Audience::Public),
            _ => None,
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The closed set of event names the stream may deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamEventKind {
    /// A new incident was opened. Payload is the incident record.
    IncidentCreated,
    /// Incident fields were edited. Payload is the incident record.
    IncidentUpdated,
    /// The incident moved to a new lifecycle status. Payload nests the
    /// incident record and the update entry the transition wrote.
    IncidentStatusChanged,
    /// A responder posted a timeline update. Payload nests the incident
    /// record and the new update entry.
    IncidentUpdatePosted,
    /// A postmortem went public. Payload nests the incident record and the
    /// published postmortem.
    PostmortemPublished,
}

impl StreamEventKind {
    /// Every kind the stream may carry.
    pub const ALL: [StreamEventKind; 5] = [
        StreamEventKind::IncidentCreated,
        StreamEventKind::IncidentUpdated,
        StreamEventKind::IncidentStatusChanged,
        StreamEventKind::IncidentUpdatePosted,
        StreamEventKind::PostmortemPublished,
    ];

    /// Wire name carried on the `event:` line of the feed.
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamEventKind::IncidentCreated => "INCIDENT_CREATED",
            StreamEventKind::IncidentUpdated => "INCIDENT_UPDATED",
            StreamEventKind::IncidentStatusChanged => "INCIDENT_STATUS_CHANGED",
            StreamEventKind::IncidentUpdatePosted => "INCIDENT_UPDATE_POSTED",
            StreamEventKind::PostmortemPublished => "POSTMORTEM_PUBLISHED",
        }
    }

    /// Parses a wire name, returning `None` for anything outside the set.
    pub fn from_wire(name: &str) -> Option<StreamEventKind> {
        match name {
            "INCIDENT_CREATED" => Some(StreamEventKind::IncidentCreated),
            "INCIDENT_UPDATED" => Some(StreamEventKind::IncidentUpdated),
            "INCIDENT_STATUS_CHANGED" => Some(StreamEventKind::IncidentStatusChanged),
            "INCIDENT_UPDATE_POSTED" => Some(StreamEventKind::IncidentUpdatePosted),
            "POSTMORTEM_PUBLISHED" => Some(StreamEventKind::PostmortemPublished),
            _ => None,
        }
    }
}

impl fmt::Display for StreamEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One decoded event from the live feed.
///
/// The payload stays a raw JSON value: every consumer re-fetches the records
/// it cares about rather than trusting the pushed body, so a typed decode here
/// would only add failure modes. [`StreamEvent::incident_id`] is the one piece
/// consumers routinely need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Which kind of change happened.
    #[serde(rename = "type")]
    pub kind: StreamEventKind,
    /// The event payload as pushed by the backend.
    pub data: serde_json::Value,
}

impl StreamEvent {
    /// The incident this event concerns.
    ///
    /// Create/update events carry the incident record directly, so the
    /// identifier sits at `data.id`; the composite events nest it under
    /// `data.incident.id`. Returns `None` only when the payload breaks that
    /// contract.
    pub fn incident_id(&self) -> Option<IncidentId> {
        let raw = self
            .data
            .get("id")
            .or_else(|| self.data.get("incident").and_then(|incident| incident.get("id")))?;
        let parsed = raw.as_str().and_then(|text| Uuid::parse_str(text).ok())?;
        Some(IncidentId::from(parsed))
    }
}
