//! Core domain types for the statusdeck incident console.
//!
//! This crate carries everything the client and tooling layers agree on:
//! identifier newtypes, the incident/postmortem record shapes exchanged with
//! the REST API, the status transition rules, the live event vocabulary, and
//! the [`Clock`](time::Clock) abstraction used to keep retry backoff testable.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod events;
pub mod models;
pub mod status;
pub mod time;
pub mod transitions;

pub use events::{Audience, StreamEvent, StreamEventKind};
pub use models::{
    ActionItem, ActionItemId, ActionItemStatus, AuditEvent, Incident, IncidentAnalytics,
    IncidentId, IncidentUpdate, MetricsReport, Postmortem, PostmortemId, PublicStatus, Subscriber,
    SubscriberId, SubscriberScope, UpdateId,
};
pub use status::{IncidentStatus, Severity};
pub use time::{Clock, RealClock, TestClock};
pub use transitions::{allowed_transitions, default_next, is_allowed};
