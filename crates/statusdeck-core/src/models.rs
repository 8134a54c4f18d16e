//! Record shapes exchanged with the incident API.
//!
//! Every struct here mirrors a serializer on the backend. Identifier fields
//! use dedicated newtypes so an incident id cannot silently stand in for a
//! postmortem id; everything else decodes straight off the wire with serde.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{IncidentStatus, Severity};

/// Unique identifier for an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub Uuid);

impl IncidentId {
    /// Creates a new random incident ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IncidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for IncidentId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique identifier for a timeline update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpdateId(pub Uuid);

impl UpdateId {
    /// Creates a new random update ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UpdateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UpdateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UpdateId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique identifier for a postmortem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostmortemId(pub Uuid);

impl PostmortemId {
    /// Creates a new random postmortem ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PostmortemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostmortemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PostmortemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique identifier for a postmortem action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionItemId(pub Uuid);

impl ActionItemId {
    /// Creates a new random action item ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActionItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActionItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ActionItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Unique identifier for a notification subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Creates a new random subscriber ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SubscriberId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// An incident as served by the admin and public APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier.
    pub id: IncidentId,
    /// Short headline shown in lists.
    pub title: String,
    /// Longer free-form description of impact.
    pub summary: String,
    /// Severity grade assigned at open time.
    pub severity: Severity,
    /// Current lifecycle status.
    pub status: IncidentStatus,
    /// Whether the incident appears on the public status page.
    pub is_public: bool,
    /// Display name of whoever opened the incident.
    pub created_by_name: String,
    /// When the incident was opened.
    pub created_at: DateTime<Utc>,
    /// When any field last changed.
    pub updated_at: DateTime<Utc>,
    /// Most recent timeline update, when one exists.
    #[serde(default)]
    pub latest_update: Option<IncidentUpdate>,
    /// Server-computed flag: true until the incident resolves.
    pub active: bool,
}

/// A timeline entry posted against an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentUpdate {
    /// Unique identifier.
    pub id: UpdateId,
    /// The incident this update belongs to.
    pub incident: IncidentId,
    /// What the responder wrote.
    pub message: String,
    /// Incident status at the moment the update was posted.
    pub status_at_time: IncidentStatus,
    /// Display name of the author.
    pub created_by_name: String,
    /// When the update was posted.
    pub created_at: DateTime<Utc>,
}

/// A retrospective document attached to an incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Postmortem {
    /// Unique identifier.
    pub id: PostmortemId,
    /// The incident this document belongs to.
    pub incident: IncidentId,
    /// Executive summary.
    pub summary: String,
    /// Customer and internal impact description.
    pub impact: String,
    /// What actually went wrong.
    pub root_cause: String,
    /// How the incident was detected.
    pub detection: String,
    /// How the incident was resolved.
    pub resolution: String,
    /// Follow-up learnings.
    pub lessons_learned: String,
    /// True once the document is visible on the public page.
    pub published: bool,
    /// When it was published, if it has been.
    pub published_at: Option<DateTime<Utc>>,
    /// When the draft was created.
    pub created_at: DateTime<Utc>,
    /// When it last changed.
    pub updated_at: DateTime<Utc>,
    /// Tracked follow-up work.
    #[serde(default)]
    pub action_items: Vec<ActionItem>,
}

/// Completion state of a postmortem action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionItemStatus {
    /// Not started.
    Open,
    /// Someone is actively on it.
    InProgress,
    /// Finished.
    Done,
}

impl ActionItemStatus {
    /// Wire name used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionItemStatus::Open => "OPEN",
            ActionItemStatus::InProgress => "IN_PROGRESS",
            ActionItemStatus::Done => "DONE",
        }
    }
}

impl fmt::Display for ActionItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A follow-up task tracked on a postmortem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Unique identifier.
    pub id: ActionItemId,
    /// The postmortem this item belongs to.
    pub postmortem: PostmortemId,
    /// What needs doing.
    pub title: String,
    /// Display name of the owner.
    pub owner_name: String,
    /// Due date, when one was set.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Completion state.
    pub status: ActionItemStatus,
}

/// One entry from the admin audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name of whoever acted.
    pub actor_name: String,
    /// Machine-readable action name, e.g. `incident.transitioned`.
    pub action: String,
    /// The incident acted on, when the action targets one.
    #[serde(default)]
    pub incident: Option<IncidentId>,
    /// Free-form context recorded with the action.
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// When the action happened.
    pub created_at: DateTime<Utc>,
}

/// Whether a subscriber follows everything or a single incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriberScope {
    /// Notified about every public incident.
    Global,
    /// Notified about one incident only.
    Incident,
}

impl SubscriberScope {
    /// Wire name used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriberScope::Global => "GLOBAL",
            SubscriberScope::Incident => "INCIDENT",
        }
    }
}

impl fmt::Display for SubscriberScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An email subscriber to status notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Unique identifier.
    pub id: SubscriberId,
    /// Address notifications go to.
    pub email: String,
    /// Whether they follow everything or one incident.
    pub scope: SubscriberScope,
    /// The followed incident for incident-scoped subscriptions.
    #[serde(default)]
    pub incident: Option<IncidentId>,
    /// False once the subscriber unsubscribes.
    pub is_active: bool,
    /// When the subscription was created.
    pub created_at: DateTime<Utc>,
}

/// Snapshot served to the public status page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicStatus {
    /// Banner text derived from the worst active public severity, one of
    /// "All Systems Operational", "Degraded Performance", "Partial Outage",
    /// or "Major Outage". The vocabulary belongs to the backend; render it
    /// as given.
    pub overall_status: String,
    /// Active public incidents, newest first.
    pub active_incidents: Vec<Incident>,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentAnalytics {
    /// Mean time to resolve in hours, `None` until something has resolved.
    pub mttr_hours: Option<f64>,
    /// Incidents currently open.
    pub active_incidents: u32,
    /// Incidents resolved in the trailing seven days.
    pub resolved_last_7_days: u32,
    /// Open-incident counts per severity; every severity is present.
    pub incidents_per_severity: HashMap<Severity, u32>,
}

/// Full metrics document behind the admin metrics page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Incident volume and open-incident posture.
    pub incident_pulse: IncidentPulse,
    /// How quickly incidents resolve.
    pub resolution_health: ResolutionHealth,
    /// Subscriber and notification activity.
    pub engagement: Engagement,
    /// Items that need a human nudge.
    pub automation_watchlist: AutomationWatchlist,
}

/// Incident volume over time plus the current open posture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncidentPulse {
    /// Incidents opened per bucket, oldest first.
    pub timeline: Vec<TimelinePoint>,
    /// Incidents open right now.
    pub current_open: u32,
    /// Target ceiling for open incidents, in hours of responder attention.
    pub sla_target: u32,
    /// Open-incident counts per severity; every severity is present.
    pub severity_breakdown: HashMap<Severity, u32>,
}

/// One bucket on the incident volume timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Bucket start.
    pub timestamp: DateTime<Utc>,
    /// Incidents opened in the bucket.
    pub count: u32,
}

/// Resolution speed, sliced a few ways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionHealth {
    /// Weekly mean-time-to-resolve series.
    pub weekly_mttr: WeeklyMttr,
    /// Resolution-time percentiles across the reporting window.
    pub percentiles: ResolutionPercentiles,
    /// Resolved-incident counts per severity.
    pub resolved_by_severity: Vec<SeverityCount>,
    /// Resolved-incident split by visibility.
    pub visibility_breakdown: VisibilityBreakdown,
}

/// Weekly MTTR series, overall and split by visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyMttr {
    /// All incidents.
    pub all: Vec<MttrWeek>,
    /// Public incidents only.
    pub public: Vec<MttrWeek>,
    /// Internal incidents only.
    pub internal: Vec<MttrWeek>,
}

/// One week on an MTTR series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MttrWeek {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Mean hours to resolve, `None` when nothing resolved that week.
    pub mttr_hours: Option<f64>,
}

/// Resolution-time percentiles in hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionPercentiles {
    /// Median.
    pub p50: Option<f64>,
    /// 90th percentile.
    pub p90: Option<f64>,
}

/// A severity paired with a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityCount {
    /// The severity grade.
    pub severity: Severity,
    /// How many incidents.
    pub count: u32,
}

/// Resolved-incident counts by visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityBreakdown {
    /// Publicly visible incidents.
    pub public: u32,
    /// Internal-only incidents.
    pub internal: u32,
}

/// Subscriber and notification activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    /// New subscribers per day.
    pub subscriber_growth: Vec<DailyCount>,
    /// Notification emails grouped by delivery status.
    pub email_delivery: Vec<EmailDeliveryCount>,
    /// Status-page view counts; views stay `None` until analytics lands.
    pub status_page_views: Vec<PageViews>,
}

/// A date paired with a count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    /// The day.
    pub date: NaiveDate,
    /// How many.
    pub count: u32,
}

/// Email volume for one delivery status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailDeliveryCount {
    /// Backend delivery status name, e.g. `SENT` or `FAILED`.
    pub status: String,
    /// Emails in that state.
    pub count: u32,
}

/// Status-page views for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageViews {
    /// The day.
    pub date: NaiveDate,
    /// View count, absent until page analytics is wired up.
    pub views: Option<u64>,
}

/// Items the backend flags for human follow-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationWatchlist {
    /// Open incidents with no recent timeline activity.
    pub stale_incidents: Vec<StaleIncident>,
    /// Resolved incidents still missing a postmortem.
    pub missing_postmortems: Vec<MissingPostmortem>,
    /// Action items past their due date.
    pub overdue_action_items: Vec<OverdueActionItem>,
}

/// An open incident that has gone quiet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleIncident {
    /// The incident.
    pub id: IncidentId,
    /// Its headline.
    pub title: String,
    /// Minutes since the last update or edit.
    pub minutes_since_update: i64,
}

/// A resolved incident with no postmortem yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingPostmortem {
    /// The incident.
    pub id: IncidentId,
    /// Its headline.
    pub title: String,
    /// Its severity grade.
    pub severity: Severity,
}

/// An action item past its due date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueActionItem {
    /// The action item.
    pub id: ActionItemId,
    /// What needs doing.
    pub title: String,
    /// Display name of the owner.
    pub owner_name: String,
    /// The missed due date.
    pub due_date: NaiveDate,
}
