//! Typed operations on the admin incident API.
//!
//! One method per REST operation, each built on
//! [`ApiClient::execute`](crate::ApiClient::execute) and friends so every
//! call shares the same retry, error, and idempotency behavior. Mutations
//! that the console may fire twice under network trouble — transitions,
//! timeline updates, subscriptions — attach a fresh [`IdempotencyKey`] per
//! logical call; the executor then carries that key across its retries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use statusdeck_core::models::{
    ActionItem, ActionItemId, ActionItemStatus, AuditEvent, Incident, IncidentAnalytics,
    IncidentId, IncidentUpdate, MetricsReport, Postmortem, Subscriber, SubscriberScope,
};
use statusdeck_core::status::{IncidentStatus, Severity};

use crate::{
    error::{ApiError, Result},
    request::{ApiClient, ApiRequest, IdempotencyKey},
};

/// Payload for opening an incident.
#[derive(Debug, Clone, Serialize)]
pub struct NewIncident {
    /// Short headline.
    pub title: String,
    /// Longer impact description.
    pub summary: String,
    /// Severity grade.
    pub severity: Severity,
    /// Initial status; the server defaults to investigating when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    /// Whether the incident shows on the public page.
    pub is_public: bool,
    /// Display name of the reporter.
    pub created_by_name: String,
}

/// Partial edit of incident fields; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IncidentPatch {
    /// New headline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New impact description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// New severity grade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// New status. Prefer [`transition_incident`](ApiClient::transition_incident),
    /// which enforces the lifecycle rules and writes a timeline entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    /// New visibility flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    /// New reporter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,
}

/// Payload for a lifecycle transition.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionRequest {
    /// Target status; must be legal per the transition table.
    pub status: IncidentStatus,
    /// Display name of whoever is transitioning.
    pub actor_name: String,
    /// Optional note recorded on the timeline entry the transition writes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a successful transition returns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransitionOutcome {
    /// The incident with its new status.
    pub incident: Incident,
    /// The timeline entry the transition wrote.
    pub update: IncidentUpdate,
}

/// Payload for posting a timeline update.
#[derive(Debug, Clone, Serialize)]
pub struct NewUpdate {
    /// What happened.
    pub message: String,
    /// Status to record on the entry; defaults to the incident's current one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_at_time: Option<IncidentStatus>,
    /// Display name of the author.
    pub created_by_name: String,
}

/// Postmortem content; used for both creating and editing the draft.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostmortemDraft {
    /// Executive summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Impact description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    /// What went wrong.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_cause: Option<String>,
    /// How it was detected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<String>,
    /// How it was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// What to carry forward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
}

/// Payload for creating a postmortem action item.
#[derive(Debug, Clone, Serialize)]
pub struct NewActionItem {
    /// What needs doing.
    pub title: String,
    /// Display name of the owner.
    pub owner_name: String,
    /// Due date, when one is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Initial state; the server defaults to open when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionItemStatus>,
}

/// Partial edit of an action item; unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionItemPatch {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    /// New due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// New state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActionItemStatus>,
}

/// Payload for subscribing to email notifications.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeRequest {
    /// Address to notify.
    pub email: String,
    /// Follow everything, or one incident.
    pub scope: SubscriberScope,
    /// The incident to follow for incident-scoped subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident: Option<IncidentId>,
}

#[derive(Serialize)]
struct PublishPostmortem<'a> {
    actor_name: &'a str,
}

fn encode<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string(payload)
        .map_err(|e| ApiError::decode(format!("failed to encode request body: {e}")))
}

impl ApiClient {
    /// Headline numbers for the admin dashboard.
    pub async fn incident_analytics(&self) -> Result<IncidentAnalytics> {
        self.fetch(ApiRequest::get("/incidents/analytics")).await
    }

    /// Full metrics document for the admin metrics page.
    pub async fn admin_metrics(&self) -> Result<MetricsReport> {
        self.fetch(ApiRequest::get("/metrics")).await
    }

    /// Every incident, newest first.
    pub async fn list_incidents(&self) -> Result<Vec<Incident>> {
        self.fetch(ApiRequest::get("/incidents")).await
    }

    /// One incident by id.
    pub async fn get_incident(&self, id: IncidentId) -> Result<Incident> {
        self.fetch(ApiRequest::get(format!("/incidents/{id}"))).await
    }

    /// Opens a new incident.
    pub async fn create_incident(&self, payload: &NewIncident) -> Result<Incident> {
        let request = ApiRequest::post("/incidents").with_body(encode(payload)?);
        self.fetch(request).await
    }

    /// Edits incident fields in place.
    pub async fn update_incident(&self, id: IncidentId, patch: &IncidentPatch) -> Result<Incident> {
        let request = ApiRequest::patch(format!("/incidents/{id}")).with_body(encode(patch)?);
        self.fetch(request).await
    }

    /// Moves an incident through its lifecycle.
    ///
    /// Idempotency-keyed: retries of one logical transition deduplicate on
    /// the server instead of writing duplicate timeline entries.
    pub async fn transition_incident(
        &self,
        id: IncidentId,
        payload: &TransitionRequest,
    ) -> Result<TransitionOutcome> {
        let request = ApiRequest::post(format!("/incidents/{id}/transition"))
            .with_body(encode(payload)?)
            .with_idempotency_key(IdempotencyKey::new());
        self.fetch(request).await
    }

    /// Timeline updates for an incident, newest first.
    pub async fn list_updates(&self, id: IncidentId) -> Result<Vec<IncidentUpdate>> {
        self.fetch(ApiRequest::get(format!("/incidents/{id}/updates"))).await
    }

    /// Posts a timeline update. Idempotency-keyed.
    pub async fn post_update(&self, id: IncidentId, payload: &NewUpdate) -> Result<IncidentUpdate> {
        let request = ApiRequest::post(format!("/incidents/{id}/updates"))
            .with_body(encode(payload)?)
            .with_idempotency_key(IdempotencyKey::new());
        self.fetch(request).await
    }

    /// The incident's postmortem. Fails with a 404 status error while none
    /// exists.
    pub async fn get_postmortem(&self, id: IncidentId) -> Result<Postmortem> {
        self.fetch(ApiRequest::get(format!("/incidents/{id}/postmortem"))).await
    }

    /// Creates the postmortem draft.
    pub async fn create_postmortem(
        &self,
        id: IncidentId,
        draft: &PostmortemDraft,
    ) -> Result<Postmortem> {
        let request =
            ApiRequest::post(format!("/incidents/{id}/postmortem")).with_body(encode(draft)?);
        self.fetch(request).await
    }

    /// Edits the postmortem draft.
    pub async fn update_postmortem(
        &self,
        id: IncidentId,
        draft: &PostmortemDraft,
    ) -> Result<Postmortem> {
        let request =
            ApiRequest::patch(format!("/incidents/{id}/postmortem")).with_body(encode(draft)?);
        self.fetch(request).await
    }

    /// Publishes the postmortem to the public page.
    pub async fn publish_postmortem(&self, id: IncidentId, actor_name: &str) -> Result<Postmortem> {
        let request = ApiRequest::post(format!("/incidents/{id}/postmortem/publish"))
            .with_body(encode(&PublishPostmortem { actor_name })?);
        self.fetch(request).await
    }

    /// The postmortem rendered as markdown.
    pub async fn export_postmortem_markdown(&self, id: IncidentId) -> Result<String> {
        self.fetch_text(ApiRequest::get(format!("/incidents/{id}/postmortem/export"))).await
    }

    /// The admin audit trail, newest first.
    pub async fn list_audit_events(&self) -> Result<Vec<AuditEvent>> {
        self.fetch(ApiRequest::get("/audit")).await
    }

    /// Subscribes an email address to notifications. Idempotency-keyed.
    pub async fn subscribe(&self, payload: &SubscribeRequest) -> Result<Subscriber> {
        let request = ApiRequest::post("/subscribers")
            .with_body(encode(payload)?)
            .with_idempotency_key(IdempotencyKey::new());
        self.fetch(request).await
    }

    /// Action items on the incident's postmortem.
    pub async fn list_action_items(&self, id: IncidentId) -> Result<Vec<ActionItem>> {
        self.fetch(ApiRequest::get(format!("/incidents/{id}/postmortem/action-items"))).await
    }

    /// Adds an action item to the incident's postmortem.
    pub async fn create_action_item(
        &self,
        id: IncidentId,
        payload: &NewActionItem,
    ) -> Result<ActionItem> {
        let request = ApiRequest::post(format!("/incidents/{id}/postmortem/action-items"))
            .with_body(encode(payload)?);
        self.fetch(request).await
    }

    /// Edits an action item.
    pub async fn update_action_item(
        &self,
        id: IncidentId,
        item: ActionItemId,
        patch: &ActionItemPatch,
    ) -> Result<ActionItem> {
        let request = ApiRequest::patch(format!("/incidents/{id}/postmortem/action-items/{item}"))
            .with_body(encode(patch)?);
        self.fetch(request).await
    }
}
