//! Builders for backend-shaped JSON payloads.
//!
//! Fixtures produce the JSON the real API serves, with deterministic
//! timestamps so assertions stay stable, and are kept decodable into the
//! core models by the tests at the bottom of this module.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use statusdeck_core::{IncidentStatus, Severity};
use uuid::Uuid;

/// Builder for incident payloads as the backend serializes them.
pub struct IncidentBuilder {
    id: Uuid,
    title: String,
    summary: String,
    severity: Severity,
    status: IncidentStatus,
    is_public: bool,
    created_by_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    latest_update: Option<Value>,
}

impl IncidentBuilder {
    /// Creates a builder with sensible defaults: a public SEV2 under
    /// investigation.
    pub fn new() -> Self {
        let created_at = Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap();
        Self {
            id: Uuid::new_v4(),
            title: "Elevated error rate on checkout".to_string(),
            summary: "5xx spike on the checkout service".to_string(),
            severity: Severity::Sev2,
            status: IncidentStatus::Investigating,
            is_public: true,
            created_by_name: "Dana".to_string(),
            created_at,
            updated_at: created_at,
            latest_update: None,
        }
    }

    /// Sets the incident id.
    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    /// Sets the headline.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the impact description.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the severity grade.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the lifecycle status. `active` in the built payload follows it.
    #[must_use]
    pub fn status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets public-page visibility.
    #[must_use]
    pub fn is_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }

    /// Sets the reporter name.
    #[must_use]
    pub fn created_by(mut self, name: impl Into<String>) -> Self {
        self.created_by_name = name.into();
        self
    }

    /// Sets both timestamps.
    #[must_use]
    pub fn timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Embeds a latest timeline update, as list responses do.
    #[must_use]
    pub fn latest_update(mut self, update: Value) -> Self {
        self.latest_update = Some(update);
        self
    }

    /// Builds the JSON payload.
    pub fn build(self) -> Value {
        let mut incident = json!({
            "id": self.id.to_string(),
            "title": self.title,
            "summary": self.summary,
            "severity": self.severity.as_str(),
            "status": self.status.as_str(),
            "is_public": self.is_public,
            "active": self.status.is_active(),
            "created_by_name": self.created_by_name,
            "created_at": self.created_at.to_rfc3339(),
            "updated_at": self.updated_at.to_rfc3339(),
        });
        if let Some(update) = self.latest_update {
            incident["latest_update"] = update;
        }
        incident
    }
}

impl Default for IncidentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A timeline update payload as the backend serializes it.
pub fn update_json(incident_id: Uuid, message: &str, status: IncidentStatus) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "incident": incident_id.to_string(),
        "message": message,
        "status_at_time": status.as_str(),
        "created_by_name": "Dana",
        "created_at": Utc.with_ymd_and_hms(2025, 1, 10, 9, 0, 0).unwrap().to_rfc3339(),
    })
}

/// The event payload a status-change broadcast carries: the incident after
/// the transition plus the timeline entry it wrote.
pub fn status_changed_data(incident: Value, update: Value) -> Value {
    json!({ "incident": incident, "update": update })
}

#[cfg(test)]
mod tests {
    use statusdeck_core::models::{Incident, IncidentUpdate};

    use super::*;

    #[test]
    fn incident_fixture_decodes_into_model() {
        let incident: Incident = serde_json::from_value(IncidentBuilder::new().build()).unwrap();
        assert_eq!(incident.severity, Severity::Sev2);
        assert_eq!(incident.status, IncidentStatus::Investigating);
        assert!(incident.active);
        assert!(incident.latest_update.is_none());
    }

    #[test]
    fn resolved_fixture_is_inactive() {
        let payload = IncidentBuilder::new().status(IncidentStatus::Resolved).build();
        assert_eq!(payload["active"], false);
    }

    #[test]
    fn update_fixture_decodes_into_model() {
        let id = Uuid::new_v4();
        let update: IncidentUpdate =
            serde_json::from_value(update_json(id, "Mitigated", IncidentStatus::Monitoring))
                .unwrap();
        assert_eq!(update.incident.0, id);
        assert_eq!(update.status_at_time, IncidentStatus::Monitoring);
    }
}
