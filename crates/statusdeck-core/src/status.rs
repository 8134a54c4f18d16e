//! Incident lifecycle states and severity grades.
//!
//! Wire names are the SCREAMING_SNAKE strings the REST API exchanges;
//! [`IncidentStatus::label`] and [`Severity::label`] carry the human-facing
//! form the console renders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    /// The incident was reported and responders are still diagnosing it.
    Investigating,
    /// A cause has been identified but the fix is not yet in place.
    Identified,
    /// A fix is deployed and responders are watching for regression.
    Monitoring,
    /// The incident is closed.
    Resolved,
}

impl IncidentStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [IncidentStatus; 4] = [
        IncidentStatus::Investigating,
        IncidentStatus::Identified,
        IncidentStatus::Monitoring,
        IncidentStatus::Resolved,
    ];

    /// Wire name used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "INVESTIGATING",
            IncidentStatus::Identified => "IDENTIFIED",
            IncidentStatus::Monitoring => "MONITORING",
            IncidentStatus::Resolved => "RESOLVED",
        }
    }

    /// Human-facing label shown in the console.
    pub fn label(&self) -> &'static str {
        match self {
            IncidentStatus::Investigating => "Investigating",
            IncidentStatus::Identified => "Identified",
            IncidentStatus::Monitoring => "Monitoring",
            IncidentStatus::Resolved => "Resolved",
        }
    }

    /// True while the incident still needs responder attention.
    pub fn is_active(&self) -> bool {
        !matches!(self, IncidentStatus::Resolved)
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity grade assigned when an incident is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Full outage of a customer-facing surface.
    Sev1,
    /// Major degradation with a viable workaround.
    Sev2,
    /// Partial degradation, limited blast radius.
    Sev3,
    /// Cosmetic or internal-only impact.
    Sev4,
}

impl Severity {
    /// Every severity, most severe first.
    pub const ALL: [Severity; 4] = [Severity::Sev1, Severity::Sev2, Severity::Sev3, Severity::Sev4];

    /// Wire name used by the REST API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Sev1 => "SEV1",
            Severity::Sev2 => "SEV2",
            Severity::Sev3 => "SEV3",
            Severity::Sev4 => "SEV4",
        }
    }

    /// Human-facing label shown in severity pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Sev1 => "SEV1 - Critical",
            Severity::Sev2 => "SEV2 - High",
            Severity::Sev3 => "SEV3 - Medium",
            Severity::Sev4 => "SEV4 - Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
