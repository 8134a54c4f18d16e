//! Status transition rules for incidents.
//!
//! The table is the single source of truth for which lifecycle moves the
//! console may offer. Each entry is ordered by preference: the first target is
//! the natural next step and is what the transition form preselects.

use crate::status::IncidentStatus;

/// Targets an incident in `status` may legally move to, in preference order.
pub fn allowed_transitions(status: IncidentStatus) -> &'static [IncidentStatus] {
    use IncidentStatus::*;
    match status {
        Investigating => &[Identified, Monitoring, Resolved],
        Identified => &[Monitoring, Resolved],
        Monitoring => &[Resolved],
        Resolved => &[Investigating],
    }
}

/// True when moving from `from` to `to` is a legal lifecycle step.
pub fn is_allowed(from: IncidentStatus, to: IncidentStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// The preferred next status, used to preselect the transition form.
pub fn default_next(status: IncidentStatus) -> Option<IncidentStatus> {
    allowed_transitions(status).first().copied()
}
