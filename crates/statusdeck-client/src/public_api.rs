//! Read-only operations for the public status page.
//!
//! These endpoints are unauthenticated and only ever see public incidents;
//! the server returns 404 for internal ones rather than admitting they
//! exist.

use statusdeck_core::models::{Incident, IncidentId, Postmortem, PublicStatus};

use crate::{
    error::Result,
    request::{ApiClient, ApiRequest},
};

impl ApiClient {
    /// Overall banner state plus the currently active public incidents.
    pub async fn public_status(&self) -> Result<PublicStatus> {
        self.fetch(ApiRequest::get("/public/status")).await
    }

    /// One public incident by id.
    pub async fn public_incident(&self, id: IncidentId) -> Result<Incident> {
        self.fetch(ApiRequest::get(format!("/public/incidents/{id}"))).await
    }

    /// The published postmortem of a public incident.
    pub async fn public_postmortem(&self, id: IncidentId) -> Result<Postmortem> {
        self.fetch(ApiRequest::get(format!("/public/incidents/{id}/postmortem"))).await
    }
}
