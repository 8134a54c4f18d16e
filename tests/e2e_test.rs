//! End-to-end tests for the console follower's workflows.
//!
//! Exercises the full client stack against one mock API: snapshot fetch,
//! live event delivery, snapshot refresh, and the incident lifecycle from
//! creation through postmortem export.

use anyhow::Result;
use serde_json::json;
use statusdeck_client::{
    incidents::{NewIncident, NewUpdate, TransitionRequest},
    EventChannel,
};
use statusdeck_core::{
    default_next, is_allowed, Audience, IncidentStatus, Severity, StreamEventKind,
};
use statusdeck_testing::{fixtures, IncidentBuilder, SseBody, TestEnv};
use uuid::Uuid;
use wiremock::{
    matchers::{method, path},
    Mock, ResponseTemplate,
};

/// The golden path: take a snapshot, receive a status-change event, and
/// refresh to see the new state.
#[tokio::test]
async fn follower_sees_live_status_changes() -> Result<()> {
    let env = TestEnv::new().await;
    let incident_id = Uuid::new_v4();

    // First snapshot shows the incident under investigation.
    Mock::given(method("GET"))
        .and(path("/api/incidents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([IncidentBuilder::new()
            .id(incident_id)
            .status(IncidentStatus::Investigating)
            .build()])))
        .up_to_n_times(1)
        .mount(&env.server)
        .await;
    // Every fetch after the event shows the transitioned state.
    Mock::given(method("GET"))
        .and(path("/api/incidents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([IncidentBuilder::new()
            .id(incident_id)
            .status(IncidentStatus::Monitoring)
            .build()])))
        .mount(&env.server)
        .await;

    let monitoring = IncidentBuilder::new().id(incident_id).status(IncidentStatus::Monitoring);
    env.mount_stream(
        Audience::Admin,
        SseBody::new()
            .event(
                1,
                StreamEventKind::IncidentStatusChanged,
                &fixtures::status_changed_data(
                    monitoring.build(),
                    fixtures::update_json(incident_id, "Fix deployed", IncidentStatus::Monitoring),
                ),
            )
            .build(),
    )
    .await;

    let client = env.client();

    let before = client.list_incidents().await?;
    assert_eq!(before[0].status, IncidentStatus::Investigating);

    let mut channel = EventChannel::open(&client, Audience::Admin);
    let event = channel.next_event().await.expect("status change should arrive");
    assert_eq!(event.kind, StreamEventKind::IncidentStatusChanged);
    assert_eq!(event.incident_id().map(|id| id.0), Some(incident_id));

    let after = client.list_incidents().await?;
    assert_eq!(after[0].status, IncidentStatus::Monitoring);
    assert!(is_allowed(before[0].status, after[0].status), "observed an illegal transition");
    Ok(())
}

/// A whole incident lifecycle against the API: open it, walk the default
/// transition, post an update, and export the postmortem.
#[tokio::test]
async fn incident_lifecycle_round_trip() -> Result<()> {
    let env = TestEnv::new().await;
    let incident_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/api/incidents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            IncidentBuilder::new().id(incident_id).status(IncidentStatus::Investigating).build(),
        ))
        .mount(&env.server)
        .await;
    // The transition hits one gateway hiccup before landing.
    Mock::given(method("POST"))
        .and(path(format!("/api/incidents/{incident_id}/transition")))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&env.server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/incidents/{incident_id}/transition")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "incident": IncidentBuilder::new()
                .id(incident_id)
                .status(IncidentStatus::Identified)
                .build(),
            "update": fixtures::update_json(incident_id, "Cause found", IncidentStatus::Identified),
        })))
        .mount(&env.server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/incidents/{incident_id}/updates")))
        .respond_with(ResponseTemplate::new(201).set_body_json(fixtures::update_json(
            incident_id,
            "Rolling out the fix",
            IncidentStatus::Identified,
        )))
        .mount(&env.server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/incidents/{incident_id}/postmortem/export")))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "# Postmortem: Elevated error rate on checkout\n",
            "text/markdown; charset=utf-8",
        ))
        .mount(&env.server)
        .await;

    let client = env.client();

    let created = client
        .create_incident(&NewIncident {
            title: "Elevated error rate on checkout".to_string(),
            summary: "5xx spike on the checkout service".to_string(),
            severity: Severity::Sev2,
            status: None,
            is_public: true,
            created_by_name: "Dana".to_string(),
        })
        .await?;
    assert_eq!(created.status, IncidentStatus::Investigating);

    let next = default_next(created.status).expect("investigating has a next status");
    let outcome = client
        .transition_incident(
            created.id,
            &TransitionRequest {
                status: next,
                actor_name: "Lee".to_string(),
                message: Some("Cause found".to_string()),
            },
        )
        .await?;
    assert_eq!(outcome.incident.status, IncidentStatus::Identified);
    assert_eq!(outcome.update.status_at_time, IncidentStatus::Identified);
    assert_eq!(env.clock.elapsed(), std::time::Duration::from_secs(5), "one retry backoff");

    let update = client
        .post_update(
            created.id,
            &NewUpdate {
                message: "Rolling out the fix".to_string(),
                status_at_time: None,
                created_by_name: "Lee".to_string(),
            },
        )
        .await?;
    assert_eq!(update.message, "Rolling out the fix");

    let markdown = client.export_postmortem_markdown(created.id).await?;
    assert!(markdown.starts_with("# Postmortem"), "got {markdown:?}");
    Ok(())
}
