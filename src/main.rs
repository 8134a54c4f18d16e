//! Statusdeck incident console follower.
//!
//! Connects to the incident API, prints a snapshot of active incidents,
//! then follows the live event feed and refreshes the snapshot as events
//! arrive. Pass `admin` or `public` as the first argument to pick the
//! feed; admin is the default.

use anyhow::{Context, Result};
use statusdeck_client::{ApiClient, ClientConfig, EventChannel};
use statusdeck_core::{Audience, StreamEvent};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ClientConfig::load().context("configuration error")?;
    let audience = audience_from_args();
    info!(
        api_base_url = %config.api_base_url,
        audience = %audience,
        "starting statusdeck follower"
    );

    let client = ApiClient::new(config)?;
    print_snapshot(&client).await.context("initial snapshot failed")?;

    let mut channel = EventChannel::open(&client, audience);
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            event = channel.next_event() => match event {
                Some(event) => handle_event(&client, &event).await,
                None => {
                    warn!("event stream ended; restart the follower to reconnect");
                    break;
                }
            },
        }
    }

    channel.close();
    info!("statusdeck follower stopped");
    Ok(())
}

/// Logs the event, then refreshes the snapshot so the console reflects it.
async fn handle_event(client: &ApiClient, event: &StreamEvent) {
    match event.incident_id() {
        Some(incident) => info!(kind = %event.kind, %incident, "event received"),
        None => info!(kind = %event.kind, "event received"),
    }

    if let Err(error) = print_snapshot(client).await {
        warn!(error = %error, "snapshot refresh failed");
    }
}

/// Fetches the incident list and logs the active ones.
async fn print_snapshot(client: &ApiClient) -> Result<()> {
    let incidents = client.list_incidents().await?;
    let active: Vec<_> = incidents.iter().filter(|incident| incident.active).collect();

    info!(total = incidents.len(), active = active.len(), "incident snapshot");
    for incident in active {
        info!(
            id = %incident.id,
            severity = %incident.severity,
            status = %incident.status,
            title = %incident.title,
            "active incident"
        );
    }
    Ok(())
}

/// Reads the audience from the first CLI argument, defaulting to admin.
fn audience_from_args() -> Audience {
    match std::env::args().nth(1) {
        None => Audience::Admin,
        Some(raw) => Audience::from_wire(&raw).unwrap_or_else(|| {
            warn!(argument = %raw, "unknown audience, using admin");
            Audience::Admin
        }),
    }
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,statusdeck=debug,statusdeck_client=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received CTRL+C signal");
        },
        _ = terminate => {
            info!("received SIGTERM signal");
        },
    }
}
