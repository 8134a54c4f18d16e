//! Test infrastructure for the statusdeck workspace.
//!
//! Provides a mock incident API, fixture builders for backend payloads, and
//! event-stream body builders so client behavior can be exercised without a
//! real server or real waiting. The [`TestEnv`] clock is shared with the
//! client it hands out, letting tests walk through the whole retry backoff
//! schedule instantly and then assert how much simulated time passed.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use serde_json::Value;
use statusdeck_client::{ApiClient, ClientConfig};
use statusdeck_core::Audience;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub mod fixtures;
pub mod sse;

pub use fixtures::IncidentBuilder;
pub use sse::SseBody;
pub use statusdeck_core::TestClock;

/// Mock incident API plus a deterministic clock for driving the client.
pub struct TestEnv {
    /// The mock server standing in for the incident API.
    pub server: MockServer,
    /// Clock handed to clients; advance it to skip through retry backoff.
    pub clock: TestClock,
}

impl TestEnv {
    /// Starts a mock server and a fresh clock.
    pub async fn new() -> Self {
        Self { server: MockServer::start().await, clock: TestClock::new() }
    }

    /// Base URL of the mock API, including the `/api` prefix the real
    /// backend serves under.
    pub fn base_url(&self) -> String {
        format!("{}/api", self.server.uri())
    }

    /// Client configuration pointed at the mock server.
    pub fn config(&self) -> ClientConfig {
        ClientConfig::with_base_url(self.base_url())
    }

    /// A client wired to the mock server and the shared test clock.
    pub fn client(&self) -> ApiClient {
        self.client_with_config(self.config())
    }

    /// Same as [`client`](Self::client) but with a caller-tuned
    /// configuration. The base URL still comes from the mock server.
    pub fn client_with_config(&self, config: ClientConfig) -> ApiClient {
        let config = ClientConfig { api_base_url: self.base_url(), ..config };
        ApiClient::with_clock(config, Arc::new(self.clock.clone()))
            .expect("test client construction should not fail")
    }

    /// Mounts a JSON response for a GET on the given API path (relative to
    /// the `/api` prefix).
    pub async fn mount_json(&self, api_path: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api{api_path}")))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mounts an event-stream response for the given audience feed. The
    /// stream ends once the body is drained; the channel then reports
    /// end-of-stream rather than reconnecting.
    pub async fn mount_stream(&self, audience: Audience, body: impl Into<String>) {
        Mock::given(method("GET"))
            .and(path(format!("/api/stream/{audience}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(body.into(), "text/event-stream"),
            )
            .mount(&self.server)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn env_clock_is_shared_with_the_client() {
        let env = TestEnv::new().await;
        let _client = env.client();

        env.clock.advance(std::time::Duration::from_secs(5));
        assert_eq!(env.clock.elapsed(), std::time::Duration::from_secs(5));
    }

    #[tokio::test]
    async fn base_url_carries_api_prefix() {
        let env = TestEnv::new().await;
        assert!(env.base_url().ends_with("/api"));
        assert_eq!(env.config().api_base_url, env.base_url());
    }
}
