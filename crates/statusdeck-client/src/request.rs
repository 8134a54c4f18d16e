//! Request execution with fixed-schedule retry.
//!
//! Every REST call goes through [`ApiClient::execute`]: build the request
//! from an [`ApiRequest`] descriptor, send it, and classify the outcome.
//! Transport failures and gateway statuses (502/503/504) are retried on the
//! configured backoff schedule; everything else is terminal on the first
//! response. The descriptor — idempotency key included — is reused verbatim
//! across attempts, so the server can deduplicate a retried mutation.

use std::{collections::HashMap, sync::Arc};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use statusdeck_core::time::{Clock, RealClock};
use tracing::{debug, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    config::ClientConfig,
    error::{ApiError, ErrorCategory, Result},
};

const IDEMPOTENCY_KEY_HEADER: HeaderName = HeaderName::from_static("idempotency-key");

/// Deduplication token for mutating calls.
///
/// Generated once per logical operation and carried on every retry of it, so
/// the server applies the mutation at most once no matter how many attempts
/// the network costs us. A fresh logical call gets a fresh key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Generates a new random key.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The key as a header-ready string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for IdempotencyKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for IdempotencyKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Description of one API call, independent of how many attempts it takes.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path resolved against the configured base URL, or an absolute URL.
    pub path: String,
    /// Pre-serialized JSON body, when the call has one.
    pub body: Option<String>,
    /// Extra headers; these override the defaults on name collision.
    pub headers: HashMap<String, String>,
    /// Deduplication token for mutating calls.
    pub idempotency_key: Option<IdempotencyKey>,
    /// When set, the response body is not read on success.
    pub skip_decode: bool,
}

impl ApiRequest {
    /// Creates a descriptor for `method` on `path`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HashMap::new(),
            idempotency_key: None,
            skip_decode: false,
        }
    }

    /// GET descriptor.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST descriptor.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PATCH descriptor.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// Attaches a pre-serialized JSON body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Adds a header, overriding any default of the same name.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attaches the deduplication token.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Marks the response body as not worth reading.
    #[must_use]
    pub fn skip_decode(mut self) -> Self {
        self.skip_decode = true;
        self
    }
}

/// Decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The server declared JSON and it parsed.
    Json(serde_json::Value),
    /// The server sent something other than JSON.
    Text(String),
    /// No body: a 204, or decoding was skipped.
    Empty,
}

impl ResponseBody {
    /// True when no payload was decoded.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// HTTP client for the incident API.
///
/// Owns a pooled [`reqwest::Client`], the resolved [`ClientConfig`], and the
/// injected [`Clock`] that paces retry backoff. Cloning is cheap and clones
/// share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    stream_http: reqwest::Client,
    config: ClientConfig,
    clock: Arc<dyn Clock>,
}

impl ApiClient {
    /// Creates a client that waits on the real tokio timer between retries.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Configuration`] when the HTTP client cannot be
    /// built from the supplied settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(RealClock))
    }

    /// Creates a client with an injected clock.
    ///
    /// Tests pass a [`TestClock`](statusdeck_core::TestClock) here so the
    /// full backoff schedule runs without real waiting.
    pub fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::configuration(format!("failed to build HTTP client: {e}")))?;

        // The event feed holds one response open indefinitely, so its pool
        // bounds connect time but not the request as a whole.
        let stream_http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout())
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ApiError::configuration(format!("failed to build stream HTTP client: {e}"))
            })?;

        Ok(Self { http, stream_http, config, clock })
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn stream_http(&self) -> &reqwest::Client {
        &self.stream_http
    }

    /// Executes a request, retrying transient failures on the backoff
    /// schedule.
    ///
    /// The schedule length fixes the budget: with the default six delays a
    /// request makes at most seven attempts. Waits go through the injected
    /// clock and are cooperative, so unrelated concurrent calls keep making
    /// progress while this one backs off.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when the final attempt never completed; the
    ///   message is the transport error's own text.
    /// - [`ApiError::Status`] for a terminal non-success status; the message
    ///   is the response body text, or `request failed with status <code>`
    ///   when the body was empty.
    /// - [`ApiError::Decode`] when a success response could not be read or
    ///   parsed. Decode problems are never retried.
    pub async fn execute(&self, request: ApiRequest) -> Result<ResponseBody> {
        let url = self.config.api_url(&request.path);
        let schedule = self.config.backoff_schedule();
        let max_attempts = schedule.len() + 1;

        let span = info_span!("api_request", method = %request.method, path = %request.path);
        async move {
            let started = self.clock.now();
            let mut attempt: usize = 1;
            loop {
                match self.dispatch(&url, &request).await {
                    Ok(body) => {
                        let elapsed = self.clock.now().duration_since(started);
                        debug!(attempt, elapsed_ms = elapsed.as_millis(), "request completed");
                        return Ok(body);
                    },
                    Err(error) if error.is_retryable() && attempt < max_attempts => {
                        let delay = schedule[attempt - 1];
                        debug!(
                            attempt,
                            delay_secs = delay.as_secs(),
                            category = %ErrorCategory::from(&error),
                            error = %error,
                            "attempt failed, backing off"
                        );
                        self.clock.sleep(delay).await;
                        attempt += 1;
                    },
                    Err(error) => {
                        if error.is_retryable() {
                            warn!(attempt, error = %error, "retry budget exhausted");
                        }
                        return Err(error);
                    },
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Executes a request and decodes the JSON payload into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        match self.execute(request).await? {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| ApiError::decode(format!("failed to decode response: {e}"))),
            ResponseBody::Text(_) => {
                Err(ApiError::decode("expected JSON response, got plain text"))
            },
            ResponseBody::Empty => Err(ApiError::decode("expected JSON response, got empty body")),
        }
    }

    /// Executes a request and returns the raw body text.
    ///
    /// Used for the endpoints that serve markdown rather than JSON. A JSON
    /// response is handed back in its serialized form.
    pub async fn fetch_text(&self, request: ApiRequest) -> Result<String> {
        match self.execute(request).await? {
            ResponseBody::Text(text) => Ok(text),
            ResponseBody::Json(value) => Ok(value.to_string()),
            ResponseBody::Empty => Ok(String::new()),
        }
    }

    /// Makes a single attempt and classifies the outcome.
    async fn dispatch(&self, url: &str, request: &ApiRequest) -> Result<ResponseBody> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::configuration(format!("invalid header name: {name}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ApiError::configuration(format!("invalid value for header {name}")))?;
            headers.insert(name, value);
        }

        if let Some(key) = &request.idempotency_key {
            let value = HeaderValue::from_str(key.as_str())
                .map_err(|_| ApiError::configuration("invalid idempotency key"))?;
            headers.insert(IDEMPOTENCY_KEY_HEADER, value);
        }

        let mut builder = self.http.request(request.method.clone(), url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status();
        debug!(status = status.as_u16(), "received response");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.is_empty() {
                format!("request failed with status {}", status.as_u16())
            } else {
                body
            };
            return Err(ApiError::status(status.as_u16(), message));
        }

        if request.skip_decode || status == StatusCode::NO_CONTENT {
            return Ok(ResponseBody::Empty);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::decode(format!("failed to read response body: {e}")))?;

        if content_type.contains("application/json") {
            let value = serde_json::from_str(&text)
                .map_err(|e| ApiError::decode(format!("invalid JSON response: {e}")))?;
            Ok(ResponseBody::Json(value))
        } else {
            Ok(ResponseBody::Text(text))
        }
    }
}
