//! Client configuration with defaults, file, and environment overrides.

use std::time::Duration;

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use statusdeck_core::events::Audience;

const CONFIG_FILE: &str = "statusdeck.toml";
const ENV_PREFIX: &str = "STATUSDECK_";

/// Default backoff schedule between retry attempts, in seconds.
///
/// Six delays, so a request makes at most seven attempts. Tune per
/// deployment through `retry_backoff_secs`; an empty schedule disables
/// retries entirely.
pub const DEFAULT_RETRY_BACKOFF_SECS: [u64; 6] = [5, 10, 15, 20, 25, 30];

/// Configuration for the API client.
///
/// Loaded in priority order:
/// 1. Environment variables prefixed `STATUSDECK_` (highest priority)
/// 2. Configuration file (`statusdeck.toml`)
/// 3. Built-in defaults (lowest priority)
///
/// The defaults point at a local backend, so the client works out of the box
/// in development. The base URL is normalized at load time: a single trailing
/// slash is stripped so path concatenation never produces `//`.
///
/// # Example
///
/// ```no_run
/// use statusdeck_client::ClientConfig;
///
/// let config = ClientConfig::load().expect("failed to load configuration");
/// assert!(config.api_url("/incidents").ends_with("/incidents"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every relative API path is resolved against.
    ///
    /// Environment variable: `STATUSDECK_API_BASE_URL`
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request HTTP timeout in seconds.
    ///
    /// Environment variable: `STATUSDECK_REQUEST_TIMEOUT_SECS`
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Backoff delays between retry attempts, in seconds.
    ///
    /// The schedule length fixes the retry budget: a request makes at most
    /// `len + 1` attempts, waiting `retry_backoff_secs[n - 1]` seconds after
    /// failed attempt `n`.
    ///
    /// Environment variable: `STATUSDECK_RETRY_BACKOFF_SECS`
    #[serde(default = "default_retry_backoff_secs")]
    pub retry_backoff_secs: Vec<u64>,
    /// User agent sent with every request.
    ///
    /// Environment variable: `STATUSDECK_USER_AGENT`
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl ClientConfig {
    /// Loads configuration from defaults, `statusdeck.toml`, and
    /// `STATUSDECK_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX));

        let mut config: Self = figment.extract().context("failed to load configuration")?;
        config.api_base_url = normalize_base_url(config.api_base_url);
        config.validate()?;
        Ok(config)
    }

    /// Builds a config pointing at `base_url`, keeping every other default.
    ///
    /// The URL gets the same trailing-slash normalization as [`load`].
    ///
    /// [`load`]: ClientConfig::load
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self { api_base_url: normalize_base_url(base_url.into()), ..Self::default() }
    }

    /// Resolves an API path against the configured base URL.
    ///
    /// Absolute URLs (anything starting with `http`) pass through untouched.
    /// Relative paths gain a leading slash when missing, then concatenate
    /// onto the base.
    pub fn api_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            return path.to_string();
        }
        let path = path.strip_prefix('/').unwrap_or(path);
        format!("{}/{}", self.api_base_url, path)
    }

    /// URL of the live event feed for `audience`.
    pub fn stream_url(&self, audience: Audience) -> String {
        self.api_url(&format!("/stream/{audience}"))
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The backoff schedule as [`Duration`]s.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        self.retry_backoff_secs.iter().map(|secs| Duration::from_secs(*secs)).collect()
    }

    /// Total attempts a request may make: one initial try plus one retry per
    /// schedule entry.
    pub fn max_attempts(&self) -> usize {
        self.retry_backoff_secs.len() + 1
    }

    /// Validates configuration values.
    fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }

        if !self.api_base_url.starts_with("http") {
            anyhow::bail!("api_base_url must be an http(s) URL");
        }

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            retry_backoff_secs: default_retry_backoff_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Strips one trailing slash so `{base}/{path}` never doubles up.
fn normalize_base_url(url: String) -> String {
    match url.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => url,
    }
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_backoff_secs() -> Vec<u64> {
    DEFAULT_RETRY_BACKOFF_SECS.to_vec()
}

fn default_user_agent() -> String {
    "statusdeck/0.1".to_string()
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, env, sync::Mutex};

    use super::*;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    struct TestEnvGuard {
        _lock: std::sync::MutexGuard<'static, ()>,
        vars: Vec<String>,
        originals: HashMap<String, Option<String>>,
    }

    impl TestEnvGuard {
        fn new() -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            Self { _lock: lock, vars: Vec::new(), originals: HashMap::new() }
        }

        fn set_var(&mut self, key: &str, value: &str) {
            if !self.vars.contains(&key.to_string()) {
                self.originals.insert(key.to_string(), env::var(key).ok());
                self.vars.push(key.to_string());
            }
            env::set_var(key, value);
        }
    }

    impl Drop for TestEnvGuard {
        fn drop(&mut self) {
            for var in &self.vars {
                match self.originals.get(var) {
                    Some(Some(value)) => env::set_var(var, value),
                    Some(None) => env::remove_var(var),
                    None => {},
                }
            }
        }
    }

    #[test]
    fn default_config_snapshot() {
        let config = ClientConfig::default();

        assert!(config.validate().is_ok());

        insta::assert_snapshot!(config.api_base_url, @"http://127.0.0.1:8000/api");
        insta::assert_snapshot!(config.user_agent, @"statusdeck/0.1");
        let schedule: Vec<String> =
            config.retry_backoff_secs.iter().map(u64::to_string).collect();
        insta::assert_snapshot!(schedule.join(","), @"5,10,15,20,25,30");
    }

    #[test]
    fn env_overrides_and_normalization() {
        let mut guard = TestEnvGuard::new();
        guard.set_var("STATUSDECK_API_BASE_URL", "https://status.example.com/api/");
        guard.set_var("STATUSDECK_REQUEST_TIMEOUT_SECS", "10");

        let config = ClientConfig::load().expect("config should load with env overrides");

        assert_eq!(config.api_base_url, "https://status.example.com/api");
        assert_eq!(config.request_timeout_secs, 10);
        // Untouched fields keep their defaults.
        assert_eq!(config.retry_backoff_secs, vec![5, 10, 15, 20, 25, 30]);
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8000/api");
        assert_eq!(config.api_url("/incidents"), "http://127.0.0.1:8000/api/incidents");
    }

    #[test]
    fn paths_without_leading_slash_gain_one() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8000/api");
        assert_eq!(config.api_url("incidents"), "http://127.0.0.1:8000/api/incidents");
    }

    #[test]
    fn absolute_urls_pass_through() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8000/api");
        assert_eq!(config.api_url("https://example.com/custom"), "https://example.com/custom");
    }

    #[test]
    fn trailing_slash_on_base_is_stripped_once() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8000/api/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000/api");
        assert_eq!(config.api_url("/incidents"), "http://127.0.0.1:8000/api/incidents");
    }

    #[test]
    fn stream_urls_target_the_audience_feed() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:8000/api");
        assert_eq!(config.stream_url(Audience::Admin), "http://127.0.0.1:8000/api/stream/admin");
        assert_eq!(config.stream_url(Audience::Public), "http://127.0.0.1:8000/api/stream/public");
    }

    #[test]
    fn max_attempts_tracks_schedule_length() {
        let config = ClientConfig::default();
        assert_eq!(config.max_attempts(), 7);

        let short = ClientConfig { retry_backoff_secs: vec![1], ..ClientConfig::default() };
        assert_eq!(short.max_attempts(), 2);

        let none = ClientConfig { retry_backoff_secs: vec![], ..ClientConfig::default() };
        assert_eq!(none.max_attempts(), 1);
    }

    #[test]
    fn invalid_config_validation_fails() {
        let mut config = ClientConfig::default();
        config.api_base_url = String::new();
        assert!(config.validate().is_err());

        config = ClientConfig::default();
        config.api_base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config = ClientConfig::default();
        config.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
