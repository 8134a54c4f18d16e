//! HTTP and live-stream client for the statusdeck incident API.
//!
//! [`ApiClient`] owns the connection pool, the retry loop, and the injected
//! [`Clock`](statusdeck_core::Clock) that paces retry backoff. The typed
//! operation surface lives in [`incidents`] and [`public_api`]; the
//! server-sent-event feed is consumed through [`EventChannel`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod incidents;
pub mod public_api;
pub mod request;
pub mod stream;

pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use request::{ApiClient, ApiRequest, IdempotencyKey, ResponseBody};
pub use stream::{EventChannel, StreamOptions};
