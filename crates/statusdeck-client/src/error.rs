//! Error types for incident API calls.
//!
//! Failures fall into four classes: transport problems that kept the request
//! from completing, non-success HTTP statuses, payload decode problems, and
//! client misconfiguration. The retry loop only ever re-runs the first class
//! and the small set of transient statuses in [`RETRYABLE_STATUS_CODES`].

use std::fmt;

use thiserror::Error;

/// Result type alias for API client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// HTTP statuses that signal transient server unavailability.
///
/// Only these are retried; any other non-success status is terminal on the
/// first response.
pub const RETRYABLE_STATUS_CODES: [u16; 3] = [502, 503, 504];

/// Error type for incident API operations.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The request never completed: DNS, connect, TLS, or timeout failure.
    ///
    /// The message is the transport error's own text, passed through
    /// unchanged so callers see exactly what the network layer reported.
    #[error("{message}")]
    Transport {
        /// Error message from the transport layer.
        message: String,
    },

    /// The server answered with a non-success status.
    ///
    /// The message is the response body text when the server sent one, or a
    /// generic `request failed with status <code>` fallback when the body
    /// was empty.
    #[error("{message}")]
    Status {
        /// HTTP status code of the response.
        status: u16,
        /// Response body text, or the generic fallback.
        message: String,
    },

    /// A response arrived but its payload could not be decoded, or a request
    /// body could not be encoded.
    #[error("{message}")]
    Decode {
        /// Description of the codec failure.
        message: String,
    },

    /// The client itself could not be assembled from its configuration.
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl ApiError {
    /// Creates a transport error from the underlying error's message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    /// Creates a status error from an HTTP response.
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status { status, message: message.into() }
    }

    /// Creates a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// True for transport failures and for the statuses in
    /// [`RETRYABLE_STATUS_CODES`]; every other error is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => RETRYABLE_STATUS_CODES.contains(status),
            Self::Decode { .. } | Self::Configuration { .. } => false,
        }
    }

    /// The HTTP status code, when the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Coarse error class used as a structured log field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request never completed.
    Transport,
    /// The server answered with a non-success status.
    Http,
    /// Payload could not be encoded or decoded.
    Decode,
    /// Client misconfiguration.
    Configuration,
}

impl From<&ApiError> for ErrorCategory {
    fn from(error: &ApiError) -> Self {
        match error {
            ApiError::Transport { .. } => Self::Transport,
            ApiError::Status { .. } => Self::Http,
            ApiError::Decode { .. } => Self::Decode,
            ApiError::Configuration { .. } => Self::Configuration,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Http => write!(f, "http"),
            Self::Decode => write!(f, "decode"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_gateway_statuses_are_retryable() {
        assert!(ApiError::transport("connection refused").is_retryable());
        assert!(ApiError::status(502, "bad gateway").is_retryable());
        assert!(ApiError::status(503, "unavailable").is_retryable());
        assert!(ApiError::status(504, "gateway timeout").is_retryable());
    }

    #[test]
    fn other_failures_are_terminal() {
        assert!(!ApiError::status(400, "bad request").is_retryable());
        assert!(!ApiError::status(404, "not found").is_retryable());
        assert!(!ApiError::status(500, "boom").is_retryable());
        assert!(!ApiError::decode("unexpected token").is_retryable());
        assert!(!ApiError::configuration("bad header").is_retryable());
    }

    #[test]
    fn transport_message_passes_through_unchanged() {
        let error = ApiError::transport("dns error: no such host");
        assert_eq!(error.to_string(), "dns error: no such host");
    }

    #[test]
    fn status_message_is_the_body_text() {
        let error = ApiError::status(403, "forbidden: audit access requires admin");
        assert_eq!(error.to_string(), "forbidden: audit access requires admin");
        assert_eq!(error.status_code(), Some(403));
    }

    #[test]
    fn categories_map_to_log_field_names() {
        assert_eq!(ErrorCategory::from(&ApiError::transport("x")).to_string(), "transport");
        assert_eq!(ErrorCategory::from(&ApiError::status(500, "x")).to_string(), "http");
        assert_eq!(ErrorCategory::from(&ApiError::decode("x")).to_string(), "decode");
    }
}
