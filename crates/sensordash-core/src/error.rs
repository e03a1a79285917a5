//! Error types for sensordash-core.
//!
//! Only whole-tick failures are represented here. A malformed field inside
//! a single reading never becomes an error; the parser in
//! `sensordash-types` degrades it to a sentinel value instead.
//!
//! | Error | Meaning |
//! |-------|---------|
//! | [`Error::Network`] | The endpoint could not be reached or the body could not be read |
//! | [`Error::HttpStatus`] | The endpoint answered with a non-success status |
//! | [`Error::Decode`] | The body was not valid JSON |
//! | [`Error::InvalidUrl`] | The configured endpoint URL is unusable |
//!
//! Aggregators catch every one of these at the tick boundary and store the
//! message as the dashboard's error state; nothing propagates past a tick.

use thiserror::Error;

/// Errors that can occur while acquiring sensor readings.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Transport-level failure reaching the endpoint.
    #[error("Endpoint not reachable at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status code.
    #[error("HTTP error {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The response body is not valid JSON.
    #[error("Invalid JSON response: {0}")]
    Decode(String),

    /// The endpoint URL is not an http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// Failure injected by a mock source.
    #[error("Mock failure: {0}")]
    Mock(String),
}

impl Error {
    /// The HTTP status code, for [`Error::HttpStatus`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias using sensordash-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display_contains_code() {
        let err = Error::HttpStatus {
            status: 500,
            reason: "Internal Server Error".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("Internal Server Error"));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_decode_display() {
        let err = Error::Decode("expected value at line 1 column 1".to_string());
        assert!(err.to_string().starts_with("Invalid JSON response"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_url_display() {
        let err = Error::InvalidUrl("ftp://example".to_string());
        assert_eq!(err.to_string(), "Invalid URL: ftp://example");
    }
}
