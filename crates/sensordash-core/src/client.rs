//! HTTP client for the remote readings endpoint.
//!
//! One call to [`FetchClient::fetch_readings`] is one `GET` round-trip. The
//! endpoint is expected to answer with a JSON array of
//! `{label, value, timestamp}` objects.
//!
//! # Example
//!
//! ```no_run
//! use sensordash_core::FetchClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = FetchClient::new("http://localhost:8080/api/readings")?;
//!
//! for reading in client.fetch_readings().await? {
//!     println!("{}: {}", reading.kind(), reading.value());
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

use sensordash_types::SensorReading;

use crate::error::{Error, Result};
use crate::traits::ReadingSource;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the readings endpoint.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    url: String,
}

impl FetchClient {
    /// Create a new client with the default timeout.
    ///
    /// # Arguments
    ///
    /// * `url` - The full endpoint URL (e.g., "http://localhost:8080/api/readings")
    pub fn new(url: &str) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a new client with a custom request timeout.
    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        let url = validate_url(url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(url: &str, client: Client) -> Result<Self> {
        let url = validate_url(url)?;
        Ok(Self { client, url })
    }

    /// Get the endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current batch of readings.
    ///
    /// Any status other than `200 OK` is an [`Error::HttpStatus`].
    /// A non-array body yields an empty batch. Array elements that are not
    /// objects are skipped.
    pub async fn fetch_readings(&self) -> Result<Vec<SensorReading>> {
        let response = self
            .client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.network_error(e))?;
        parse_body(&body)
    }

    fn network_error(&self, source: reqwest::Error) -> Error {
        Error::Network {
            url: self.url.clone(),
            source,
        }
    }
}

#[async_trait]
impl ReadingSource for FetchClient {
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>> {
        FetchClient::fetch_readings(self).await
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Decode a response body into readings.
///
/// ```
/// use sensordash_core::client::parse_body;
///
/// let readings = parse_body(br#"[{"label":"Moisture","value":42}]"#).unwrap();
/// assert_eq!(readings.len(), 1);
///
/// // Anything other than an array is an empty batch, not an error.
/// assert!(parse_body(br#"{"label":"Moisture"}"#).unwrap().is_empty());
/// ```
pub fn parse_body(body: &[u8]) -> Result<Vec<SensorReading>> {
    let value: Value = serde_json::from_slice(body).map_err(|e| Error::Decode(e.to_string()))?;

    let Value::Array(items) = value else {
        debug!("Response body is not an array, treating as empty batch");
        return Ok(Vec::new());
    };

    let total = items.len();
    let readings: Vec<SensorReading> = items
        .iter()
        .filter_map(Value::as_object)
        .map(SensorReading::from_record)
        .collect();

    if readings.len() < total {
        debug!(
            "Skipped {} non-object element(s) in response",
            total - readings.len()
        );
    }

    Ok(readings)
}

fn validate_url(url: &str) -> Result<String> {
    let url = url.trim();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::InvalidUrl(format!(
            "URL must start with http:// or https://, got: {}",
            url
        )));
    }
    Ok(url.to_string())
}
