//! Mock reading source for testing.
//!
//! This module provides a scripted source that can be used for unit testing
//! and demos without a running endpoint.
//!
//! The [`MockSource`] implements the [`ReadingSource`] trait, allowing it to
//! be used interchangeably with [`FetchClient`](crate::FetchClient).
//!
//! # Features
//!
//! - **Scripted responses**: queue batches, failures and HTTP status errors
//! - **Fallback response**: returned once the queue is exhausted
//! - **Latency simulation**: add artificial delays to simulate slow endpoints

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use sensordash_types::SensorReading;

use crate::error::{Error, Result};
use crate::traits::ReadingSource;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A successful batch.
    Readings(Vec<SensorReading>),
    /// An HTTP status failure with the given code.
    Status(u16),
    /// A generic failure with the given message.
    Failure(String),
}

impl MockResponse {
    fn into_result(self) -> Result<Vec<SensorReading>> {
        match self {
            MockResponse::Readings(readings) => Ok(readings),
            MockResponse::Status(status) => Err(Error::HttpStatus {
                status,
                reason: "Mock status".to_string(),
            }),
            MockResponse::Failure(message) => Err(Error::Mock(message)),
        }
    }
}

/// A scripted reading source.
///
/// # Example
///
/// ```
/// use sensordash_core::{MockSource, ReadingSource};
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::new();
///     source.push_failure("endpoint down").await;
///
///     assert!(source.fetch_readings().await.is_err());
///     // Queue exhausted: the fallback (an empty batch) is returned.
///     assert!(source.fetch_readings().await.unwrap().is_empty());
///     assert_eq!(source.fetch_count(), 2);
/// }
/// ```
#[derive(Debug)]
pub struct MockSource {
    queue: Mutex<VecDeque<MockResponse>>,
    fallback: RwLock<MockResponse>,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    fetch_count: AtomicU32,
}

impl MockSource {
    /// Create a mock whose fallback is an empty batch.
    pub fn new() -> Self {
        Self::with_fallback(MockResponse::Readings(Vec::new()))
    }

    /// Create a mock that always returns `readings` once its queue is empty.
    pub fn with_readings(readings: Vec<SensorReading>) -> Self {
        Self::with_fallback(MockResponse::Readings(readings))
    }

    /// Create a mock with a custom fallback response.
    pub fn with_fallback(fallback: MockResponse) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: RwLock::new(fallback),
            latency_ms: AtomicU64::new(0),
            fetch_count: AtomicU32::new(0),
        }
    }

    /// Queue a response.
    pub async fn push(&self, response: MockResponse) {
        self.queue.lock().await.push_back(response);
    }

    /// Queue a successful batch.
    pub async fn push_readings(&self, readings: Vec<SensorReading>) {
        self.push(MockResponse::Readings(readings)).await;
    }

    /// Queue an HTTP status failure.
    pub async fn push_status(&self, status: u16) {
        self.push(MockResponse::Status(status)).await;
    }

    /// Queue a generic failure.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.push(MockResponse::Failure(message.into())).await;
    }

    /// Replace the fallback response.
    pub async fn set_fallback(&self, fallback: MockResponse) {
        *self.fallback.write().await = fallback;
    }

    /// Set simulated latency for each fetch.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadingSource for MockSource {
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);

        let latency = self.latency_ms.load(Ordering::Relaxed);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }

        let queued = self.queue.lock().await.pop_front();
        match queued {
            Some(response) => response.into_result(),
            None => self.fallback.read().await.clone().into_result(),
        }
    }

    fn describe(&self) -> String {
        "mock source".to_string()
    }
}
