//! Trait abstraction over reading sources.
//!
//! This module provides the [`ReadingSource`] trait that abstracts over the
//! HTTP endpoint client and mock sources used for testing.

use std::sync::Arc;

use async_trait::async_trait;

use sensordash_types::SensorReading;

use crate::error::Result;

/// Anything that can produce one batch of readings per call.
///
/// # Example
///
/// ```ignore
/// use sensordash_core::{ReadingSource, Result};
///
/// async fn count<S: ReadingSource>(source: &S) -> Result<usize> {
///     Ok(source.fetch_readings().await?.len())
/// }
/// ```
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Fetch one batch of readings.
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>>;

    /// Short human-readable description used in log messages.
    fn describe(&self) -> String {
        "reading source".to_string()
    }
}

#[async_trait]
impl<S: ReadingSource + ?Sized> ReadingSource for Arc<S> {
    async fn fetch_readings(&self) -> Result<Vec<SensorReading>> {
        (**self).fetch_readings().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
