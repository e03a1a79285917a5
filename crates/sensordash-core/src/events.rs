//! Dashboard event notifications.
//!
//! Every completed tick broadcasts one [`DashboardEvent`]. Presentation
//! layers subscribe with [`Dashboard::subscribe`](crate::Dashboard::subscribe)
//! and re-read the snapshot when an event arrives.
//!
//! The channel never blocks senders. A subscriber that falls behind by more
//! than the buffer size receives `RecvError::Lagged` and misses the oldest
//! events.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;

use sensordash_types::SensorKind;

/// Which aggregator a tick belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    /// Append-only live tracking.
    Live,
    /// Replace-on-refresh chart window.
    Chart,
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Live => write!(f, "live"),
            Aggregator::Chart => write!(f, "chart"),
        }
    }
}

/// Events emitted by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// A live tick appended readings.
    LiveUpdated {
        /// Kinds that received a reading.
        kinds: Vec<SensorKind>,
        /// `LastUpdated` after the tick.
        #[serde(with = "time::serde::rfc3339::option")]
        last_updated: Option<OffsetDateTime>,
    },
    /// A chart tick replaced the chart window.
    ChartUpdated {
        /// Kinds present in the batch; their windows were replaced.
        kinds: Vec<SensorKind>,
        /// `LastUpdated` after the tick.
        #[serde(with = "time::serde::rfc3339::option")]
        last_updated: Option<OffsetDateTime>,
    },
    /// A tick failed; the message is now the dashboard's error state.
    TickFailed {
        aggregator: Aggregator,
        message: String,
    },
}

impl DashboardEvent {
    /// The aggregator that produced this event.
    pub fn aggregator(&self) -> Aggregator {
        match self {
            DashboardEvent::LiveUpdated { .. } => Aggregator::Live,
            DashboardEvent::ChartUpdated { .. } => Aggregator::Chart,
            DashboardEvent::TickFailed { aggregator, .. } => *aggregator,
        }
    }

    /// Whether this event reports a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, DashboardEvent::TickFailed { .. })
    }
}

/// Sender for dashboard events.
pub type EventSender = broadcast::Sender<DashboardEvent>;
/// Receiver for dashboard events.
pub type EventReceiver = broadcast::Receiver<DashboardEvent>;

/// Default event buffer size.
pub const DEFAULT_EVENT_BUFFER: usize = 64;
