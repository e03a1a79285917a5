//! Shared dashboard state and the two aggregator ticks.
//!
//! A [`Dashboard`] owns:
//!
//! - the live [`HistoryStore`] (append-only, default cap 200)
//! - the chart [`HistoryStore`] (replaced wholesale, default window 50)
//! - `LastUpdated`, the current error message and the loading flag
//! - per-aggregator [`TickStats`]
//!
//! Ticks from both aggregators may run concurrently. Each history write
//! happens under its store's lock, so no per-kind update is lost; ticks
//! that finish later simply overwrite what earlier ticks wrote.
//!
//! # Example
//!
//! ```
//! use sensordash_core::{Dashboard, DashboardOptions, MockSource};
//! use sensordash_types::{SensorKind, SensorReading};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let dashboard = Dashboard::new(DashboardOptions::default());
//! let reading = SensorReading::new("temperature", 21.5, sensordash_types::now_local());
//! let source = MockSource::with_readings(vec![reading]);
//!
//! dashboard.run_live_tick(&source).await;
//! assert_eq!(dashboard.live_history(SensorKind::Temperature).await.len(), 1);
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, warn};

use sensordash_types::{SensorKind, SensorReading, now_local};

use crate::aggregate::{chart_windows, latest_per_kind};
use crate::error::Result;
use crate::events::{Aggregator, DEFAULT_EVENT_BUFFER, DashboardEvent, EventReceiver, EventSender};
use crate::history::{CHART_WINDOW, HistoryStore, LIVE_CAPACITY};
use crate::traits::ReadingSource;

/// Consecutive failures logged at `warn` before escalating once to `error`.
const WARN_FAILURE_LIMIT: u32 = 3;

/// Sizing options for a [`Dashboard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Maximum live readings kept per kind.
    pub live_capacity: usize,
    /// Chart window size per kind.
    pub chart_window: usize,
    /// Broadcast buffer for [`DashboardEvent`]s.
    pub event_buffer: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            live_capacity: LIVE_CAPACITY,
            chart_window: CHART_WINDOW,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

/// Tick statistics for one aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickStats {
    /// Total successful ticks.
    pub success_count: u64,
    /// Total failed ticks.
    pub failure_count: u64,
    /// Failures since the last success.
    pub consecutive_failures: u32,
    /// Time of the last successful tick.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_success_at: Option<OffsetDateTime>,
    /// Time of the last failed tick.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_error_at: Option<OffsetDateTime>,
    /// Last error message.
    pub last_error: Option<String>,
}

impl TickStats {
    fn record_success(&mut self, at: OffsetDateTime) {
        self.success_count += 1;
        self.consecutive_failures = 0;
        self.last_success_at = Some(at);
    }

    fn record_failure(&mut self, at: OffsetDateTime, message: &str) {
        self.failure_count += 1;
        self.consecutive_failures += 1;
        self.last_error_at = Some(at);
        self.last_error = Some(message.to_string());
    }
}

/// Marks one tick as in flight for as long as it is alive.
///
/// Dropping the guard, including when a tick future is cancelled mid-fetch,
/// clears the tick from [`Dashboard::is_loading`].
#[must_use = "the tick stops counting as in flight when the guard is dropped"]
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Point-in-time copy of everything the presentation layer reads.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Live history per kind, oldest first.
    pub live: BTreeMap<SensorKind, Vec<SensorReading>>,
    /// Chart window per kind, ascending by time.
    pub chart: BTreeMap<SensorKind, Vec<SensorReading>>,
    /// `LastUpdated`.
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_updated: Option<OffsetDateTime>,
    /// Current error message.
    pub error: Option<String>,
    /// Whether any tick is in flight.
    pub loading: bool,
    /// Live aggregator statistics.
    pub live_stats: TickStats,
    /// Chart aggregator statistics.
    pub chart_stats: TickStats,
}

impl DashboardSnapshot {
    /// The newest live reading for a kind.
    pub fn latest(&self, kind: SensorKind) -> Option<&SensorReading> {
        self.live.get(&kind).and_then(|readings| readings.last())
    }
}

/// Shared dashboard state.
pub struct Dashboard {
    live: RwLock<HistoryStore>,
    chart: RwLock<HistoryStore>,
    last_updated: RwLock<Option<OffsetDateTime>>,
    error: RwLock<Option<String>>,
    in_flight: Arc<AtomicUsize>,
    live_stats: RwLock<TickStats>,
    chart_stats: RwLock<TickStats>,
    events_tx: EventSender,
    options: DashboardOptions,
}

impl Dashboard {
    /// Create an empty dashboard.
    pub fn new(options: DashboardOptions) -> Arc<Self> {
        let (events_tx, _) = broadcast::channel(options.event_buffer.max(1));
        Arc::new(Self {
            live: RwLock::new(HistoryStore::new(options.live_capacity)),
            chart: RwLock::new(HistoryStore::new(options.chart_window)),
            last_updated: RwLock::new(None),
            error: RwLock::new(None),
            in_flight: Arc::new(AtomicUsize::new(0)),
            live_stats: RwLock::new(TickStats::default()),
            chart_stats: RwLock::new(TickStats::default()),
            events_tx,
            options,
        })
    }

    /// The options this dashboard was created with.
    pub fn options(&self) -> DashboardOptions {
        self.options
    }

    /// Subscribe to tick events.
    pub fn subscribe(&self) -> EventReceiver {
        self.events_tx.subscribe()
    }

    // --- Reads ---

    /// Live readings for a kind, oldest first.
    pub async fn live_history(&self, kind: SensorKind) -> Vec<SensorReading> {
        self.live.read().await.to_vec(kind)
    }

    /// Chart window for a kind, ascending by time.
    pub async fn chart_history(&self, kind: SensorKind) -> Vec<SensorReading> {
        self.chart.read().await.to_vec(kind)
    }

    /// `LastUpdated`, if any tick has set it.
    pub async fn last_updated(&self) -> Option<OffsetDateTime> {
        *self.last_updated.read().await
    }

    /// The current error message.
    pub async fn error(&self) -> Option<String> {
        self.error.read().await.clone()
    }

    /// Whether any tick is in flight.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Statistics for one aggregator.
    pub async fn stats(&self, aggregator: Aggregator) -> TickStats {
        self.stats_lock(aggregator).read().await.clone()
    }

    /// Copy the whole state.
    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            live: self.live.read().await.to_map(),
            chart: self.chart.read().await.to_map(),
            last_updated: self.last_updated().await,
            error: self.error().await,
            loading: self.is_loading(),
            live_stats: self.stats(Aggregator::Live).await,
            chart_stats: self.stats(Aggregator::Chart).await,
        }
    }

    // --- Ticks ---

    /// Run one live tick: fetch, keep the latest reading per kind, append.
    pub async fn run_live_tick(&self, source: &dyn ReadingSource) {
        self.run_tick(Aggregator::Live, source).await;
    }

    /// Run one chart tick: fetch, window per kind, replace.
    pub async fn run_chart_tick(&self, source: &dyn ReadingSource) {
        self.run_tick(Aggregator::Chart, source).await;
    }

    /// Run one tick of the given aggregator.
    pub async fn run_tick(&self, aggregator: Aggregator, source: &dyn ReadingSource) {
        let guard = self.begin_tick();
        let result = source.fetch_readings().await;
        self.finish_tick(guard, aggregator, result).await;
    }

    /// Mark a tick as in flight until the returned guard is dropped.
    pub fn begin_tick(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Apply the outcome of a fetch started with [`begin_tick`](Self::begin_tick).
    pub async fn finish_tick(
        &self,
        guard: InFlightGuard,
        aggregator: Aggregator,
        result: Result<Vec<SensorReading>>,
    ) {
        match result {
            Ok(readings) => match aggregator {
                Aggregator::Live => self.apply_live(&readings).await,
                Aggregator::Chart => self.apply_chart(&readings).await,
            },
            Err(e) => self.record_failure(aggregator, e.to_string()).await,
        }
        drop(guard);
    }

    async fn apply_live(&self, readings: &[SensorReading]) {
        let latest = latest_per_kind(readings);

        {
            let mut live = self.live.write().await;
            for (kind, reading) in &latest {
                let evicted = live.push(*kind, reading.clone());
                if evicted > 0 {
                    debug!("Evicted {} live {} reading(s)", evicted, kind);
                }
            }
        }

        let newest = latest.values().map(SensorReading::observed_at).max();
        let last_updated = {
            let mut last_updated = self.last_updated.write().await;
            if newest.is_some() {
                *last_updated = newest;
            }
            *last_updated
        };

        let kinds: Vec<SensorKind> = latest.into_keys().collect();
        debug!(
            "Live tick: {} reading(s) in batch, updated {:?}",
            readings.len(),
            kinds
        );
        self.record_success(Aggregator::Live).await;
        let _ = self.events_tx.send(DashboardEvent::LiveUpdated {
            kinds,
            last_updated,
        });
    }

    async fn apply_chart(&self, readings: &[SensorReading]) {
        let windows = chart_windows(readings, self.options.chart_window);
        let kinds: Vec<SensorKind> = windows.keys().copied().collect();

        {
            let mut chart = self.chart.write().await;
            // Kinds absent from the batch keep their previous window.
            for (kind, window) in windows {
                chart.replace(kind, window);
            }
        }

        let now = now_local();
        *self.last_updated.write().await = Some(now);

        debug!(
            "Chart tick: {} reading(s) in batch, populated {:?}",
            readings.len(),
            kinds
        );
        self.record_success(Aggregator::Chart).await;
        let _ = self.events_tx.send(DashboardEvent::ChartUpdated {
            kinds,
            last_updated: Some(now),
        });
    }

    async fn record_success(&self, aggregator: Aggregator) {
        *self.error.write().await = None;

        let mut stats = self.stats_lock(aggregator).write().await;
        if stats.consecutive_failures > WARN_FAILURE_LIMIT {
            warn!(
                "{} tick recovered after {} failures",
                aggregator, stats.consecutive_failures
            );
        }
        stats.record_success(now_local());
    }

    async fn record_failure(&self, aggregator: Aggregator, message: String) {
        *self.error.write().await = Some(message.clone());

        let failures = {
            let mut stats = self.stats_lock(aggregator).write().await;
            stats.record_failure(now_local(), &message);
            stats.consecutive_failures
        };

        if failures <= WARN_FAILURE_LIMIT {
            warn!("{} tick failed: {} (attempt {})", aggregator, message, failures);
        } else if failures == WARN_FAILURE_LIMIT + 1 {
            error!(
                "{} tick failed {} times in a row, will continue trying silently",
                aggregator, failures
            );
        } else {
            debug!("{} tick failed: {}", aggregator, message);
        }

        let _ = self.events_tx.send(DashboardEvent::TickFailed {
            aggregator,
            message,
        });
    }

    fn stats_lock(&self, aggregator: Aggregator) -> &RwLock<TickStats> {
        match aggregator {
            Aggregator::Live => &self.live_stats,
            Aggregator::Chart => &self.chart_stats,
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("options", &self.options)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish()
    }
}
