//! Periodic scheduling of the live and chart aggregators.
//!
//! The [`Scheduler`] owns two independent repeating timers. Each timer tick
//! spawns a detached tick task, so a slow fetch never delays the next tick
//! and ticks of the same aggregator may overlap.
//!
//! Tick tasks hold only a weak reference to the [`Dashboard`] while the
//! fetch is in flight. If the dashboard has been dropped by the time the
//! fetch completes, the result is discarded.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sensordash_core::{Dashboard, DashboardOptions, FetchClient, Scheduler, SchedulerOptions};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dashboard = Dashboard::new(DashboardOptions::default());
//! let client = Arc::new(FetchClient::new("http://localhost:8080/api/readings")?);
//!
//! let mut scheduler = Scheduler::new(Arc::clone(&dashboard), client, SchedulerOptions::default());
//! scheduler.start();
//!
//! // Manual refresh, independent of timer phase.
//! scheduler.refresh_now().await;
//!
//! scheduler.stop();
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::dashboard::Dashboard;
use crate::events::Aggregator;
use crate::traits::ReadingSource;

/// Default live cadence.
pub const DEFAULT_LIVE_INTERVAL: Duration = Duration::from_secs(5);
/// Default chart cadence.
pub const DEFAULT_CHART_INTERVAL: Duration = Duration::from_secs(10);

/// Timer cadences for a [`Scheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    /// Period of the live aggregator timer.
    pub live_interval: Duration,
    /// Period of the chart aggregator timer.
    pub chart_interval: Duration,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            live_interval: DEFAULT_LIVE_INTERVAL,
            chart_interval: DEFAULT_CHART_INTERVAL,
        }
    }
}

impl SchedulerOptions {
    /// The timer period for an aggregator.
    pub fn interval_for(&self, aggregator: Aggregator) -> Duration {
        match aggregator {
            Aggregator::Live => self.live_interval,
            Aggregator::Chart => self.chart_interval,
        }
    }
}

/// Drives both aggregators on their own timers.
pub struct Scheduler {
    dashboard: Arc<Dashboard>,
    source: Arc<dyn ReadingSource>,
    options: SchedulerOptions,
    cancel_token: Option<CancellationToken>,
    timers: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Create a stopped scheduler.
    pub fn new(
        dashboard: Arc<Dashboard>,
        source: Arc<dyn ReadingSource>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            dashboard,
            source,
            options,
            cancel_token: None,
            timers: Vec::new(),
        }
    }

    /// The dashboard this scheduler writes to.
    pub fn dashboard(&self) -> &Arc<Dashboard> {
        &self.dashboard
    }

    /// The configured cadences.
    pub fn options(&self) -> SchedulerOptions {
        self.options
    }

    /// Whether the timers are running.
    pub fn is_running(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Start both timers. The first tick of each fires immediately.
    ///
    /// Calling `start` on a running scheduler is a no-op.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Scheduler already running");
            return;
        }

        info!(
            "Starting scheduler for {} (live every {:?}, chart every {:?})",
            self.source.describe(),
            self.options.live_interval,
            self.options.chart_interval
        );

        let token = CancellationToken::new();
        self.timers = [Aggregator::Live, Aggregator::Chart]
            .into_iter()
            .map(|aggregator| self.spawn_timer(aggregator, token.clone()))
            .collect();
        self.cancel_token = Some(token);
    }

    /// Cancel both timers.
    ///
    /// Ticks already in flight run to completion.
    pub fn stop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            info!("Stopping scheduler");
            token.cancel();
        }
        self.timers.clear();
    }

    /// Run a live tick and a chart tick concurrently and wait for both.
    pub async fn refresh_now(&self) {
        debug!("Manual refresh");
        let source = self.source.as_ref();
        tokio::join!(
            self.dashboard.run_live_tick(source),
            self.dashboard.run_chart_tick(source)
        );
    }

    /// Spawn a live tick and a chart tick without waiting for them.
    pub fn trigger_refresh(&self) -> [JoinHandle<()>; 2] {
        debug!("Manual refresh triggered");
        [Aggregator::Live, Aggregator::Chart].map(|aggregator| {
            tokio::spawn(run_tick(
                Arc::downgrade(&self.dashboard),
                Arc::clone(&self.source),
                aggregator,
            ))
        })
    }

    fn spawn_timer(&self, aggregator: Aggregator, token: CancellationToken) -> JoinHandle<()> {
        let dashboard = Arc::downgrade(&self.dashboard);
        let source = Arc::clone(&self.source);
        let period = self.options.interval_for(aggregator);

        tokio::spawn(async move {
            let mut timer = interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("{} timer cancelled", aggregator);
                        break;
                    }
                    _ = timer.tick() => {
                        tokio::spawn(run_tick(dashboard.clone(), Arc::clone(&source), aggregator));
                    }
                }
            }
        })
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("source", &self.source.describe())
            .field("options", &self.options)
            .field("running", &self.is_running())
            .finish()
    }
}

async fn run_tick(
    dashboard: Weak<Dashboard>,
    source: Arc<dyn ReadingSource>,
    aggregator: Aggregator,
) {
    let guard = match dashboard.upgrade() {
        Some(dashboard) => dashboard.begin_tick(),
        None => return,
    };

    let result = source.fetch_readings().await;

    match dashboard.upgrade() {
        Some(dashboard) => dashboard.finish_tick(guard, aggregator, result).await,
        None => debug!("Dashboard dropped, discarding {} tick result", aggregator),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardOptions;
    use crate::mock::MockSource;
    use sensordash_types::{SensorKind, SensorReading};
    use time::macros::datetime;

    fn reading(label: &str, value: f64) -> SensorReading {
        SensorReading::new(label, value, datetime!(2025-01-01 10:00:00 UTC))
    }

    fn scheduler_with(source: Arc<MockSource>) -> Scheduler {
        let dashboard = Dashboard::new(DashboardOptions::default());
        Scheduler::new(dashboard, source, SchedulerOptions::default())
    }

    /// Let spawned tasks make progress under a paused clock.
    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[test]
    fn test_default_options() {
        let options = SchedulerOptions::default();
        assert_eq!(options.live_interval, Duration::from_secs(5));
        assert_eq!(options.chart_interval, Duration::from_secs(10));
        assert_eq!(options.interval_for(Aggregator::Chart), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_ticks_fire_immediately() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Temperature", 1.0)]));
        let mut scheduler = scheduler_with(Arc::clone(&source));

        scheduler.start();
        settle().await;

        assert_eq!(source.fetch_count(), 2);
        let dashboard = scheduler.dashboard();
        assert_eq!(dashboard.live_history(SensorKind::Temperature).await.len(), 1);
        assert_eq!(dashboard.chart_history(SensorKind::Temperature).await.len(), 1);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_follow_their_cadence() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Moisture", 1.0)]));
        let mut scheduler = scheduler_with(Arc::clone(&source));

        scheduler.start();
        settle().await;
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;

        // Live: t=0, 5, 10. Chart: t=0, 10.
        assert_eq!(source.fetch_count(), 5);
        let live = scheduler.dashboard().live_history(SensorKind::Moisture).await;
        assert_eq!(live.len(), 3);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_timers() {
        let source = Arc::new(MockSource::new());
        let mut scheduler = scheduler_with(Arc::clone(&source));

        scheduler.start();
        assert!(scheduler.is_running());
        settle().await;
        scheduler.stop();
        assert!(!scheduler.is_running());
        settle().await;

        let count = source.fetch_count();
        tokio::time::advance(Duration::from_secs(60)).await;
        settle().await;
        assert_eq!(source.fetch_count(), count);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_is_noop() {
        let source = Arc::new(MockSource::new());
        let mut scheduler = scheduler_with(Arc::clone(&source));

        scheduler.start();
        scheduler.start();
        settle().await;

        assert_eq!(source.fetch_count(), 2);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ticks_overlap() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Temperature", 1.0)]));
        source.set_latency(Duration::from_secs(12));
        let mut scheduler = scheduler_with(Arc::clone(&source));

        scheduler.start();
        settle().await;
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;

        // The t=0 fetches are still in flight when the t=5 live tick starts.
        assert_eq!(source.fetch_count(), 3);
        assert!(scheduler.dashboard().is_loading());
        scheduler.stop();
    }

    #[tokio::test]
    async fn test_refresh_now_runs_both_ticks() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Temperature", 4.0)]));
        let scheduler = scheduler_with(Arc::clone(&source));

        scheduler.refresh_now().await;

        assert_eq!(source.fetch_count(), 2);
        let dashboard = scheduler.dashboard();
        assert_eq!(dashboard.live_history(SensorKind::Temperature).await.len(), 1);
        assert_eq!(dashboard.chart_history(SensorKind::Temperature).await.len(), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_refresh_clears_loading() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Temperature", 4.0)]));
        source.set_latency(Duration::from_secs(10));
        let scheduler = scheduler_with(Arc::clone(&source));

        let result = tokio::time::timeout(Duration::from_secs(1), scheduler.refresh_now()).await;

        assert!(result.is_err());
        assert_eq!(source.fetch_count(), 2);
        assert!(!scheduler.dashboard().is_loading());
    }

    #[tokio::test]
    async fn test_trigger_refresh_spawns_ticks() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Moisture", 4.0)]));
        let scheduler = scheduler_with(Arc::clone(&source));

        for handle in scheduler.trigger_refresh() {
            handle.await.unwrap();
        }

        assert_eq!(source.fetch_count(), 2);
        assert!(!scheduler.dashboard().is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_tick_discarded_after_dashboard_dropped() {
        let source = Arc::new(MockSource::with_readings(vec![reading("Moisture", 4.0)]));
        source.set_latency(Duration::from_secs(3));
        let dashboard = Dashboard::new(DashboardOptions::default());
        let weak = Arc::downgrade(&dashboard);

        let task = tokio::spawn(run_tick(
            Arc::downgrade(&dashboard),
            source.clone() as Arc<dyn ReadingSource>,
            Aggregator::Live,
        ));
        settle().await;
        drop(dashboard);

        tokio::time::advance(Duration::from_secs(3)).await;
        task.await.unwrap();

        assert!(weak.upgrade().is_none());
        assert_eq!(source.fetch_count(), 1);
    }
}
