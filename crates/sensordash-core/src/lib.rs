//! Data acquisition and history management for the sensordash IoT dashboard.
//!
//! This crate polls a remote HTTP endpoint for temperature and moisture
//! readings and shapes them into two bounded histories that a presentation
//! layer can render.
//!
//! # Features
//!
//! - **Fetch client**: one `GET` per tick, classified errors
//! - **Live tracking**: most recent reading per kind appended to a FIFO history (cap 200)
//! - **Chart window**: the latest 50 readings per kind, replaced on every refresh
//! - **Scheduling**: two independent timers plus on-demand refresh
//! - **Events**: broadcast notifications after every tick
//!
//! # Pipeline
//!
//! | Component | Cadence | Policy |
//! |-----------|---------|--------|
//! | Live aggregator | 5 s | latest per kind, append, evict oldest |
//! | Chart aggregator | 10 s | group, sort, keep last 50, replace |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sensordash_core::{Dashboard, DashboardOptions, FetchClient, Scheduler, SchedulerOptions};
//! use sensordash_types::SensorKind;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::new(DashboardOptions::default());
//!     let client = Arc::new(FetchClient::new("http://localhost:8080/api/readings")?);
//!
//!     let mut scheduler = Scheduler::new(Arc::clone(&dashboard), client, SchedulerOptions::default());
//!     scheduler.start();
//!
//!     let mut events = dashboard.subscribe();
//!     while events.recv().await.is_ok() {
//!         let snapshot = dashboard.snapshot().await;
//!         if let Some(reading) = snapshot.latest(SensorKind::Temperature) {
//!             println!("Temperature: {} {}", reading.value(), SensorKind::Temperature.unit());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod client;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod history;
pub mod mock;
pub mod scheduler;
pub mod traits;

pub use aggregate::{chart_windows, latest_per_kind};
pub use client::FetchClient;
pub use dashboard::{Dashboard, DashboardOptions, DashboardSnapshot, InFlightGuard, TickStats};
pub use error::{Error, Result};
pub use events::{Aggregator, DashboardEvent, EventReceiver, EventSender};
pub use history::{CHART_WINDOW, HistoryStore, LIVE_CAPACITY};
pub use mock::{MockResponse, MockSource};
pub use scheduler::{Scheduler, SchedulerOptions};
pub use traits::ReadingSource;

// Re-export from sensordash-types
pub use sensordash_types::{SensorKind, SensorReading};
