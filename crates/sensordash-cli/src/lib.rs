//! Terminal dashboard for the sensordash sensor feed.
//!
//! The `sensordash` binary polls a readings endpoint with two independent
//! timers and prints the dashboard after every tick.
//!
//! # Keys
//!
//! | Input | Action |
//! |-------|--------|
//! | `r` + Enter | Refresh both aggregators now |
//! | `q` + Enter | Quit |
//! | Ctrl-C | Quit |
//!
//! # Configuration
//!
//! Settings are read from `<config_dir>/sensordash/config.toml` (see
//! [`config::default_config_path`]). Command-line flags override file values.

pub mod cli;
pub mod config;
pub mod format;
