//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Config;

/// Output format for snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "sensordash")]
#[command(author, version, about = "Terminal dashboard for temperature and moisture sensors", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long, env = "SENSORDASH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Readings endpoint URL (overrides config)
    #[arg(short, long, env = "SENSORDASH_URL")]
    pub url: Option<String>,

    /// Live refresh interval in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub live_interval: Option<u64>,

    /// Chart refresh interval in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    pub chart_interval: Option<u64>,

    /// Refresh once, print the dashboard and exit
    #[arg(long)]
    pub once: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(ref url) = self.url {
            config.endpoint.url = url.clone();
        }
        if let Some(secs) = self.live_interval {
            config.polling.live_interval_secs = secs;
        }
        if let Some(secs) = self.chart_interval {
            config.polling.chart_interval_secs = secs;
        }
    }
}
