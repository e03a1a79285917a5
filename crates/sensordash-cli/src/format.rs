//! Text and JSON rendering of dashboard snapshots.

use anyhow::Result;
use owo_colors::OwoColorize;
use time::OffsetDateTime;
use time::macros::format_description;

use sensordash_core::DashboardSnapshot;
use sensordash_types::{SensorKind, SensorReading};

use crate::cli::OutputFormat;

/// Placeholder shown for missing or unparseable values.
pub const NO_VALUE: &str = "--";

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Output format.
    pub format: OutputFormat,
}

impl FormatOptions {
    pub fn new(no_color: bool, format: OutputFormat) -> Self {
        Self { no_color, format }
    }

    /// Render a snapshot in the configured format.
    pub fn render(&self, snapshot: &DashboardSnapshot) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(format_snapshot_text(snapshot, self)),
            OutputFormat::Json => format_snapshot_json(snapshot),
        }
    }
}

/// Format a value with its unit. NaN renders as `--`.
#[must_use]
pub fn format_value(kind: SensorKind, value: f64) -> String {
    if value.is_nan() {
        NO_VALUE.to_string()
    } else {
        format!("{:.1} {}", value, kind.unit())
    }
}

/// Format a timestamp in its own offset.
#[must_use]
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}

/// Smallest and largest numeric value in a chart window, NaN ignored.
pub fn chart_range(window: &[SensorReading]) -> Option<(f64, f64)> {
    window
        .iter()
        .filter_map(SensorReading::checked_value)
        .fold(None, |range, v| match range {
            None => Some((v, v)),
            Some((min, max)) => Some((min.min(v), max.max(v))),
        })
}

/// Render a snapshot as human-readable text, one line per sensor kind.
pub fn format_snapshot_text(snapshot: &DashboardSnapshot, opts: &FormatOptions) -> String {
    let mut output = String::new();

    let updated = snapshot
        .last_updated
        .map(format_timestamp)
        .unwrap_or_else(|| NO_VALUE.to_string());
    output.push_str(&format!("Last updated: {}", updated));
    if snapshot.loading {
        let marker = "[loading]";
        if opts.no_color {
            output.push_str(&format!(" {}", marker));
        } else {
            output.push_str(&format!(" {}", marker.yellow()));
        }
    }
    output.push('\n');

    for kind in SensorKind::ALL {
        let latest = snapshot
            .latest(kind)
            .map(|r| format_value(kind, r.value()))
            .unwrap_or_else(|| NO_VALUE.to_string());
        let live_count = snapshot.live.get(&kind).map_or(0, Vec::len);
        let window = snapshot.chart.get(&kind).map(Vec::as_slice).unwrap_or(&[]);
        let range = match chart_range(window) {
            Some((min, max)) => format!("{:.1}..{:.1}", min, max),
            None => NO_VALUE.to_string(),
        };

        let label = format!("{:<12}", kind.as_str());
        let label = if opts.no_color {
            label
        } else {
            label.bold().to_string()
        };
        output.push_str(&format!(
            "{} {:>12}  live {:>3}  chart {:>2}  range {}\n",
            label,
            latest,
            live_count,
            window.len(),
            range
        ));
    }

    if let Some(ref error) = snapshot.error {
        let line = format!("Error: {}", error);
        if opts.no_color {
            output.push_str(&line);
        } else {
            output.push_str(&line.red().to_string());
        }
        output.push('\n');
    }

    output
}

/// Render a snapshot as pretty-printed JSON.
pub fn format_snapshot_json(snapshot: &DashboardSnapshot) -> Result<String> {
    Ok(serde_json::to_string_pretty(snapshot)? + "\n")
}
