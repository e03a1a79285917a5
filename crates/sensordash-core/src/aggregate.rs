//! Batch shaping for the live and chart aggregators.
//!
//! Both functions only consider readings whose label matches a tracked
//! [`SensorKind`] (case-insensitively); everything else is dropped.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use sensordash_types::{SensorKind, SensorReading};

/// Keep the most recent reading per tracked kind.
///
/// A later `observed_at` strictly wins; on a tie the first reading seen is
/// kept.
pub fn latest_per_kind(readings: &[SensorReading]) -> BTreeMap<SensorKind, SensorReading> {
    let mut latest: BTreeMap<SensorKind, SensorReading> = BTreeMap::new();

    for reading in readings {
        let Some(kind) = reading.sensor_kind() else {
            continue;
        };
        match latest.entry(kind) {
            Entry::Vacant(slot) => {
                slot.insert(reading.clone());
            }
            Entry::Occupied(mut slot) => {
                if reading.observed_at() > slot.get().observed_at() {
                    slot.insert(reading.clone());
                }
            }
        }
    }

    latest
}

/// Group readings by tracked kind, sorted ascending by time, keeping the
/// most recent `window` entries of each group.
///
/// Only kinds that occur in the batch appear in the result, so every
/// window is non-empty. Readings with equal timestamps keep their batch
/// order.
pub fn chart_windows(
    readings: &[SensorReading],
    window: usize,
) -> BTreeMap<SensorKind, Vec<SensorReading>> {
    let mut groups: BTreeMap<SensorKind, Vec<SensorReading>> = BTreeMap::new();

    for reading in readings {
        if let Some(kind) = reading.sensor_kind() {
            groups.entry(kind).or_default().push(reading.clone());
        }
    }

    for group in groups.values_mut() {
        group.sort_by_key(SensorReading::observed_at);
        let excess = group.len().saturating_sub(window);
        group.drain(..excess);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn reading(label: &str, value: f64, seconds: i64) -> SensorReading {
        let at = datetime!(2025-01-01 10:00:00 UTC) + time::Duration::seconds(seconds);
        SensorReading::new(label, value, at)
    }

    #[test]
    fn test_latest_keeps_later_reading() {
        let batch = vec![
            reading("temperature", 1.0, 0),
            reading("Temperature", 2.0, 10),
            reading("TEMPERATURE", 3.0, 5),
        ];
        let latest = latest_per_kind(&batch);

        assert_eq!(latest.len(), 1);
        assert_eq!(latest[&SensorKind::Temperature].value(), 2.0);
    }

    #[test]
    fn test_latest_tie_keeps_first_seen() {
        let batch = vec![reading("Moisture", 1.0, 3), reading("Moisture", 2.0, 3)];
        let latest = latest_per_kind(&batch);
        assert_eq!(latest[&SensorKind::Moisture].value(), 1.0);
    }

    #[test]
    fn test_latest_drops_untracked_kinds() {
        let batch = vec![reading("Humidity", 50.0, 0), reading("-", 1.0, 0)];
        assert!(latest_per_kind(&batch).is_empty());
    }

    #[test]
    fn test_latest_per_kind_is_independent() {
        let batch = vec![
            reading("Temperature", 20.0, 1),
            reading("Moisture", 40.0, 9),
            reading("Moisture", 41.0, 2),
        ];
        let latest = latest_per_kind(&batch);
        assert_eq!(latest[&SensorKind::Temperature].value(), 20.0);
        assert_eq!(latest[&SensorKind::Moisture].value(), 40.0);
    }

    #[test]
    fn test_chart_windows_sorts_ascending() {
        let batch = vec![
            reading("Temperature", 3.0, 30),
            reading("Temperature", 1.0, 10),
            reading("Temperature", 2.0, 20),
        ];
        let windows = chart_windows(&batch, 50);
        let values: Vec<f64> = windows[&SensorKind::Temperature]
            .iter()
            .map(SensorReading::value)
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_chart_windows_truncates_to_most_recent() {
        // 60 readings delivered newest-first.
        let batch: Vec<SensorReading> = (0..60)
            .rev()
            .map(|i| reading("Moisture", i as f64, i))
            .collect();
        let windows = chart_windows(&batch, 50);
        let window = &windows[&SensorKind::Moisture];

        assert_eq!(window.len(), 50);
        assert_eq!(window.first().unwrap().value(), 10.0);
        assert_eq!(window.last().unwrap().value(), 59.0);
        assert!(
            window
                .windows(2)
                .all(|pair| pair[0].observed_at() <= pair[1].observed_at())
        );
    }

    #[test]
    fn test_chart_windows_only_present_kinds() {
        let windows = chart_windows(&[reading("Temperature", 1.0, 0)], 50);
        assert_eq!(windows.len(), 1);
        assert!(!windows.contains_key(&SensorKind::Moisture));

        assert!(chart_windows(&[], 50).is_empty());
        assert!(chart_windows(&[reading("Humidity", 1.0, 0)], 50).is_empty());
    }

    #[test]
    fn test_chart_windows_stable_for_equal_times() {
        let batch = vec![reading("Moisture", 1.0, 0), reading("Moisture", 2.0, 0)];
        let windows = chart_windows(&batch, 50);
        let values: Vec<f64> = windows[&SensorKind::Moisture]
            .iter()
            .map(SensorReading::value)
            .collect();
        assert_eq!(values, vec![1.0, 2.0]);
    }
}
