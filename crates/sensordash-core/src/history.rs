//! Bounded per-kind reading history.
//!
//! A [`HistoryStore`] maps every tracked [`SensorKind`] to an ordered
//! sequence of readings. Two update policies are supported:
//!
//! - [`HistoryStore::push`] appends and evicts from the front (FIFO) once
//!   the capacity is exceeded. Used for live tracking.
//! - [`HistoryStore::replace`] overwrites a kind's sequence wholesale. Used
//!   for the chart window.
//!
//! Within a kind, insertion order is the order callers supply; ordering is
//! not enforced across kinds.

use std::collections::{BTreeMap, VecDeque};

use sensordash_types::{SensorKind, SensorReading};

/// Default capacity of the live history.
pub const LIVE_CAPACITY: usize = 200;

/// Default size of the chart window.
pub const CHART_WINDOW: usize = 50;

/// Bounded history keyed by sensor kind.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    entries: BTreeMap<SensorKind, VecDeque<SensorReading>>,
}

impl HistoryStore {
    /// Create a store with an empty entry for every tracked kind.
    ///
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let entries = SensorKind::ALL
            .into_iter()
            .map(|kind| (kind, VecDeque::with_capacity(capacity)))
            .collect();
        Self { capacity, entries }
    }

    /// Maximum number of readings kept per kind.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append a reading, evicting the oldest entries beyond capacity.
    ///
    /// Returns the number of evicted readings.
    pub fn push(&mut self, kind: SensorKind, reading: SensorReading) -> usize {
        let entry = self.entries.entry(kind).or_default();
        entry.push_back(reading);

        let mut evicted = 0;
        while entry.len() > self.capacity {
            entry.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Replace a kind's history with `readings`.
    ///
    /// Only the last `capacity` readings are kept.
    pub fn replace(&mut self, kind: SensorKind, readings: Vec<SensorReading>) {
        let skip = readings.len().saturating_sub(self.capacity);
        self.entries
            .insert(kind, readings.into_iter().skip(skip).collect());
    }

    /// Readings for a kind, oldest first.
    pub fn get(&self, kind: SensorKind) -> impl Iterator<Item = &SensorReading> {
        self.entries.get(&kind).into_iter().flatten()
    }

    /// Readings for a kind as an owned vector.
    pub fn to_vec(&self, kind: SensorKind) -> Vec<SensorReading> {
        self.get(kind).cloned().collect()
    }

    /// Number of readings stored for a kind.
    pub fn len(&self, kind: SensorKind) -> usize {
        self.entries.get(&kind).map_or(0, VecDeque::len)
    }

    /// Whether no kind holds any reading.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(VecDeque::is_empty)
    }

    /// The most recently inserted reading for a kind.
    pub fn latest(&self, kind: SensorKind) -> Option<&SensorReading> {
        self.entries.get(&kind).and_then(VecDeque::back)
    }

    /// Owned copy of every kind's history.
    pub fn to_map(&self) -> BTreeMap<SensorKind, Vec<SensorReading>> {
        self.entries
            .iter()
            .map(|(kind, readings)| (*kind, readings.iter().cloned().collect()))
            .collect()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(LIVE_CAPACITY)
    }
}
