//! Core types for dashboard sensor data.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Category of sensor tracked by the dashboard.
///
/// Labels from the remote endpoint are matched case-insensitively, so
/// `"temperature"`, `"TEMPERATURE"` and `"Temperature"` all map to
/// [`SensorKind::Temperature`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SensorKind {
    /// Air or probe temperature, reported in degrees Celsius.
    Temperature,
    /// Soil moisture, reported in sensor units.
    Moisture,
}

impl SensorKind {
    /// Every tracked kind, in display order.
    pub const ALL: [SensorKind; 2] = [SensorKind::Temperature, SensorKind::Moisture];

    /// Match a raw endpoint label against the tracked kinds.
    ///
    /// # Examples
    ///
    /// ```
    /// use sensordash_types::SensorKind;
    ///
    /// assert_eq!(SensorKind::from_label("temperature"), Some(SensorKind::Temperature));
    /// assert_eq!(SensorKind::from_label("MOISTURE"), Some(SensorKind::Moisture));
    /// assert_eq!(SensorKind::from_label("humidity"), None);
    /// ```
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(label))
    }

    /// The normalized name used as the history key.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "Temperature",
            SensorKind::Moisture => "Moisture",
        }
    }

    /// Display unit for values of this kind.
    #[must_use]
    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Temperature => "°C",
            SensorKind::Moisture => "units",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| ParseError::UnknownKind(s.to_string()))
    }
}

/// Normalize a raw label: first character upper-cased, the rest lower-cased.
///
/// ```
/// use sensordash_types::normalize_label;
///
/// assert_eq!(normalize_label("tEMPERATURE"), "Temperature");
/// assert_eq!(normalize_label(""), "");
/// ```
#[must_use]
pub fn normalize_label(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => {
            let mut normalized: String = first.to_uppercase().collect();
            normalized.push_str(&chars.as_str().to_lowercase());
            normalized
        }
        None => String::new(),
    }
}

/// A single sensor reading received from the remote endpoint.
///
/// Readings are immutable once constructed. A value that could not be
/// parsed is stored as `f64::NAN`; use [`SensorReading::has_value`] before
/// doing arithmetic on it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorReading {
    kind: String,
    #[cfg_attr(feature = "serde", serde(with = "nan_as_null"))]
    value: f64,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    observed_at: OffsetDateTime,
}

impl SensorReading {
    /// Create a reading from already-validated parts.
    pub fn new(kind: impl Into<String>, value: f64, observed_at: OffsetDateTime) -> Self {
        Self {
            kind: kind.into(),
            value,
            observed_at,
        }
    }

    /// The raw label as received.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The label with normalized capitalization.
    pub fn normalized_kind(&self) -> String {
        normalize_label(&self.kind)
    }

    /// The tracked kind this reading belongs to, if any.
    pub fn sensor_kind(&self) -> Option<SensorKind> {
        SensorKind::from_label(&self.kind)
    }

    /// The measured value, `NaN` when the raw field was unusable.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The measured value, or `None` when it is the not-a-number sentinel.
    pub fn checked_value(&self) -> Option<f64> {
        self.has_value().then_some(self.value)
    }

    /// Whether the value is a real number.
    pub fn has_value(&self) -> bool {
        !self.value.is_nan()
    }

    /// When the reading was observed.
    pub fn observed_at(&self) -> OffsetDateTime {
        self.observed_at
    }
}

#[cfg(feature = "serde")]
mod nan_as_null {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let value = (!value.is_nan()).then_some(*value);
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
    }
}
