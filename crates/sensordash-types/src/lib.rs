//! Platform-agnostic types for the sensordash IoT dashboard.
//!
//! This crate provides the reading model shared by the acquisition core
//! (sensordash-core) and any presentation layer built on top of it.
//!
//! # Features
//!
//! - [`SensorReading`]: an immutable, typed reading
//! - [`SensorKind`]: the tracked sensor categories and their display units
//! - A tolerant record parser that never rejects a reading
//!
//! # Example
//!
//! ```
//! use sensordash_types::{SensorKind, SensorReading};
//!
//! let record = serde_json::json!({"label": "moisture", "value": 42, "timestamp": "2025-01-01T10:00:05Z"});
//! let reading = SensorReading::from_record(record.as_object().unwrap());
//!
//! assert_eq!(reading.sensor_kind(), Some(SensorKind::Moisture));
//! assert_eq!(reading.normalized_kind(), "Moisture");
//! ```

pub mod error;
pub mod parse;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use parse::{now_local, parse_timestamp, parse_value, to_local};
pub use types::{SensorKind, SensorReading, normalize_label};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use time::macros::datetime;

    // --- SensorKind tests ---

    #[test]
    fn test_kind_from_label_case_insensitive() {
        assert_eq!(SensorKind::from_label("temperature"), Some(SensorKind::Temperature));
        assert_eq!(SensorKind::from_label("TeMpErAtUrE"), Some(SensorKind::Temperature));
        assert_eq!(SensorKind::from_label("Moisture"), Some(SensorKind::Moisture));
        assert_eq!(SensorKind::from_label("moisture "), None);
        assert_eq!(SensorKind::from_label("-"), None);
    }

    #[test]
    fn test_kind_from_str() {
        let kind: SensorKind = "MOISTURE".parse().unwrap();
        assert_eq!(kind, SensorKind::Moisture);

        let err = "pressure".parse::<SensorKind>().unwrap_err();
        assert!(err.to_string().contains("pressure"));
    }

    #[test]
    fn test_kind_units() {
        assert_eq!(SensorKind::Temperature.unit(), "°C");
        assert_eq!(SensorKind::Moisture.unit(), "units");
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(SensorKind::Temperature.to_string(), "Temperature");
        assert_eq!(format!("{}", SensorKind::Moisture), "Moisture");
    }

    // --- normalize_label tests ---

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("temperature"), "Temperature");
        assert_eq!(normalize_label("MOISTURE"), "Moisture");
        assert_eq!(normalize_label("m"), "M");
        assert_eq!(normalize_label("-"), "-");
    }

    // --- SensorReading tests ---

    #[test]
    fn test_reading_accessors() {
        let at = datetime!(2025-01-01 10:00:00 UTC);
        let reading = SensorReading::new("temperature", 21.0, at);

        assert_eq!(reading.kind(), "temperature");
        assert_eq!(reading.normalized_kind(), "Temperature");
        assert_eq!(reading.sensor_kind(), Some(SensorKind::Temperature));
        assert_eq!(reading.value(), 21.0);
        assert_eq!(reading.observed_at(), at);
    }

    #[test]
    fn test_untracked_reading_has_no_kind() {
        let reading = SensorReading::new("Humidity", 55.0, datetime!(2025-01-01 10:00:00 UTC));
        assert_eq!(reading.sensor_kind(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_reading_serde_nan_as_null() {
        let reading = SensorReading::new("Moisture", f64::NAN, datetime!(2025-01-01 10:00:05 UTC));
        let json = serde_json::to_value(&reading).unwrap();
        assert!(json["value"].is_null());
        assert_eq!(json["observed_at"], "2025-01-01T10:00:05Z");

        let back: SensorReading = serde_json::from_value(json).unwrap();
        assert!(back.value().is_nan());
        assert_eq!(back.observed_at(), reading.observed_at());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&SensorKind::Temperature).unwrap();
        assert_eq!(json, "\"Temperature\"");
    }

    proptest! {
        #[test]
        fn prop_parser_never_panics(label in ".*", value in ".*", ts in ".*") {
            let record = serde_json::json!({"label": label, "value": value, "timestamp": ts});
            let reading = SensorReading::from_record(record.as_object().unwrap());
            prop_assert_eq!(reading.kind(), label.as_str());
        }

        #[test]
        fn prop_numeric_values_round_trip(value in -1.0e9f64..1.0e9f64) {
            let record = serde_json::json!({"label": "Temperature", "value": value});
            let reading = SensorReading::from_record(record.as_object().unwrap());
            prop_assert_eq!(reading.value(), value);
        }

        #[test]
        fn prop_normalize_is_idempotent(label in "[a-zA-Z]{0,16}") {
            let once = normalize_label(&label);
            prop_assert_eq!(normalize_label(&once), once.clone());
        }
    }
}
