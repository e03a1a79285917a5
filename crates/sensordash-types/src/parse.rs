//! Conversion of raw endpoint records into [`SensorReading`]s.
//!
//! The parser never fails. Each record yields exactly one reading:
//!
//! | Field | Source | Fallback |
//! |-------|--------|----------|
//! | kind | `label`, coerced to a string | `"-"` |
//! | value | `value`, numeric or numeric string | `NaN` |
//! | observed_at | `timestamp`, ISO-8601 | current local time |

use serde_json::{Map, Value};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::types::SensorReading;

/// Field holding the sensor label.
pub const LABEL_FIELD: &str = "label";
/// Field holding the measured value.
pub const VALUE_FIELD: &str = "value";
/// Field holding the observation timestamp.
pub const TIMESTAMP_FIELD: &str = "timestamp";
/// Label used when a record carries none.
pub const MISSING_LABEL: &str = "-";

impl SensorReading {
    /// Parse one untyped record.
    ///
    /// ```
    /// use sensordash_types::SensorReading;
    ///
    /// let record = serde_json::json!({
    ///     "label": "Temperature",
    ///     "value": "21.5",
    ///     "timestamp": "2025-01-01T10:00:00Z",
    /// });
    /// let reading = SensorReading::from_record(record.as_object().unwrap());
    /// assert_eq!(reading.kind(), "Temperature");
    /// assert_eq!(reading.value(), 21.5);
    /// ```
    pub fn from_record(record: &Map<String, Value>) -> Self {
        Self::from_record_at(record, now_local())
    }

    /// Parse one untyped record, using `now` when the timestamp is unusable.
    pub fn from_record_at(record: &Map<String, Value>, now: OffsetDateTime) -> Self {
        let kind = record
            .get(LABEL_FIELD)
            .filter(|v| !v.is_null())
            .map(coerce_to_string)
            .unwrap_or_else(|| MISSING_LABEL.to_string());
        let value = parse_value(record.get(VALUE_FIELD));
        let observed_at = record
            .get(TIMESTAMP_FIELD)
            .and_then(|raw| parse_timestamp(&coerce_to_string(raw)))
            .unwrap_or(now);

        SensorReading::new(kind, value, to_local(observed_at))
    }
}

/// Convert a raw value field to a number, `NaN` when unusable.
///
/// ```
/// use sensordash_types::parse_value;
///
/// assert_eq!(parse_value(Some(&serde_json::json!(42))), 42.0);
/// assert_eq!(parse_value(Some(&serde_json::json!(" 3.5 "))), 3.5);
/// assert!(parse_value(Some(&serde_json::json!("warm"))).is_nan());
/// assert!(parse_value(None).is_nan());
/// ```
pub fn parse_value(raw: Option<&Value>) -> f64 {
    match raw {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Parse an ISO-8601-like timestamp.
///
/// Accepts RFC 3339, the general ISO-8601 forms, date-times without an
/// offset (taken as local time), `YYYY-MM-DD HH:MM:SS` (local time) and bare
/// dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(dt);
    }
    if let Ok(dt) = PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT) {
        return Some(dt.assume_offset(local_offset()));
    }
    let spaced = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(raw, spaced) {
        return Some(dt.assume_offset(local_offset()));
    }
    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(raw, date_only) {
        return Some(date.midnight().assume_utc());
    }

    None
}

/// Current time in the local offset.
pub fn now_local() -> OffsetDateTime {
    to_local(OffsetDateTime::now_utc())
}

/// Express a timestamp in the local offset, keeping the same instant.
pub fn to_local(dt: OffsetDateTime) -> OffsetDateTime {
    dt.to_offset(local_offset())
}

// The local offset cannot always be determined (e.g. multi-threaded
// processes on some Unix platforms); UTC is used then.
fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
