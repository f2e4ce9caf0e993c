use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decode::raw::MessageKind;

/// Geographic position in degrees. South and west are negative. Absent
/// entirely when the source had no GPS fix; never a zero placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Whole-activity aggregate decoded from the session message.
///
/// Timer time excludes paused spans, elapsed time does not; the two are
/// decoded independently and never assumed equal. Likewise every
/// average/maximum pair is decoded from its own field, never derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    /// File timestamp of the session message.
    pub timestamp: Option<DateTime<Utc>>,

    /// Activity start. Taken from the explicit start-time field when present,
    /// otherwise derived as timestamp minus total elapsed time.
    pub start_time: Option<DateTime<Utc>>,

    /// Wall-clock span of the activity in seconds.
    pub total_elapsed_time: Option<Decimal>,

    /// Running-timer span in seconds (pauses excluded).
    pub total_timer_time: Option<Decimal>,

    /// Position at activity start.
    pub start_position: Option<Coordinate>,

    /// Distance covered in meters.
    pub total_distance: Option<Decimal>,

    /// Energy burned in kilocalories.
    pub total_calories: Option<Decimal>,

    /// Speed in meters per second.
    pub avg_speed: Option<Decimal>,
    pub max_speed: Option<Decimal>,

    /// Heart rate in beats per minute.
    pub avg_heart_rate: Option<Decimal>,
    pub max_heart_rate: Option<Decimal>,

    /// Cadence in revolutions per minute.
    pub avg_cadence: Option<Decimal>,
    pub max_cadence: Option<Decimal>,

    /// Temperature in degrees Celsius.
    pub avg_temperature: Option<Decimal>,
    pub max_temperature: Option<Decimal>,

    /// Altitude in meters.
    pub avg_altitude: Option<Decimal>,
    pub max_altitude: Option<Decimal>,
}

/// One contiguous lap segment. Boundary dates may be absent when the source
/// stream omitted the marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    /// Distance covered within the segment, in meters.
    pub distance: Option<Decimal>,

    /// Energy burned within the segment, in kilocalories.
    pub calories: Option<Decimal>,
}

/// Soft decode condition. Collected during the pass and surfaced on the
/// final result; never aborts the import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecodeWarning {
    /// A field's semantic kind is unknown; the field was treated as absent.
    UnrecognizedField { message: MessageKind, field: u8 },

    /// A message could not be interpreted for its kind and was skipped.
    MalformedMessage { message: MessageKind, reason: String },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::UnrecognizedField { message, field } => {
                write!(f, "unrecognized field {field} in {message} message")
            }
            DecodeWarning::MalformedMessage { message, reason } => {
                write!(f, "malformed {message} message skipped: {reason}")
            }
        }
    }
}

/// The complete decoded activity: one summary plus laps in stream order.
/// Constructed atomically from a fully-consumed record stream and immutable
/// thereafter; callers receive it complete or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutImport {
    pub summary: WorkoutSummary,
    pub intervals: Vec<Interval>,
    pub warnings: Vec<DecodeWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_warning_display() {
        let warning = DecodeWarning::UnrecognizedField {
            message: MessageKind::Session,
            field: 110,
        };
        assert_eq!(
            warning.to_string(),
            "unrecognized field 110 in session message"
        );
    }

    #[test]
    fn test_interval_serialization_roundtrip() {
        let interval = Interval {
            start_time: None,
            end_time: None,
            distance: Some(dec!(6000.00)),
            calories: Some(dec!(450)),
        };
        let json = serde_json::to_string(&interval).unwrap();
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, interval);
    }

    #[test]
    fn test_warning_serialization_is_tagged() {
        let warning = DecodeWarning::MalformedMessage {
            message: MessageKind::Lap,
            reason: "no usable timestamp".to_string(),
        };
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"type\":\"malformed_message\""));
        assert!(json.contains("\"message\":\"lap\""));
    }
}
