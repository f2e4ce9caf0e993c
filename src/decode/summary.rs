//! Session-level summary extraction.
//!
//! The first session message in the stream wins; later ones are ignored. The
//! builder is a pure function of the messages it observes and touches no
//! state outside the pass.

use chrono::Duration;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::{Coordinate, WorkoutSummary};

use super::convert::{self, FieldKind};
use super::raw::{fields, RawMessage};

pub(super) struct SummaryBuilder {
    summary: Option<WorkoutSummary>,
}

impl SummaryBuilder {
    pub(super) fn new() -> Self {
        Self { summary: None }
    }

    pub(super) fn observe(&mut self, message: &RawMessage) {
        if self.summary.is_some() {
            debug!("ignoring additional session message");
            return;
        }
        self.summary = Some(build_summary(message));
    }

    pub(super) fn finish(self) -> Option<WorkoutSummary> {
        self.summary
    }
}

fn metric(message: &RawMessage, number: u8, kind: FieldKind) -> Option<Decimal> {
    message.get(number).and_then(|raw| convert::scaled(kind, raw))
}

fn build_summary(message: &RawMessage) -> WorkoutSummary {
    use fields::session;

    let timestamp = message.get(fields::TIMESTAMP).and_then(convert::timestamp);
    let total_elapsed_time = metric(message, session::TOTAL_ELAPSED_TIME, FieldKind::Duration);

    let start_time = message
        .get(session::START_TIME)
        .and_then(convert::timestamp)
        .or_else(|| {
            let millis = (total_elapsed_time? * Decimal::from(1000)).to_i64()?;
            timestamp?.checked_sub_signed(Duration::milliseconds(millis))
        });

    let latitude = message
        .get(session::START_POSITION_LAT)
        .and_then(convert::degrees);
    let longitude = message
        .get(session::START_POSITION_LONG)
        .and_then(convert::degrees);
    let start_position = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(Coordinate {
            latitude,
            longitude,
        }),
        _ => None,
    };

    WorkoutSummary {
        timestamp,
        start_time,
        total_elapsed_time,
        total_timer_time: metric(message, session::TOTAL_TIMER_TIME, FieldKind::Duration),
        start_position,
        total_distance: metric(message, session::TOTAL_DISTANCE, FieldKind::Distance),
        total_calories: metric(message, session::TOTAL_CALORIES, FieldKind::Calories),
        avg_speed: metric(message, session::AVG_SPEED, FieldKind::Speed),
        max_speed: metric(message, session::MAX_SPEED, FieldKind::Speed),
        avg_heart_rate: metric(message, session::AVG_HEART_RATE, FieldKind::HeartRate),
        max_heart_rate: metric(message, session::MAX_HEART_RATE, FieldKind::HeartRate),
        avg_cadence: metric(message, session::AVG_CADENCE, FieldKind::Cadence),
        max_cadence: metric(message, session::MAX_CADENCE, FieldKind::Cadence),
        avg_temperature: metric(message, session::AVG_TEMPERATURE, FieldKind::Temperature),
        max_temperature: metric(message, session::MAX_TEMPERATURE, FieldKind::Temperature),
        avg_altitude: metric(message, session::AVG_ALTITUDE, FieldKind::Altitude),
        max_altitude: metric(message, session::MAX_ALTITUDE, FieldKind::Altitude),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::raw::{MessageKind, RawValue};
    use rust_decimal_macros::dec;

    fn session_message() -> RawMessage {
        use fields::session;
        RawMessage::new(MessageKind::Session)
            .with_field(fields::TIMESTAMP, RawValue::UInt(979_075_230))
            .with_field(session::TOTAL_ELAPSED_TIME, RawValue::UInt(2_142_629))
            .with_field(session::TOTAL_DISTANCE, RawValue::UInt(1_280_065))
            .with_field(session::AVG_HEART_RATE, RawValue::UInt(140))
    }

    #[test]
    fn test_start_time_derived_from_elapsed() {
        let mut builder = SummaryBuilder::new();
        builder.observe(&session_message());
        let summary = builder.finish().unwrap();

        let timestamp = summary.timestamp.unwrap();
        let start = summary.start_time.unwrap();
        let delta = timestamp - start;
        assert_eq!(delta.num_milliseconds(), 2_142_629);
    }

    #[test]
    fn test_explicit_start_time_wins_over_derivation() {
        let message = session_message()
            .with_field(fields::session::START_TIME, RawValue::UInt(979_073_000));
        let mut builder = SummaryBuilder::new();
        builder.observe(&message);
        let summary = builder.finish().unwrap();

        assert_eq!(
            summary.start_time.unwrap().timestamp(),
            979_073_000 + convert::FIT_EPOCH_OFFSET
        );
    }

    #[test]
    fn test_first_session_wins() {
        let mut builder = SummaryBuilder::new();
        builder.observe(&session_message());
        builder.observe(
            &session_message().with_field(fields::session::AVG_HEART_RATE, RawValue::UInt(99)),
        );
        let summary = builder.finish().unwrap();
        assert_eq!(summary.avg_heart_rate, Some(dec!(140)));
    }

    #[test]
    fn test_missing_coordinate_half_is_absent() {
        // Latitude without longitude must not yield a half-zero coordinate.
        let message = session_message().with_field(
            fields::session::START_POSITION_LAT,
            RawValue::SInt(340_925_137),
        );
        let mut builder = SummaryBuilder::new();
        builder.observe(&message);
        assert_eq!(builder.finish().unwrap().start_position, None);
    }

    #[test]
    fn test_sentinel_fields_stay_absent() {
        let message = session_message()
            .with_field(fields::session::MAX_SPEED, RawValue::UInt(u16::MAX as u64))
            .with_field(
                fields::session::MAX_HEART_RATE,
                RawValue::UInt(u8::MAX as u64),
            );
        let mut builder = SummaryBuilder::new();
        builder.observe(&message);
        let summary = builder.finish().unwrap();
        assert_eq!(summary.max_speed, None);
        assert_eq!(summary.max_heart_rate, None);
    }
}
