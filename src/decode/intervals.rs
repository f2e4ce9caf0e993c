//! Lap-boundary segmentation of the record stream.
//!
//! A lap message is the boundary marker: it closes the currently open
//! segment and the next segment opens where it ended. Record messages fill
//! the open segment's accumulator so a lap that omits its totals (and the
//! trailing partial lap at stream end) can still report distance. Output
//! preserves stream order; nothing is sorted or merged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::Interval;

use super::convert::{self, FieldKind};
use super::raw::{fields, MessageKind, RawMessage};
use super::Warnings;

pub(super) struct IntervalBuilder {
    intervals: Vec<Interval>,
    open: OpenSegment,
}

/// Accumulator for the segment between two lap boundaries. Record distance is
/// cumulative over the whole activity, so the per-segment sum of deltas is
/// last minus the value at segment open.
#[derive(Default)]
struct OpenSegment {
    start: Option<DateTime<Utc>>,
    base_distance: Option<Decimal>,
    last_distance: Option<Decimal>,
    /// Records that contributed a metric to this segment.
    samples: usize,
}

impl OpenSegment {
    fn distance(&self) -> Option<Decimal> {
        match (self.base_distance, self.last_distance) {
            (Some(base), Some(last)) => Some(last - base),
            _ => None,
        }
    }
}

impl IntervalBuilder {
    pub(super) fn new() -> Self {
        Self {
            intervals: Vec::new(),
            open: OpenSegment::default(),
        }
    }

    pub(super) fn observe(&mut self, message: &RawMessage, warnings: &mut Warnings) {
        match message.kind {
            MessageKind::Record => self.observe_record(message),
            MessageKind::Lap => self.observe_lap(message, warnings),
            MessageKind::Session | MessageKind::Other => {}
        }
    }

    fn observe_record(&mut self, message: &RawMessage) {
        if self.open.start.is_none() {
            self.open.start = message.get(fields::TIMESTAMP).and_then(convert::timestamp);
        }
        // Absent or sentinel distance contributes nothing to the segment.
        if let Some(distance) = message
            .get(fields::record::DISTANCE)
            .and_then(|raw| convert::scaled(FieldKind::Distance, raw))
        {
            if self.open.base_distance.is_none() {
                self.open.base_distance = Some(distance);
            }
            self.open.last_distance = Some(distance);
            self.open.samples += 1;
        }
    }

    fn observe_lap(&mut self, message: &RawMessage, warnings: &mut Warnings) {
        let end_time = message.get(fields::TIMESTAMP).and_then(convert::timestamp);
        let start_time = message
            .get(fields::lap::START_TIME)
            .and_then(convert::timestamp)
            .or(self.open.start);

        if start_time.is_none() && end_time.is_none() {
            warnings.malformed(MessageKind::Lap, "no usable timestamp");
            return;
        }

        // Lap totals win; the segment accumulator covers laps that omit them.
        let distance = message
            .get(fields::lap::TOTAL_DISTANCE)
            .and_then(|raw| convert::scaled(FieldKind::Distance, raw))
            .or_else(|| self.open.distance());
        let calories = message
            .get(fields::lap::TOTAL_CALORIES)
            .and_then(|raw| convert::scaled(FieldKind::Calories, raw));

        self.intervals.push(Interval {
            start_time,
            end_time,
            distance,
            calories,
        });

        self.open = OpenSegment {
            start: end_time,
            base_distance: self.open.last_distance,
            last_distance: self.open.last_distance,
            samples: 0,
        };
    }

    /// Emit the trailing partial lap, if it has a start date and at least one
    /// accumulated metric; otherwise it is dropped silently.
    pub(super) fn finish(mut self) -> Vec<Interval> {
        if self.open.start.is_some() && self.open.samples > 0 {
            self.intervals.push(Interval {
                start_time: self.open.start,
                end_time: None,
                distance: self.open.distance(),
                calories: None,
            });
        }
        self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::raw::RawValue;
    use rust_decimal_macros::dec;

    fn record(timestamp: u64, distance_cm: u64) -> RawMessage {
        RawMessage::new(MessageKind::Record)
            .with_field(fields::TIMESTAMP, RawValue::UInt(timestamp))
            .with_field(fields::record::DISTANCE, RawValue::UInt(distance_cm))
    }

    fn lap(start: u64, end: u64, distance_cm: u64, calories: u64) -> RawMessage {
        RawMessage::new(MessageKind::Lap)
            .with_field(fields::TIMESTAMP, RawValue::UInt(end))
            .with_field(fields::lap::START_TIME, RawValue::UInt(start))
            .with_field(fields::lap::TOTAL_DISTANCE, RawValue::UInt(distance_cm))
            .with_field(fields::lap::TOTAL_CALORIES, RawValue::UInt(calories))
    }

    fn run(messages: &[RawMessage]) -> (Vec<Interval>, Vec<crate::models::DecodeWarning>) {
        let mut warnings = Warnings::new();
        let mut builder = IntervalBuilder::new();
        for message in messages {
            builder.observe(message, &mut warnings);
        }
        (builder.finish(), warnings.into_inner())
    }

    #[test]
    fn test_lap_totals_populate_interval() {
        let (intervals, warnings) = run(&[lap(1000, 2000, 600_000, 450)]);
        assert!(warnings.is_empty());
        assert_eq!(intervals.len(), 1);
        let interval = &intervals[0];
        assert_eq!(interval.distance, Some(dec!(6000.00)));
        assert_eq!(interval.calories, Some(dec!(450)));
        assert!(interval.start_time.unwrap() < interval.end_time.unwrap());
    }

    #[test]
    fn test_lap_without_totals_uses_record_accumulator() {
        let boundary = RawMessage::new(MessageKind::Lap)
            .with_field(fields::TIMESTAMP, RawValue::UInt(1300));
        let (intervals, _) = run(&[record(1000, 0), record(1100, 50_000), record(1200, 120_000), boundary]);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].distance, Some(dec!(1200.00)));
        // Start falls back to the first record in the segment.
        assert_eq!(
            intervals[0].start_time.unwrap().timestamp(),
            1000 + convert::FIT_EPOCH_OFFSET
        );
    }

    #[test]
    fn test_trailing_partial_lap_is_emitted_open_ended() {
        let (intervals, _) = run(&[
            lap(1000, 2000, 600_000, 450),
            record(2010, 610_000),
            record(2100, 700_000),
        ]);
        assert_eq!(intervals.len(), 2);
        let trailing = &intervals[1];
        assert_eq!(trailing.end_time, None);
        // Accumulation restarts from the cumulative distance at the boundary.
        assert_eq!(trailing.distance, Some(dec!(900.00)));
        assert_eq!(
            trailing.start_time.unwrap().timestamp(),
            2000 + convert::FIT_EPOCH_OFFSET
        );
    }

    #[test]
    fn test_trailing_segment_without_metrics_is_dropped() {
        let tail = RawMessage::new(MessageKind::Record)
            .with_field(fields::TIMESTAMP, RawValue::UInt(2010));
        let (intervals, _) = run(&[lap(1000, 2000, 600_000, 450), tail]);
        assert_eq!(intervals.len(), 1);
    }

    #[test]
    fn test_malformed_lap_is_skipped_with_warning() {
        let bare = RawMessage::new(MessageKind::Lap)
            .with_field(fields::lap::TOTAL_DISTANCE, RawValue::UInt(100_000));
        let (intervals, warnings) = run(&[bare, lap(1000, 2000, 600_000, 450)]);
        assert_eq!(intervals.len(), 1);
        assert_eq!(intervals[0].distance, Some(dec!(6000.00)));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("malformed lap"));
    }

    #[test]
    fn test_intervals_preserve_stream_order() {
        let (intervals, _) = run(&[
            lap(1000, 2000, 100_000, 100),
            lap(2000, 3000, 200_000, 200),
            lap(3000, 4000, 300_000, 300),
        ]);
        assert_eq!(intervals.len(), 3);
        let starts: Vec<_> = intervals
            .iter()
            .map(|i| i.start_time.unwrap())
            .collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_sentinel_lap_totals_fall_back_to_accumulator() {
        let boundary = RawMessage::new(MessageKind::Lap)
            .with_field(fields::TIMESTAMP, RawValue::UInt(1300))
            .with_field(
                fields::lap::TOTAL_DISTANCE,
                RawValue::UInt(u32::MAX as u64),
            );
        let (intervals, _) = run(&[record(1000, 0), record(1200, 80_000), boundary]);
        assert_eq!(intervals.len(), 1);
        // The sentinel total is absent, not zero, so the accumulator wins.
        assert_eq!(intervals[0].distance, Some(dec!(800.00)));
    }
}
