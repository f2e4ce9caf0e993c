//! Single-pass decoder turning a raw message stream into a workout import.
//!
//! The pass keeps all accumulators local and exposes the result only after
//! the stream is fully consumed: callers receive a complete `WorkoutImport`
//! or a fatal error, never a partially populated value. Soft conditions are
//! collected as warnings on the result instead of aborting the pass.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::models::{DecodeWarning, WorkoutImport};

pub mod convert;
pub mod raw;

mod intervals;
mod summary;

use intervals::IntervalBuilder;
use raw::{MessageKind, RawMessage};
use summary::SummaryBuilder;

/// Accumulates soft decode conditions. Unrecognized-field warnings are
/// deduplicated per (message kind, field number) so the list stays
/// proportional to the schema rather than the stream length.
pub(crate) struct Warnings {
    entries: Vec<DecodeWarning>,
    seen_fields: HashSet<(MessageKind, u8)>,
}

impl Warnings {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            seen_fields: HashSet::new(),
        }
    }

    pub(crate) fn unrecognized(&mut self, message: MessageKind, field: u8) {
        if !self.seen_fields.insert((message, field)) {
            return;
        }
        warn!(%message, field, "unrecognized field, treating as absent");
        self.entries
            .push(DecodeWarning::UnrecognizedField { message, field });
    }

    pub(crate) fn malformed(&mut self, message: MessageKind, reason: &str) {
        warn!(%message, reason, "skipping malformed message");
        self.entries.push(DecodeWarning::MalformedMessage {
            message,
            reason: reason.to_string(),
        });
    }

    pub(crate) fn into_inner(self) -> Vec<DecodeWarning> {
        self.entries
    }
}

/// Decode a fully-materialized message stream into one workout import.
///
/// Fails only when the stream holds no session message; every other
/// condition is soft and surfaced via `WorkoutImport::warnings`.
pub fn decode_messages(messages: &[RawMessage]) -> Result<WorkoutImport, DecodeError> {
    let mut warnings = Warnings::new();
    let mut summary = SummaryBuilder::new();
    let mut intervals = IntervalBuilder::new();

    for message in messages {
        match message.kind {
            MessageKind::Other => continue,
            MessageKind::Session => {
                note_unrecognized(message, &mut warnings);
                summary.observe(message);
            }
            MessageKind::Lap | MessageKind::Record => {
                note_unrecognized(message, &mut warnings);
                intervals.observe(message, &mut warnings);
            }
        }
    }

    let summary = summary.finish().ok_or(DecodeError::MissingSummary)?;
    let intervals = intervals.finish();
    let warnings = warnings.into_inner();

    debug!(
        intervals = intervals.len(),
        warnings = warnings.len(),
        "decode pass complete"
    );

    Ok(WorkoutImport {
        summary,
        intervals,
        warnings,
    })
}

fn note_unrecognized(message: &RawMessage, warnings: &mut Warnings) {
    for number in message.fields.keys() {
        if raw::field_kind(message.kind, *number).is_none() {
            warnings.unrecognized(message.kind, *number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::raw::{fields, RawValue};
    use super::*;

    fn minimal_session() -> RawMessage {
        RawMessage::new(MessageKind::Session)
            .with_field(fields::TIMESTAMP, RawValue::UInt(979_075_230))
            .with_field(fields::session::TOTAL_DISTANCE, RawValue::UInt(1_280_065))
    }

    #[test]
    fn test_missing_summary_is_fatal() {
        let record = RawMessage::new(MessageKind::Record)
            .with_field(fields::TIMESTAMP, RawValue::UInt(1000));
        let result = decode_messages(&[record]);
        assert!(matches!(result, Err(DecodeError::MissingSummary)));
    }

    #[test]
    fn test_summary_without_intervals_is_a_success() {
        let import = decode_messages(&[minimal_session()]).unwrap();
        assert!(import.intervals.is_empty());
        assert!(import.warnings.is_empty());
    }

    #[test]
    fn test_unknown_message_kinds_are_ignored() {
        let import = decode_messages(&[
            RawMessage::new(MessageKind::Other).with_field(0, RawValue::UInt(4)),
            minimal_session(),
        ])
        .unwrap();
        assert!(import.warnings.is_empty());
    }

    #[test]
    fn test_unrecognized_fields_warn_once_per_schema_slot() {
        let with_stranger = |message: RawMessage| message.with_field(110, RawValue::UInt(7));
        let stream = [
            with_stranger(minimal_session()),
            with_stranger(RawMessage::new(MessageKind::Record)),
            with_stranger(RawMessage::new(MessageKind::Record)),
        ];
        let import = decode_messages(&stream).unwrap();
        // One per (kind, field): session/110 and record/110.
        assert_eq!(import.warnings.len(), 2);
    }
}
