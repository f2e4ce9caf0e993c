//! Raw-message contract between the byte-level FIT reader and the decode core.
//!
//! The reader owns byte parsing, CRC checks, and field-width interpretation;
//! the core only ever sees a message kind plus a mapping from field number to
//! raw numeric value. Tests construct these messages directly, the file
//! importer produces them from `fitparser` records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::convert::FieldKind;

/// A raw numeric field payload, exactly as stored on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue {
    UInt(u64),
    SInt(i64),
    Float(f64),
}

impl RawValue {
    /// Integer view used for sentinel comparison. Floating payloads have no
    /// sentinel encoding.
    pub(crate) fn sentinel_bits(self) -> Option<u64> {
        match self {
            RawValue::UInt(v) => Some(v),
            RawValue::SInt(v) if v >= 0 => Some(v as u64),
            RawValue::SInt(_) | RawValue::Float(_) => None,
        }
    }
}

/// Message kinds the decoder recognizes. Everything else in a FIT file
/// (file_id, device_info, events, ...) is out of scope and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Session,
    Lap,
    Record,
    Other,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Session => "session",
            MessageKind::Lap => "lap",
            MessageKind::Record => "record",
            MessageKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// One decoded binary message: a kind tag plus field number → raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub kind: MessageKind,
    pub fields: BTreeMap<u8, RawValue>,
}

impl RawMessage {
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, number: u8, value: RawValue) {
        self.fields.insert(number, value);
    }

    /// Builder-style insert, used heavily by tests.
    pub fn with_field(mut self, number: u8, value: RawValue) -> Self {
        self.insert(number, value);
        self
    }

    pub fn get(&self, number: u8) -> Option<RawValue> {
        self.fields.get(&number).copied()
    }
}

/// Published FIT profile field numbers for the message kinds we decode.
pub mod fields {
    /// Shared across message kinds.
    pub const TIMESTAMP: u8 = 253;

    pub mod session {
        pub const START_TIME: u8 = 2;
        pub const START_POSITION_LAT: u8 = 3;
        pub const START_POSITION_LONG: u8 = 4;
        pub const TOTAL_ELAPSED_TIME: u8 = 7;
        pub const TOTAL_TIMER_TIME: u8 = 8;
        pub const TOTAL_DISTANCE: u8 = 9;
        pub const TOTAL_CALORIES: u8 = 11;
        pub const AVG_SPEED: u8 = 14;
        pub const MAX_SPEED: u8 = 15;
        pub const AVG_HEART_RATE: u8 = 16;
        pub const MAX_HEART_RATE: u8 = 17;
        pub const AVG_CADENCE: u8 = 18;
        pub const MAX_CADENCE: u8 = 19;
        pub const AVG_ALTITUDE: u8 = 49;
        pub const MAX_ALTITUDE: u8 = 50;
        pub const AVG_TEMPERATURE: u8 = 57;
        pub const MAX_TEMPERATURE: u8 = 58;
    }

    pub mod lap {
        pub const START_TIME: u8 = 2;
        pub const TOTAL_ELAPSED_TIME: u8 = 7;
        pub const TOTAL_TIMER_TIME: u8 = 8;
        pub const TOTAL_DISTANCE: u8 = 9;
        pub const TOTAL_CALORIES: u8 = 11;
    }

    pub mod record {
        pub const POSITION_LAT: u8 = 0;
        pub const POSITION_LONG: u8 = 1;
        pub const ALTITUDE: u8 = 2;
        pub const HEART_RATE: u8 = 3;
        pub const CADENCE: u8 = 4;
        pub const DISTANCE: u8 = 5;
        pub const SPEED: u8 = 6;
        pub const TEMPERATURE: u8 = 13;
    }
}

/// Semantic kind of a field within a given message, per the published
/// profile. `None` marks a field the decoder does not recognize.
pub fn field_kind(message: MessageKind, number: u8) -> Option<FieldKind> {
    use fields::{lap, record, session};

    match (message, number) {
        (_, fields::TIMESTAMP) => Some(FieldKind::Time),

        (MessageKind::Session, session::START_TIME) => Some(FieldKind::Time),
        (MessageKind::Session, session::START_POSITION_LAT)
        | (MessageKind::Session, session::START_POSITION_LONG) => Some(FieldKind::Position),
        (MessageKind::Session, session::TOTAL_ELAPSED_TIME)
        | (MessageKind::Session, session::TOTAL_TIMER_TIME) => Some(FieldKind::Duration),
        (MessageKind::Session, session::TOTAL_DISTANCE) => Some(FieldKind::Distance),
        (MessageKind::Session, session::TOTAL_CALORIES) => Some(FieldKind::Calories),
        (MessageKind::Session, session::AVG_SPEED)
        | (MessageKind::Session, session::MAX_SPEED) => Some(FieldKind::Speed),
        (MessageKind::Session, session::AVG_HEART_RATE)
        | (MessageKind::Session, session::MAX_HEART_RATE) => Some(FieldKind::HeartRate),
        (MessageKind::Session, session::AVG_CADENCE)
        | (MessageKind::Session, session::MAX_CADENCE) => Some(FieldKind::Cadence),
        (MessageKind::Session, session::AVG_ALTITUDE)
        | (MessageKind::Session, session::MAX_ALTITUDE) => Some(FieldKind::Altitude),
        (MessageKind::Session, session::AVG_TEMPERATURE)
        | (MessageKind::Session, session::MAX_TEMPERATURE) => Some(FieldKind::Temperature),

        (MessageKind::Lap, lap::START_TIME) => Some(FieldKind::Time),
        (MessageKind::Lap, lap::TOTAL_ELAPSED_TIME) | (MessageKind::Lap, lap::TOTAL_TIMER_TIME) => {
            Some(FieldKind::Duration)
        }
        (MessageKind::Lap, lap::TOTAL_DISTANCE) => Some(FieldKind::Distance),
        (MessageKind::Lap, lap::TOTAL_CALORIES) => Some(FieldKind::Calories),

        (MessageKind::Record, record::POSITION_LAT) | (MessageKind::Record, record::POSITION_LONG) => {
            Some(FieldKind::Position)
        }
        (MessageKind::Record, record::ALTITUDE) => Some(FieldKind::Altitude),
        (MessageKind::Record, record::HEART_RATE) => Some(FieldKind::HeartRate),
        (MessageKind::Record, record::CADENCE) => Some(FieldKind::Cadence),
        (MessageKind::Record, record::DISTANCE) => Some(FieldKind::Distance),
        (MessageKind::Record, record::SPEED) => Some(FieldKind::Speed),
        (MessageKind::Record, record::TEMPERATURE) => Some(FieldKind::Temperature),

        _ => None,
    }
}
