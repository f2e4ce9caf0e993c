//! Typed value converters: raw field + semantic kind → domain value.
//!
//! Every constant here is fixed by the FIT format definition. Scale, offset,
//! and sentinel are a pure function of the semantic kind and are never
//! derived from file contents. A raw payload equal to its kind's sentinel
//! always converts to `None`, never to zero.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::raw::RawValue;

/// Seconds between the Unix epoch and the FIT device epoch
/// (1989-12-31T00:00:00Z).
pub const FIT_EPOCH_OFFSET: i64 = 631_065_600;

/// Degrees represented by one semicircle unit: 180 / 2^31.
pub const SEMICIRCLE_DEGREES: f64 = 180.0 / 2_147_483_648.0;

/// Semantic kinds of the raw fields the decoder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Seconds since the device epoch.
    Time,
    /// Semicircle-encoded latitude or longitude.
    Position,
    /// Millisecond-resolution span (elapsed or timer time).
    Duration,
    /// Centimeters on the wire, meters in the domain.
    Distance,
    /// Millimeters per second on the wire, m/s in the domain.
    Speed,
    /// Beats per minute.
    HeartRate,
    /// Revolutions per minute.
    Cadence,
    /// Degrees Celsius.
    Temperature,
    /// Stored as (meters + 500) × 5 on the wire.
    Altitude,
    /// Kilocalories.
    Calories,
}

impl FieldKind {
    /// Wire units per domain unit.
    pub const fn scale(self) -> i64 {
        match self {
            FieldKind::Duration | FieldKind::Speed => 1000,
            FieldKind::Distance => 100,
            FieldKind::Altitude => 5,
            FieldKind::Time
            | FieldKind::Position
            | FieldKind::HeartRate
            | FieldKind::Cadence
            | FieldKind::Temperature
            | FieldKind::Calories => 1,
        }
    }

    /// Additive offset subtracted after scaling.
    pub const fn offset(self) -> i64 {
        match self {
            FieldKind::Altitude => 500,
            _ => 0,
        }
    }

    /// Raw payload meaning "field not recorded" for this kind, as defined by
    /// the field's wire width.
    pub const fn sentinel(self) -> u64 {
        match self {
            FieldKind::Time | FieldKind::Duration | FieldKind::Distance => u32::MAX as u64,
            FieldKind::Position => i32::MAX as u64,
            FieldKind::Speed | FieldKind::Altitude | FieldKind::Calories => u16::MAX as u64,
            FieldKind::HeartRate | FieldKind::Cadence => u8::MAX as u64,
            FieldKind::Temperature => i8::MAX as u64,
        }
    }

    const fn is_scaled(self) -> bool {
        !matches!(self, FieldKind::Time | FieldKind::Position)
    }
}

fn is_sentinel(kind: FieldKind, raw: RawValue) -> bool {
    raw.sentinel_bits() == Some(kind.sentinel())
}

/// Convert a device-epoch timestamp to calendar time. Monotonic: a larger raw
/// value never yields an earlier timestamp.
pub fn timestamp(raw: RawValue) -> Option<DateTime<Utc>> {
    if is_sentinel(FieldKind::Time, raw) {
        return None;
    }
    let seconds = match raw {
        RawValue::UInt(v) => i64::try_from(v).ok()?,
        RawValue::SInt(v) if v >= 0 => v,
        RawValue::Float(v) if v >= 0.0 => v.round() as i64,
        RawValue::SInt(_) | RawValue::Float(_) => return None,
    };
    Utc.timestamp_opt(seconds.checked_add(FIT_EPOCH_OFFSET)?, 0).single()
}

/// Convert a semicircle-encoded angle to degrees, sign preserved.
pub fn degrees(raw: RawValue) -> Option<f64> {
    if is_sentinel(FieldKind::Position, raw) {
        return None;
    }
    let semicircles = match raw {
        RawValue::SInt(v) => v as f64,
        RawValue::UInt(v) => v as f64,
        RawValue::Float(v) => v,
    };
    Some(semicircles * SEMICIRCLE_DEGREES)
}

/// Convert a scaled metric to its domain unit:
/// `raw / scale_for(kind) - offset_for(kind)`.
pub fn scaled(kind: FieldKind, raw: RawValue) -> Option<Decimal> {
    debug_assert!(kind.is_scaled(), "scaled() called with {kind:?}");
    if is_sentinel(kind, raw) {
        return None;
    }
    let value = match raw {
        RawValue::UInt(v) => Decimal::from(v),
        RawValue::SInt(v) => Decimal::from(v),
        RawValue::Float(v) => Decimal::from_f64(v)?,
    };
    Some(value / Decimal::from(kind.scale()) - Decimal::from(kind.offset()))
}
