//! FIT file importer.
//!
//! `fitparser` owns byte-level parsing, header/CRC validation, and field
//! widths. It also applies the profile's scale and offset while decoding, so
//! scaled fields arrive as floats and timestamps as calendar values; the
//! decode core owns unit policy, so this adapter maps such values back to
//! their wire representation (using the same published constants) before
//! handing them to the converters. Integer-typed fields pass through
//! untouched.

use chrono::Utc;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use crate::decode;
use crate::decode::convert::FIT_EPOCH_OFFSET;
use crate::decode::raw::{field_kind, MessageKind, RawMessage, RawValue};
use crate::error::{ImportError, Result};
use crate::import::ImportFormat;
use crate::models::WorkoutImport;

/// FIT file importer for the Garmin native format
pub struct FitImporter;

impl FitImporter {
    pub fn new() -> Self {
        Self
    }

    /// Read a file into the decode core's raw-message representation.
    pub fn read_messages(&self, file_path: &Path) -> Result<Vec<RawMessage>> {
        let file = File::open(file_path)?;
        let mut reader = BufReader::new(file);

        let records: Vec<FitDataRecord> =
            fitparser::from_reader(&mut reader).map_err(|e| ImportError::Parse {
                path: file_path.to_path_buf(),
                reason: format!("{:?}", e),
            })?;

        debug!(
            file = %file_path.display(),
            records = records.len(),
            "parsed FIT records"
        );

        Ok(records.iter().map(raw_message).collect())
    }
}

impl Default for FitImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportFormat for FitImporter {
    fn can_import(&self, file_path: &Path) -> bool {
        file_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("fit"))
            .unwrap_or(false)
    }

    fn import_file(&self, file_path: &Path) -> Result<WorkoutImport> {
        let messages = self.read_messages(file_path)?;
        let import = decode::decode_messages(&messages)?;
        Ok(import)
    }

    fn format_name(&self) -> &'static str {
        "FIT"
    }
}

fn message_kind(mesg: MesgNum) -> MessageKind {
    match mesg {
        MesgNum::Session => MessageKind::Session,
        MesgNum::Lap => MessageKind::Lap,
        MesgNum::Record => MessageKind::Record,
        _ => MessageKind::Other,
    }
}

fn raw_message(record: &FitDataRecord) -> RawMessage {
    let kind = message_kind(record.kind());
    let mut message = RawMessage::new(kind);

    // Out-of-scope message kinds are skipped wholesale by the decoder.
    if kind == MessageKind::Other {
        return message;
    }

    for field in record.fields() {
        if let Some(value) = raw_value(kind, field.number(), field.value()) {
            message.insert(field.number(), value);
        }
    }

    message
}

fn raw_value(message: MessageKind, number: u8, value: &Value) -> Option<RawValue> {
    match value {
        Value::Timestamp(ts) => {
            let raw = ts.with_timezone(&Utc).timestamp() - FIT_EPOCH_OFFSET;
            u64::try_from(raw).ok().map(RawValue::UInt)
        }

        Value::Enum(v) | Value::Byte(v) | Value::UInt8(v) | Value::UInt8z(v) => {
            Some(RawValue::UInt(u64::from(*v)))
        }
        Value::UInt16(v) | Value::UInt16z(v) => Some(RawValue::UInt(u64::from(*v))),
        Value::UInt32(v) | Value::UInt32z(v) => Some(RawValue::UInt(u64::from(*v))),
        Value::UInt64(v) | Value::UInt64z(v) => Some(RawValue::UInt(*v)),

        Value::SInt8(v) => Some(RawValue::SInt(i64::from(*v))),
        Value::SInt16(v) => Some(RawValue::SInt(i64::from(*v))),
        Value::SInt32(v) => Some(RawValue::SInt(i64::from(*v))),
        Value::SInt64(v) => Some(RawValue::SInt(*v)),

        Value::Float32(v) => rescale(message, number, f64::from(*v)),
        Value::Float64(v) => rescale(message, number, *v),

        // Non-numeric payloads carry no decodable field kind.
        _ => None,
    }
}

/// Undo the profile scaling fitparser already applied, recovering the wire
/// integer the converters expect.
fn rescale(message: MessageKind, number: u8, value: f64) -> Option<RawValue> {
    let Some(kind) = field_kind(message, number) else {
        return Some(RawValue::Float(value));
    };
    let wire = ((value + kind.offset() as f64) * kind.scale() as f64).round();
    if wire < 0.0 {
        Some(RawValue::SInt(wire as i64))
    } else {
        Some(RawValue::UInt(wire as u64))
    }
}
