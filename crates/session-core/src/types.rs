//! Shared data types for session-core.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// In-band octet that signals the Line Editor to snapshot and emit its
/// buffer.
pub const END_OF_COMMAND: u8 = 0x04;

/// One executed shell command paired with its cleaned output and the instant
/// the Record Assembler observed it.
///
/// `id` is the decimal rendering of the pipeline's monotonic counter, kept
/// as a `String` (not a numeric type) because the wire format fixes it as a
/// JSON string, and round-tripping through a numeric type would only invite
/// an accidental change of that contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub command: String,
    pub output: String,
    pub return_timestamp: String,
}

impl Record {
    /// Build a record, formatting `timestamp` as RFC-3339 with nanosecond
    /// precision and an explicit offset.
    pub fn new(id: u64, command: String, output: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.to_string(),
            command,
            output,
            return_timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
        }
    }
}
