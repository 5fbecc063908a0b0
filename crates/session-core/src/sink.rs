//! The record sink.

use std::io::Write;

use crate::error::{Error, Result};
use crate::types::Record;

/// Destination for emitted records. One line per record, flushed before the
/// next record begins.
pub trait RecordSink: Send {
    fn write(&mut self, record: &Record) -> Result<()>;
}

/// A `RecordSink` over any `std::io::Write`, serializing each record as a
/// single LF-terminated JSON line.
pub struct LineSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> RecordSink for LineSink<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|source| Error::Serialization {
            id: record.id.clone(),
            source,
        })?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn writes_one_flushed_json_line() {
        let mut buf = Vec::new();
        {
            let mut sink = LineSink::new(&mut buf);
            let record = Record::new(1, "echo hi".into(), "hi\r\n".into(), Utc::now());
            sink.write(&record).unwrap();
        }
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.matches('\n').count(), 1);
        let parsed: Record = serde_json::from_str(text.trim_end()).unwrap();
        assert_eq!(parsed.id, "1");
        assert_eq!(parsed.command, "echo hi");
        assert_eq!(parsed.output, "hi\r\n");
    }
}
