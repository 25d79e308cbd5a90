use crate::emit::message::Message;
use crate::error::{Result, TapError};
use crate::types::Row;
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Writes protocol messages as JSON lines to a single output
pub struct MessageWriter<W: Write> {
    writer: W,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(writer: W) -> Self {
        MessageWriter { writer }
    }

    pub fn write_message(&mut self, message: &Message<'_>) -> Result<()> {
        let json = serde_json::to_string(message)?;
        writeln!(self.writer, "{}", json).map_err(TapError::Sink)
    }

    pub fn write_schema(
        &mut self,
        stream: &str,
        schema: &Value,
        key_properties: &[String],
    ) -> Result<()> {
        self.write_message(&Message::Schema {
            stream,
            schema,
            key_properties,
        })
    }

    /// Write every row of the batch, in order
    pub fn write_records(&mut self, stream: &str, rows: &[Row]) -> Result<()> {
        for record in rows {
            self.write_message(&Message::Record { stream, record })?;
        }
        Ok(())
    }

    /// Write a standalone, indented JSON document
    pub fn write_document<T: Serialize>(&mut self, document: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        writeln!(self.writer, "{}", json).map_err(TapError::Sink)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(TapError::Sink)
    }

    /// Flush and hand back the underlying output
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_line_per_message() {
        let mut buffer = Vec::new();
        let mut writer = MessageWriter::new(&mut buffer);

        writer
            .write_schema("17", &json!({"type": "object"}), &[])
            .unwrap();
        writer
            .write_records("17", &[json!({"id": 1}), json!({"id": 2})])
            .unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "SCHEMA");
        assert_eq!(lines[1]["record"]["id"], 1);
        assert_eq!(lines[2]["record"]["id"], 2);
    }

    #[test]
    fn test_document_is_indented() {
        let mut buffer = Vec::new();
        let mut writer = MessageWriter::new(&mut buffer);
        writer.write_document(&json!({"streams": []})).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\n  \"streams\""));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_write_failure_is_sink_error() {
        let mut writer = MessageWriter::new(BrokenPipe);
        let err = writer
            .write_schema("17", &json!({}), &[])
            .unwrap_err();
        assert!(matches!(err, TapError::Sink(_)));
        assert!(matches!(writer.flush().unwrap_err(), TapError::Sink(_)));
    }
}
