use crate::catalog::{Catalog, StreamEntry};
use crate::emit::writer::MessageWriter;
use crate::error::Result;
use crate::types::Row;
use std::io::Write;

/// Emits the discovery catalog or the schema + records stream to one sink
pub struct StreamEmitter<W: Write> {
    writer: MessageWriter<W>,
}

impl<W: Write> StreamEmitter<W> {
    pub fn new(sink: W) -> Self {
        StreamEmitter {
            writer: MessageWriter::new(sink),
        }
    }

    /// Write the catalog as a single indented JSON document
    pub fn discover(&mut self, catalog: &Catalog) -> Result<()> {
        self.writer.write_document(catalog)
    }

    /// Write one SCHEMA message, then the records if there are any:
    /// one RECORD line per row, in a single uninterrupted batch after the schema.
    pub fn emit(&mut self, entry: &StreamEntry, rows: &[Row]) -> Result<()> {
        let stream = entry.stream_id();
        self.writer
            .write_schema(stream, &entry.schema, &entry.key_properties)?;

        if rows.is_empty() {
            tracing::info!(%stream, "no rows returned; wrote schema only");
            return Ok(());
        }

        self.writer.write_records(stream, rows)?;
        tracing::info!(%stream, rows = rows.len(), "wrote records");
        Ok(())
    }

    /// Flush everything written so far and release the sink
    pub fn finish(self) -> Result<W> {
        self.writer.into_inner()
    }
}
