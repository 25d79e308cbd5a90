//! # tap-redash - Singer tap for a single Redash query
//!
//! Fetches the result set of one stored Redash query and republishes it as a
//! Singer stream: a schema declaration followed by the records.
//!
//! ## Modules
//!
//! - **schema**: Infer a per-field type union from a sample of rows
//! - **emit**: Write the discovery catalog or SCHEMA + RECORD messages
//! - **catalog**: Discovery artifacts and validation of supplied catalogs
//! - **client**: Row retrieval from the Redash API
//!
//! ## Quick Start
//!
//! ```rust
//! use tap_redash::schema::infer_properties;
//! use serde_json::json;
//!
//! let rows = vec![
//!     json!({"id": 1, "amt": 10.5}),
//!     json!({"id": 2, "amt": "N/A"}),
//! ];
//!
//! let properties = infer_properties(&rows, 100);
//! assert_eq!(properties["amt"].type_names(), vec!["null", "number", "string"]);
//! ```

use std::io::Write;

pub mod catalog;
pub mod client;
pub mod config;
pub mod emit;
pub mod error;
pub mod schema;
pub mod types;

// Re-export commonly used types for convenience
pub use catalog::{build_discovery_artifact, Catalog, StreamEntry, SuppliedCatalog};
pub use client::{RedashClient, RowSource};
pub use config::TapConfig;
pub use emit::StreamEmitter;
pub use error::{Result, TapError};
pub use schema::{infer_properties, SchemaInferencer};
pub use types::{FieldSchema, FieldType, Properties, Row, StreamSchema};

/// What a run writes to its output
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    /// Print the catalog and stop
    Discover,
    /// Print the schema and records, using the supplied catalog when valid
    Sync(SuppliedCatalog),
}

/// Fetch the configured query, infer its schema and write the output for
/// `mode` to `sink`. The sink is flushed before returning successfully.
pub fn run<S, W>(config: &TapConfig, source: &S, mode: Mode, sink: W) -> Result<W>
where
    S: RowSource + ?Sized,
    W: Write,
{
    let rows = source.fetch_rows(&config.query_id)?;
    tracing::info!(stream = %config.query_id, rows = rows.len(), "fetched rows");

    let fresh_entry = || {
        build_discovery_artifact(
            &config.query_id,
            infer_properties(&rows, config.max_scan),
            &config.key_properties,
        )
    };

    let mut emitter = StreamEmitter::new(sink);
    match mode {
        Mode::Discover => {
            emitter.discover(&Catalog::single(fresh_entry()))?;
        }
        Mode::Sync(supplied) => {
            let entry = supplied.resolve(fresh_entry);
            emitter.emit(&entry, &rows)?;
        }
    }
    emitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::BufWriter;

    struct FixedRows(Vec<Row>);

    impl RowSource for FixedRows {
        fn fetch_rows(&self, _query_id: &str) -> Result<Vec<Row>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl RowSource for FailingSource {
        fn fetch_rows(&self, _query_id: &str) -> Result<Vec<Row>> {
            Err(TapError::PayloadShape("missing query_result.data.rows".to_string()))
        }
    }

    fn config() -> TapConfig {
        TapConfig::from_json(r#"{"BASE_URL": "http://r", "API_KEY": "k", "QUERY_ID": "17"}"#)
            .unwrap()
    }

    #[test]
    fn test_discover_mode() {
        let source = FixedRows(vec![json!({"id": 1})]);
        let output = run(&config(), &source, Mode::Discover, Vec::new()).unwrap();

        let catalog: Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(catalog["streams"][0]["tap_stream_id"], "17");
        assert_eq!(
            catalog["streams"][0]["schema"]["properties"]["id"]["type"],
            json!(["null", "number"])
        );
    }

    #[test]
    fn test_sync_mode() {
        let source = FixedRows(vec![json!({"id": 1}), json!({"id": 2})]);
        let output = run(&config(), &source, Mode::Sync(SuppliedCatalog::Absent), Vec::new())
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let types: Vec<String> = output
            .lines()
            .map(|line| serde_json::from_str::<Value>(line).unwrap()["type"].to_string())
            .collect();
        assert_eq!(types, vec!["\"SCHEMA\"", "\"RECORD\"", "\"RECORD\""]);
    }

    fn buffered_sink() -> BufWriter<Vec<u8>> {
        BufWriter::with_capacity(1 << 16, Vec::new())
    }

    #[test]
    fn test_discover_flushes_sink() {
        let source = FixedRows(vec![json!({"id": 1})]);
        let sink = run(&config(), &source, Mode::Discover, buffered_sink()).unwrap();

        assert!(sink.buffer().is_empty());
        let catalog: Value = serde_json::from_slice(sink.get_ref()).unwrap();
        assert_eq!(catalog["streams"][0]["stream"], "17");
    }

    #[test]
    fn test_sync_flushes_sink() {
        let source = FixedRows(vec![json!({"id": 1}), json!({"id": 2})]);
        let sink = run(&config(), &source, Mode::Sync(SuppliedCatalog::Absent), buffered_sink())
            .unwrap();

        assert!(sink.buffer().is_empty());
        assert_eq!(String::from_utf8_lossy(sink.get_ref()).lines().count(), 3);
    }

    #[test]
    fn test_sync_without_rows_flushes_sink() {
        let source = FixedRows(vec![]);
        let sink = run(&config(), &source, Mode::Sync(SuppliedCatalog::Absent), buffered_sink())
            .unwrap();

        assert!(sink.buffer().is_empty());
        let output = String::from_utf8_lossy(sink.get_ref()).into_owned();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains("\"SCHEMA\""));
    }

    #[test]
    fn test_source_failure_propagates() {
        let err = run(&config(), &FailingSource, Mode::Discover, Vec::new()).unwrap_err();
        assert!(matches!(err, TapError::PayloadShape(_)));
    }
}
