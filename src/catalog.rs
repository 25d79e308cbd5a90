//! Discovery artifacts and externally supplied catalogs

use crate::types::{Properties, StreamSchema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Structural descriptor of the stream: its id, schema body and key properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub stream: String,
    pub tap_stream_id: String,
    pub schema: Value,
    #[serde(default)]
    pub key_properties: Vec<String>,
}

impl StreamEntry {
    pub fn stream_id(&self) -> &str {
        &self.tap_stream_id
    }
}

impl From<StreamSchema> for StreamEntry {
    fn from(schema: StreamSchema) -> Self {
        StreamEntry {
            stream: schema.stream_id.clone(),
            tap_stream_id: schema.stream_id.clone(),
            schema: schema.json_schema(),
            key_properties: schema.key_properties,
        }
    }
}

/// Discovery output: one entry, since each invocation extracts one stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<StreamEntry>,
}

impl Catalog {
    pub fn single(entry: StreamEntry) -> Self {
        Catalog {
            streams: vec![entry],
        }
    }
}

/// Assemble the discovery artifact for a stream. Pure.
pub fn build_discovery_artifact(
    stream_id: &str,
    properties: Properties,
    key_properties: &[String],
) -> StreamEntry {
    StreamSchema::new(stream_id, properties, key_properties.to_vec()).into()
}

/// A catalog handed to sync mode from outside, after validation
#[derive(Debug, Clone, PartialEq)]
pub enum SuppliedCatalog {
    /// Nothing was supplied
    Absent,
    /// Something was supplied but it is unusable; the reason is kept for logging
    Malformed(String),
    /// A usable stream entry
    Valid(StreamEntry),
}

impl SuppliedCatalog {
    /// Read a supplied catalog file. A file that cannot be read or parsed is
    /// reported as malformed rather than failing the run.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Self {
        let Some(path) = path else {
            return SuppliedCatalog::Absent;
        };
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                return SuppliedCatalog::Malformed(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                ))
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(value) => Self::from_value(&value),
            Err(e) => {
                SuppliedCatalog::Malformed(format!("{} is not valid JSON: {}", path.display(), e))
            }
        }
    }

    /// Validate a supplied catalog. Accepts either a bare stream entry or a
    /// catalog whose first `streams` element is one. An entry must carry a
    /// stream identifier and a schema object; anything else is rejected whole.
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(obj) = value else {
            return SuppliedCatalog::Malformed("catalog is not a JSON object".to_string());
        };

        let entry = match obj.get("streams") {
            Some(Value::Array(streams)) => match streams.first() {
                Some(Value::Object(entry)) => entry,
                Some(_) => {
                    return SuppliedCatalog::Malformed(
                        "first catalog stream is not an object".to_string(),
                    )
                }
                None => return SuppliedCatalog::Malformed("catalog has no streams".to_string()),
            },
            Some(_) => {
                return SuppliedCatalog::Malformed("catalog streams is not a list".to_string())
            }
            None => obj,
        };

        match entry_from_object(entry) {
            Ok(entry) => SuppliedCatalog::Valid(entry),
            Err(reason) => SuppliedCatalog::Malformed(reason),
        }
    }

    /// Use the supplied entry if valid, otherwise build a fresh one
    pub fn resolve<F>(self, fresh: F) -> StreamEntry
    where
        F: FnOnce() -> StreamEntry,
    {
        match self {
            SuppliedCatalog::Valid(entry) => {
                tracing::debug!(stream = %entry.stream_id(), "using supplied catalog");
                entry
            }
            SuppliedCatalog::Malformed(reason) => {
                tracing::warn!(%reason, "invalid or missing properties provided; regenerating schema");
                fresh()
            }
            SuppliedCatalog::Absent => fresh(),
        }
    }
}

fn entry_from_object(entry: &Map<String, Value>) -> Result<StreamEntry, String> {
    let stream_id = ["tap_stream_id", "stream"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .ok_or_else(|| "stream entry has no stream identifier".to_string())?;

    let schema = match entry.get("schema") {
        Some(schema @ Value::Object(_)) => schema.clone(),
        Some(_) => return Err("stream schema is not an object".to_string()),
        None => return Err("stream entry has no schema".to_string()),
    };

    let stream = entry
        .get("stream")
        .and_then(Value::as_str)
        .unwrap_or(stream_id)
        .to_string();

    let key_properties = entry
        .get("key_properties")
        .and_then(Value::as_array)
        .and_then(|keys| {
            keys.iter()
                .map(|k| k.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .unwrap_or_default();

    Ok(StreamEntry {
        stream,
        tap_stream_id: stream_id.to_string(),
        schema,
        key_properties,
    })
}
