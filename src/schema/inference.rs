//! Sample-based schema inference over query result rows
//!
//! Rows are fed to an accumulator that records, per field, the union of type
//! tags observed across the scanned prefix of the result set. The declared
//! schema is built once at the end.

use crate::types::{FieldSchema, FieldType, Properties, Row};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Number of leading rows scanned when no bound is configured
pub const DEFAULT_MAX_SCAN: usize = 100;

/// Accumulates observed field types over a bounded prefix of rows
#[derive(Debug)]
pub struct SchemaInferencer {
    max_scan: usize,
    // Rows offered so far, well-formed or not
    offered: usize,
    // Field name -> non-null types seen, in first-seen field order
    fields: IndexMap<String, BTreeSet<FieldType>>,
}

impl SchemaInferencer {
    pub fn new() -> Self {
        Self::with_max_scan(DEFAULT_MAX_SCAN)
    }

    pub fn with_max_scan(max_scan: usize) -> Self {
        SchemaInferencer {
            max_scan,
            offered: 0,
            fields: IndexMap::new(),
        }
    }

    /// Offer the next row. Rows past the scan bound are ignored, and rows
    /// that are not objects are skipped but still count towards the bound.
    pub fn add_row(&mut self, row: &Row) {
        if self.offered >= self.max_scan {
            return;
        }
        self.offered += 1;

        if let Value::Object(obj) = row {
            self.add_object(obj);
        }
    }

    fn add_object(&mut self, obj: &Map<String, Value>) {
        for (key, value) in obj.iter() {
            let types = self.fields.entry(key.clone()).or_default();
            if let Some(tag) = FieldType::of(value) {
                types.insert(tag);
            }
        }
    }

    /// Build the declared field schemas
    pub fn finish(self) -> Properties {
        self.fields
            .into_iter()
            .map(|(name, types)| {
                let schema = FieldSchema::from_observed(name.clone(), types);
                (name, schema)
            })
            .collect()
    }
}

impl Default for SchemaInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Infer field schemas from the first `max_scan` rows
pub fn infer_properties(rows: &[Row], max_scan: usize) -> Properties {
    let mut inferencer = SchemaInferencer::with_max_scan(max_scan);
    for row in rows.iter().take(max_scan) {
        inferencer.add_row(row);
    }

    let properties = inferencer.finish();
    tracing::debug!(
        rows = rows.len(),
        scanned = rows.len().min(max_scan),
        fields = properties.len(),
        "inferred stream properties"
    );
    properties
}
