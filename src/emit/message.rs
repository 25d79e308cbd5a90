use crate::types::Row;
use serde::Serialize;
use serde_json::Value;

/// Singer protocol messages, one JSON object per output line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message<'a> {
    Schema {
        stream: &'a str,
        schema: &'a Value,
        key_properties: &'a [String],
    },
    Record {
        stream: &'a str,
        record: &'a Row,
    },
}
