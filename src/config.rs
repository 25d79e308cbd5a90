//! Tap configuration
//!
//! Read once at startup from a Singer-style JSON config file and passed by
//! reference to the row source and the stream runner.

use crate::error::{Result, TapError};
use crate::schema::DEFAULT_MAX_SCAN;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;

#[derive(Clone, Deserialize)]
pub struct TapConfig {
    /// Base URL of the Redash instance
    #[serde(rename = "BASE_URL")]
    pub base_url: String,

    /// User or query API key
    #[serde(rename = "API_KEY")]
    pub api_key: String,

    /// Query to extract; also the stream id
    #[serde(rename = "QUERY_ID", deserialize_with = "string_or_number")]
    pub query_id: String,

    /// Fields that uniquely identify a record. Anything other than a list of
    /// strings is treated as no key.
    #[serde(default, deserialize_with = "lenient_key_properties")]
    pub key_properties: Vec<String>,

    /// Number of leading rows scanned for schema inference
    #[serde(default = "default_max_scan")]
    pub max_scan: usize,
}

fn default_max_scan() -> usize {
    DEFAULT_MAX_SCAN
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, found {}",
            other
        ))),
    }
}

fn lenient_key_properties<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let keys = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Option<Vec<_>>>(),
        _ => None,
    };

    Ok(keys.unwrap_or_else(|| {
        tracing::warn!("key_properties is not a list of field names; ignoring it");
        Vec::new()
    }))
}

impl TapConfig {
    /// Load the config file at `path`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| TapError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: TapConfig =
            serde_json::from_str(content).map_err(|e| TapError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(TapError::Config("BASE_URL must not be empty".to_string()));
        }
        if self.query_id.trim().is_empty() {
            return Err(TapError::Config("QUERY_ID must not be empty".to_string()));
        }
        Ok(())
    }
}

impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("query_id", &self.query_id)
            .field("key_properties", &self.key_properties)
            .field("max_scan", &self.max_scan)
            .finish()
    }
}
