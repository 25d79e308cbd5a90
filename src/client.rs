//! Redash query result retrieval.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::config::TapConfig;
use crate::error::{Result, TapError};
use crate::types::Row;

/// Connect timeout for the results endpoint.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout, including reading the body.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Source of the rows for a query. Returns the complete result set or fails.
pub trait RowSource {
    fn fetch_rows(&self, query_id: &str) -> Result<Vec<Row>>;
}

/// Fetches the latest cached result of a query through the Redash API.
pub struct RedashClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RedashClient {
    pub fn new(config: &TapConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn results_url(&self, query_id: &str) -> String {
        format!("{}/api/queries/{}/results.json", self.base_url, query_id)
    }
}

impl RowSource for RedashClient {
    fn fetch_rows(&self, query_id: &str) -> Result<Vec<Row>> {
        let url = self.results_url(query_id);
        tracing::debug!(%url, "fetching query results");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                // The URL carries the API key
                let e = e.without_url();
                tracing::error!(error = %e, "error fetching Redash query results");
                TapError::Retrieval(e)
            })?;

        let body = response.text().map_err(|e| {
            let e = e.without_url();
            tracing::error!(error = %e, "error reading Redash query results");
            TapError::Retrieval(e)
        })?;

        let payload: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "invalid JSON from Redash results endpoint");
            TapError::PayloadShape(format!("response is not valid JSON: {}", e))
        })?;

        let rows = extract_rows(payload).map_err(|e| {
            tracing::error!(error = %e, "unexpected Redash payload shape");
            e
        })?;
        tracing::debug!(rows = rows.len(), "fetched query results");
        Ok(rows)
    }
}

/// Pull `query_result.data.rows` out of a results payload.
pub fn extract_rows(mut payload: Value) -> Result<Vec<Row>> {
    let rows = payload
        .pointer_mut("/query_result/data/rows")
        .map(Value::take)
        .ok_or_else(|| TapError::PayloadShape("missing query_result.data.rows".to_string()))?;

    match rows {
        Value::Array(rows) => Ok(rows),
        _ => Err(TapError::PayloadShape(
            "query_result.data.rows is not a list".to_string(),
        )),
    }
}
