//! Sheets source configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SourceError;

const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// Configuration for the Sheets source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetsConfig {
    /// API root, overridable for tests and proxies.
    #[serde(default = "default_base_url")]
    base_url: String,

    /// The spreadsheet holding the catalog.
    spreadsheet_id: String,

    /// API key sent as the `key` query parameter.
    api_key: String,

    /// Per-dataset A1 ranges; datasets without an entry use their own name.
    #[serde(default)]
    ranges: HashMap<String, String>,

    /// Client-level request timeout (a backstop behind the fetch deadline).
    #[serde(default = "default_request_timeout_ms")]
    request_timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

impl SheetsConfig {
    /// Creates a new builder for SheetsConfig.
    pub fn builder() -> SheetsConfigBuilder {
        SheetsConfigBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the A1 range to request for a dataset.
    pub fn range_for<'a>(&'a self, dataset: &'a str) -> &'a str {
        self.ranges
            .get(dataset)
            .map(String::as_str)
            .unwrap_or(dataset)
    }

    /// URL of the batched values endpoint.
    pub fn batch_get_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}/values:batchGet",
            self.base_url.trim_end_matches('/'),
            self.spreadsheet_id
        )
    }

    /// URL of the spreadsheet metadata endpoint.
    pub fn metadata_url(&self) -> String {
        format!(
            "{}/spreadsheets/{}",
            self.base_url.trim_end_matches('/'),
            self.spreadsheet_id
        )
    }
}

/// Builder for SheetsConfig.
#[derive(Debug, Default)]
pub struct SheetsConfigBuilder {
    base_url: Option<String>,
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
    ranges: HashMap<String, String>,
    request_timeout: Option<Duration>,
}

impl SheetsConfigBuilder {
    /// Overrides the API root.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn spreadsheet_id(mut self, id: impl Into<String>) -> Self {
        self.spreadsheet_id = Some(id.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Maps a dataset name to the range requested for it.
    pub fn range(mut self, dataset: impl Into<String>, range: impl Into<String>) -> Self {
        self.ranges.insert(dataset.into(), range.into());
        self
    }

    /// Sets all dataset ranges at once.
    pub fn ranges(mut self, ranges: HashMap<String, String>) -> Self {
        self.ranges = ranges;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<SheetsConfig, SourceError> {
        let spreadsheet_id = self
            .spreadsheet_id
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SourceError::invalid_config("spreadsheet id is required"))?;
        let api_key = self
            .api_key
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SourceError::invalid_config("api key is required"))?;

        let base_url = self.base_url.unwrap_or_else(default_base_url);
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SourceError::invalid_config(format!(
                "base url must be http(s): {}",
                base_url
            )));
        }

        Ok(SheetsConfig {
            base_url,
            spreadsheet_id,
            api_key,
            ranges: self.ranges,
            request_timeout_ms: self
                .request_timeout
                .map(|d| d.as_millis() as u64)
                .unwrap_or_else(default_request_timeout_ms),
        })
    }
}
