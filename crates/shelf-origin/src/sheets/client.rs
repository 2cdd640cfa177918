//! HTTP client for the Sheets values API.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use super::config::SheetsConfig;
use super::response::BatchGetResponse;
use crate::error::SourceError;
use crate::source::{BatchQuery, BatchResult, DatasetSource};

/// Longest upstream error body kept in a [`SourceError::Http`].
const MAX_ERROR_BODY: usize = 512;

/// Fetches every dataset of a query with one `values:batchGet` call.
///
/// Each dataset maps to one range (see [`SheetsConfig::range_for`]). Rows are
/// returned exactly as the API delivers them.
#[derive(Debug, Clone)]
pub struct SheetsSource {
    config: SheetsConfig,
    client: Client,
}

impl SheetsSource {
    /// Creates a new source with its own HTTP client.
    pub fn new(config: SheetsConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("shelf/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SourceError::invalid_config(format!("http client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Creates a source that reuses an existing HTTP client.
    pub fn with_client(config: SheetsConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &SheetsConfig {
        &self.config
    }

    fn query_params<'a>(&'a self, query: &'a BatchQuery) -> Vec<(&'static str, &'a str)> {
        let mut params: Vec<(&'static str, &str)> = query
            .names()
            .iter()
            .map(|name| ("ranges", self.config.range_for(name)))
            .collect();
        params.push(("majorDimension", "ROWS"));
        params.push(("key", self.config.api_key()));
        params
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        Err(SourceError::Http {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl DatasetSource for SheetsSource {
    #[instrument(skip(self), fields(spreadsheet = %self.config.spreadsheet_id()))]
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<BatchResult, SourceError> {
        debug!(datasets = %query, "Requesting batch from upstream");

        let response = self
            .client
            .get(self.config.batch_get_url())
            .query(&self.query_params(query))
            .send()
            .await?;

        let response = match Self::check_status(response).await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Upstream rejected batch request");
                return Err(e);
            },
        };

        let payload: BatchGetResponse = response.json().await?;
        payload.into_result(query)
    }

    async fn health_check(&self) -> Result<(), SourceError> {
        let response = self
            .client
            .get(self.config.metadata_url())
            .query(&[("key", self.config.api_key()), ("fields", "spreadsheetId")])
            .send()
            .await?;

        Self::check_status(response).await.map(|_| ())
    }

    fn name(&self) -> &str {
        "sheets"
    }
}
