//! Decoding of the `values:batchGet` payload.

use serde::Deserialize;

use crate::error::SourceError;
use crate::source::{BatchQuery, BatchResult};

/// Top-level `values:batchGet` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchGetResponse {
    #[serde(default)]
    pub spreadsheet_id: Option<String>,

    #[serde(default)]
    pub value_ranges: Vec<ValueRange>,
}

/// One requested range.
///
/// Sheets omits `values` entirely for an empty range.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,

    #[serde(default)]
    pub major_dimension: Option<String>,

    #[serde(default)]
    pub values: Vec<serde_json::Value>,
}

impl BatchGetResponse {
    /// Maps value ranges back to dataset names.
    ///
    /// Ranges come back in request order. Fewer ranges than requested means an
    /// incomplete batch; more means the payload does not belong to this query.
    pub fn into_result(self, query: &BatchQuery) -> Result<BatchResult, SourceError> {
        let requested = query.names();

        if self.value_ranges.len() < requested.len() {
            let missing = requested[self.value_ranges.len()..].to_vec();
            return Err(SourceError::IncompleteBatch { missing });
        }

        if self.value_ranges.len() > requested.len() {
            return Err(SourceError::malformed(format!(
                "expected {} value ranges, got {}",
                requested.len(),
                self.value_ranges.len()
            )));
        }

        let mut result = BatchResult::new();
        for (name, range) in requested.iter().zip(self.value_ranges) {
            if let Some(dim) = range.major_dimension.as_deref() {
                if dim != "ROWS" {
                    return Err(SourceError::malformed(format!(
                        "dataset '{}' returned {} major dimension",
                        name, dim
                    )));
                }
            }
            result.insert(name.clone(), range.values);
        }

        Ok(result)
    }
}
