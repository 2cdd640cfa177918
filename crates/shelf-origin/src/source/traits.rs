//! Dataset source trait definition.

use async_trait::async_trait;

use super::{BatchQuery, BatchResult};
use crate::error::SourceError;

/// A source of catalog datasets.
///
/// This trait abstracts over the upstream transport so the caching layer can
/// fetch datasets without knowing how they are stored.
///
/// # Implementors
///
/// - `SheetsSource` - Fetches ranges from a Google spreadsheet
///
/// # Example
///
/// ```ignore
/// use shelf_origin::{BatchQuery, BatchResult, DatasetSource, SourceError};
///
/// struct StaticSource;
///
/// #[async_trait]
/// impl DatasetSource for StaticSource {
///     async fn fetch_batch(&self, query: &BatchQuery) -> Result<BatchResult, SourceError> {
///         let mut result = BatchResult::new();
///         for name in query.names() {
///             result.insert(name.clone(), Vec::new());
///         }
///         Ok(result)
///     }
///
///     async fn health_check(&self) -> Result<(), SourceError> {
///         Ok(())
///     }
///
///     fn name(&self) -> &str {
///         "static"
///     }
/// }
/// ```
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetches every dataset named by the query in a single round trip.
    ///
    /// Implementations must not retry internally and must not fan out into one
    /// call per dataset.
    ///
    /// # Errors
    ///
    /// - `SourceError::Http` for a non-success upstream status
    /// - `SourceError::Malformed` if the payload cannot be decoded
    /// - `SourceError::IncompleteBatch` if datasets are missing from the answer
    async fn fetch_batch(&self, query: &BatchQuery) -> Result<BatchResult, SourceError>;

    /// Verifies that the upstream is reachable and properly configured.
    async fn health_check(&self) -> Result<(), SourceError>;

    /// Returns the name of this source, used for logging.
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DatasetSource({})", self.name())
    }
}
