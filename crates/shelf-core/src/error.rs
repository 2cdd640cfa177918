//! Error types for Shelf.
//!
//! The taxonomy separates recoverable upstream failures, which the cache
//! absorbs by serving older data, from the single terminal failure a caller
//! can observe: [`ServeError::ServiceUnavailable`], returned only when no
//! cache layer holds a bundle of any age.
//!
//! Lock contention during revalidation is deliberately absent here. Losing the
//! race for the revalidation lock is an expected outcome, not an error.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use shelf_core::UpstreamError;
//!
//! let err = UpstreamError::timeout(Duration::from_millis(2500));
//! assert!(err.is_timeout());
//! assert_eq!(err.to_string(), "upstream timed out after 2500ms");
//! ```

use std::time::Duration;
use thiserror::Error;

/// Failure of the expensive upstream call.
///
/// Both variants are recoverable: the read path falls back to stale data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The batched fetch did not complete within its deadline.
    #[error("upstream timed out after {timeout_ms}ms")]
    Timeout {
        /// The deadline that was exceeded, in milliseconds
        timeout_ms: u64,
    },

    /// The upstream answered with a failure, a malformed payload or an
    /// incomplete batch.
    #[error("upstream unavailable: {reason}")]
    Unavailable {
        /// What went wrong
        reason: String,
    },
}

impl UpstreamError {
    /// Creates a Timeout error from the deadline that was exceeded.
    pub fn timeout(deadline: Duration) -> Self {
        Self::Timeout {
            timeout_ms: deadline.as_millis() as u64,
        }
    }

    /// Creates an Unavailable error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if the fetch hit its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Unavailable { .. } => "unavailable",
        }
    }
}

/// Terminal read failure surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServeError {
    /// No layer holds data and the upstream could not provide any.
    #[error("service unavailable: no cached bundle and upstream failed ({cause})")]
    ServiceUnavailable {
        /// The upstream failure that could not be absorbed
        cause: UpstreamError,
    },
}

impl ServeError {
    pub fn service_unavailable(cause: UpstreamError) -> Self {
        Self::ServiceUnavailable { cause }
    }
}

/// Errors raised while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The configured dataset list is unusable.
    #[error("Invalid dataset configuration: {reason}")]
    InvalidDatasets {
        /// Why it's invalid
        reason: String,
    },
}

impl CoreError {
    /// Creates an InvalidDatasets error.
    pub fn invalid_datasets(reason: impl Into<String>) -> Self {
        Self::InvalidDatasets {
            reason: reason.into(),
        }
    }
}

/// Type alias for Results with CoreError.
pub type Result<T> = std::result::Result<T, CoreError>;
