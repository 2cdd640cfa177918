//! Error types for dataset sources.

use shelf_core::UpstreamError;

/// Errors that can occur when talking to the upstream dataset source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The upstream answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connect, TLS, reset...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("malformed payload: {reason}")]
    Malformed { reason: String },

    /// The response did not carry every requested dataset.
    #[error("incomplete batch, missing datasets: {}", missing.join(", "))]
    IncompleteBatch { missing: Vec<String> },

    /// A timeout occurred while waiting for the upstream.
    #[error("operation timed out after {millis}ms")]
    Timeout { millis: u64 },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    /// Creates a new malformed-payload error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates a new invalid-configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns true if this is a transient error that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout { millis: 0 };
        }
        if err.is_decode() {
            return Self::malformed(err.to_string());
        }
        Self::Transport(err.to_string())
    }
}

impl From<SourceError> for UpstreamError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Timeout { millis } => UpstreamError::Timeout { timeout_ms: millis },
            other => UpstreamError::unavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SourceError::Http {
            status: 503,
            body: "backend error".to_string(),
        };
        assert_eq!(err.to_string(), "upstream returned HTTP 503: backend error");

        let err = SourceError::IncompleteBatch {
            missing: vec!["pricing".to_string(), "categories".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "incomplete batch, missing datasets: pricing, categories"
        );

        let err = SourceError::malformed("expected object");
        assert_eq!(err.to_string(), "malformed payload: expected object");
    }

    #[test]
    fn test_is_transient() {
        assert!(SourceError::Transport("reset".into()).is_transient());
        assert!(SourceError::Timeout { millis: 10 }.is_transient());
        assert!(
            SourceError::Http {
                status: 429,
                body: String::new()
            }
            .is_transient()
        );
        assert!(
            !SourceError::Http {
                status: 403,
                body: String::new()
            }
            .is_transient()
        );
        assert!(!SourceError::malformed("bad").is_transient());
    }

    #[test]
    fn test_into_upstream_error() {
        let up: UpstreamError = SourceError::Timeout { millis: 1500 }.into();
        assert!(up.is_timeout());

        let up: UpstreamError = SourceError::IncompleteBatch {
            missing: vec!["pricing".into()],
        }
        .into();
        assert!(matches!(up, UpstreamError::Unavailable { .. }));
        assert!(up.to_string().contains("pricing"));
    }
}
