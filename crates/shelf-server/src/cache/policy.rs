//! Cache timing policy.

use std::time::Duration;

use shelf_core::DatasetSet;
use thiserror::Error;

/// Default local freshness window.
pub const DEFAULT_LOCAL_TTL_SECONDS: u64 = 60;
/// Default shared freshness window.
pub const DEFAULT_SHARED_TTL_SECONDS: u64 = 1800;
/// Default lifetime of the revalidation lock.
pub const DEFAULT_LOCK_TTL_SECONDS: u64 = 30;
/// Default aging threshold as a fraction of the total TTL.
pub const DEFAULT_REVALIDATE_RATIO: f64 = 0.5;
/// Default origin deadline.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(8);
/// Default retention of stale local entries.
pub const DEFAULT_LOCAL_RETENTION_SECONDS: u64 = 86_400;
/// Default key prefix in the shared store.
pub const DEFAULT_KEY_PREFIX: &str = "shelf:bootstrap";

/// Every tunable the read path and revalidation share.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use shelf_core::DatasetSet;
/// use shelf_server::cache::CachePolicy;
///
/// let policy = CachePolicy::new(DatasetSet::new(["catalog"]).unwrap())
///     .with_local_ttl(30)
///     .with_fetch_timeout(Duration::from_secs(2));
///
/// assert_eq!(policy.local_ttl_seconds, 30);
/// assert_eq!(policy.shared_ttl_seconds, 1800);
/// ```
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Datasets fetched in every origin call, in response order.
    pub datasets: DatasetSet,
    pub key_prefix: String,
    pub local_ttl_seconds: u64,
    pub shared_ttl_seconds: u64,
    pub lock_ttl_seconds: u64,
    /// An entry is aging once less than this fraction of its TTL remains.
    pub revalidate_ratio: f64,
    pub fetch_timeout: Duration,
    /// How long the local layer keeps entries after they stop being fresh.
    pub local_retention: Duration,
}

impl CachePolicy {
    pub fn new(datasets: DatasetSet) -> Self {
        Self {
            datasets,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            local_ttl_seconds: DEFAULT_LOCAL_TTL_SECONDS,
            shared_ttl_seconds: DEFAULT_SHARED_TTL_SECONDS,
            lock_ttl_seconds: DEFAULT_LOCK_TTL_SECONDS,
            revalidate_ratio: DEFAULT_REVALIDATE_RATIO,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            local_retention: Duration::from_secs(DEFAULT_LOCAL_RETENTION_SECONDS),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_local_ttl(mut self, seconds: u64) -> Self {
        self.local_ttl_seconds = seconds;
        self
    }

    pub fn with_shared_ttl(mut self, seconds: u64) -> Self {
        self.shared_ttl_seconds = seconds;
        self
    }

    pub fn with_lock_ttl(mut self, seconds: u64) -> Self {
        self.lock_ttl_seconds = seconds;
        self
    }

    pub fn with_revalidate_ratio(mut self, ratio: f64) -> Self {
        self.revalidate_ratio = ratio;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_local_retention(mut self, retention: Duration) -> Self {
        self.local_retention = retention;
        self
    }

    /// Checks the invariants between the tunables.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.local_ttl_seconds == 0 || self.shared_ttl_seconds == 0 {
            return Err(PolicyError::ZeroTtl("cache"));
        }
        if self.lock_ttl_seconds == 0 {
            return Err(PolicyError::ZeroTtl("lock"));
        }
        if !(self.revalidate_ratio > 0.0 && self.revalidate_ratio <= 1.0) {
            return Err(PolicyError::RatioOutOfRange(self.revalidate_ratio));
        }
        if self.fetch_timeout.is_zero() {
            return Err(PolicyError::ZeroTtl("origin timeout"));
        }
        // Un lock que expira a mitad del fetch deja entrar a otro worker.
        if Duration::from_secs(self.lock_ttl_seconds) < self.fetch_timeout {
            return Err(PolicyError::LockShorterThanFetch {
                lock_ttl_seconds: self.lock_ttl_seconds,
                fetch_timeout_ms: self.fetch_timeout.as_millis() as u64,
            });
        }
        if self.local_retention < Duration::from_secs(self.local_ttl_seconds) {
            return Err(PolicyError::RetentionShorterThanTtl);
        }
        if self.key_prefix.trim().trim_end_matches(':').is_empty() {
            return Err(PolicyError::EmptyKeyPrefix);
        }
        Ok(())
    }
}

/// Inconsistent cache tunables.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("{0} TTL must be greater than zero")]
    ZeroTtl(&'static str),

    #[error("revalidate ratio must be in (0, 1], got {0}")]
    RatioOutOfRange(f64),

    #[error(
        "lock TTL ({lock_ttl_seconds}s) must cover the origin timeout ({fetch_timeout_ms}ms)"
    )]
    LockShorterThanFetch {
        lock_ttl_seconds: u64,
        fetch_timeout_ms: u64,
    },

    #[error("local retention cannot be shorter than the local TTL")]
    RetentionShorterThanTtl,

    #[error("cache key prefix cannot be empty")]
    EmptyKeyPrefix,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> CachePolicy {
        CachePolicy::new(DatasetSet::new(["catalog"]).unwrap())
    }

    #[test]
    fn test_defaults_are_valid() {
        let p = policy();
        assert!(p.validate().is_ok());
        assert_eq!(p.local_ttl_seconds, 60);
        assert_eq!(p.lock_ttl_seconds, 30);
        assert_eq!(p.fetch_timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_ratio_bounds() {
        assert!(policy().with_revalidate_ratio(0.0).validate().is_err());
        assert_eq!(
            policy().with_revalidate_ratio(1.5).validate(),
            Err(PolicyError::RatioOutOfRange(1.5))
        );
        assert!(policy().with_revalidate_ratio(f64::NAN).validate().is_err());
        assert!(policy().with_revalidate_ratio(1.0).validate().is_ok());
    }

    #[test]
    fn test_zero_ttls_rejected() {
        assert!(policy().with_local_ttl(0).validate().is_err());
        assert!(policy().with_lock_ttl(0).validate().is_err());
        assert!(
            policy()
                .with_fetch_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_lock_must_outlive_fetch() {
        let p = policy()
            .with_lock_ttl(5)
            .with_fetch_timeout(Duration::from_secs(8));
        assert_eq!(
            p.validate(),
            Err(PolicyError::LockShorterThanFetch {
                lock_ttl_seconds: 5,
                fetch_timeout_ms: 8000,
            })
        );

        assert!(
            policy()
                .with_lock_ttl(8)
                .with_fetch_timeout(Duration::from_secs(8))
                .validate()
                .is_ok()
        );
        assert!(
            policy()
                .with_lock_ttl(8)
                .with_fetch_timeout(Duration::from_millis(8001))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_retention_covers_freshness() {
        let p = policy()
            .with_local_ttl(120)
            .with_local_retention(Duration::from_secs(60));
        assert_eq!(p.validate(), Err(PolicyError::RetentionShorterThanTtl));
    }
}
