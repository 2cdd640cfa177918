//! Diagnostic indicator of which layer satisfied a read.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which cache layer (or the origin) produced the bundle returned by a read.
///
/// Exposed to clients via the `x-cache` header. Consumers should only rely on
/// its category, not on the exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provenance {
    /// Fresh entry from the process-local cache.
    #[serde(rename = "MEM-HIT")]
    MemHit,
    /// Entry from the shared store, not yet aging.
    #[serde(rename = "KV-HIT")]
    KvHit,
    /// Fetched synchronously from the origin.
    #[serde(rename = "MISS")]
    Miss,
    /// Process-local entry served past its freshness window (degraded).
    #[serde(rename = "MEM-STALE")]
    MemStale,
    /// Shared entry that is aging or served as a degraded fallback.
    #[serde(rename = "KV-STALE")]
    KvStale,
}

impl Provenance {
    pub const ALL: [Provenance; 5] = [
        Provenance::MemHit,
        Provenance::KvHit,
        Provenance::Miss,
        Provenance::MemStale,
        Provenance::KvStale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::MemHit => "MEM-HIT",
            Provenance::KvHit => "KV-HIT",
            Provenance::Miss => "MISS",
            Provenance::MemStale => "MEM-STALE",
            Provenance::KvStale => "KV-STALE",
        }
    }

    /// True for reads served from data known to be past its freshness window.
    pub fn is_stale(&self) -> bool {
        matches!(self, Provenance::MemStale | Provenance::KvStale)
    }

    /// True if the bundle came from either cache layer.
    pub fn is_cached(&self) -> bool {
        !matches!(self, Provenance::Miss)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_values() {
        let values: Vec<&str> = Provenance::ALL.iter().map(Provenance::as_str).collect();
        assert_eq!(values, vec!["MEM-HIT", "KV-HIT", "MISS", "MEM-STALE", "KV-STALE"]);
    }

    #[test]
    fn test_serde_matches_display() {
        for p in Provenance::ALL {
            let json = serde_json::to_string(&p).unwrap();
            assert_eq!(json, format!("\"{}\"", p));
        }
    }

    #[test]
    fn test_categories() {
        assert!(Provenance::MemStale.is_stale());
        assert!(Provenance::KvStale.is_stale());
        assert!(!Provenance::KvHit.is_stale());
        assert!(!Provenance::Miss.is_cached());
        assert!(Provenance::MemHit.is_cached());
    }
}
