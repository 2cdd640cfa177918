//! Shelf Core - Domain types
//!
//! This crate provides the foundational types shared by the origin client and
//! the caching server:
//!
//! - [`DatasetBundle`]: an immutable snapshot of every tracked dataset
//! - [`CacheEntry`]: a bundle plus the time it was stored and its TTL
//! - [`Provenance`]: which cache layer satisfied a read
//! - [`Clock`]: injectable wall clock used for every freshness decision
//! - the error taxonomy ([`UpstreamError`], [`ServeError`], [`CoreError`])

pub mod bundle;
pub mod clock;
pub mod entry;
pub mod error;
pub mod provenance;
pub mod types;

pub use bundle::{BundleMeta, DatasetBundle, Row};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use error::{CoreError, Result, ServeError, UpstreamError};
pub use provenance::Provenance;
pub use types::DatasetSet;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
