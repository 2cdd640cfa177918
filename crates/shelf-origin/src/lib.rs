//! # Shelf Origin
//!
//! Client side of the one expensive call in the system: a single batched
//! round trip that retrieves every tracked dataset from the upstream
//! spreadsheet store.
//!
//! ## Features
//!
//! - Async trait-based source abstraction ([`DatasetSource`])
//! - Google Sheets `values:batchGet` implementation ([`SheetsSource`])
//! - [`OriginFetcher`]: hard timeout, completeness check, bundle stamping
//!
//! The fetcher never retries and never touches a cache; retry policy belongs
//! to the caller.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use shelf_core::{DatasetSet, SystemClock};
//! use shelf_origin::{OriginFetcher, SheetsConfig, SheetsSource};
//!
//! let config = SheetsConfig::builder()
//!     .spreadsheet_id("1AbC...")
//!     .api_key("secret")
//!     .build()?;
//!
//! let fetcher = OriginFetcher::new(Arc::new(SheetsSource::new(config)?), Arc::new(SystemClock));
//! let datasets = DatasetSet::new(["catalog", "pricing"])?;
//! let bundle = fetcher.fetch_all(&datasets, Duration::from_secs(5)).await?;
//! ```

pub mod error;
pub mod fetcher;
pub mod sheets;
pub mod source;

// Re-exports
pub use error::SourceError;
pub use fetcher::OriginFetcher;
pub use sheets::{SheetsConfig, SheetsConfigBuilder, SheetsSource};
pub use source::{BatchQuery, BatchResult, DatasetSource};

// Re-export shelf_core for consumers
pub use shelf_core;
