//! Cache module for the Shelf server.
//!
//! Two layers hold the same bundle independently:
//! - [`ProcessLocalCache`]: Moka-backed, one per process, short freshness window
//! - [`SharedCacheStore`]: shared by every worker (Redis or in-memory), longer TTL
//!
//! [`ReadThroughHandler`] walks them in order and falls back to the origin;
//! [`RevalidationCoordinator`] refreshes them in the background.

pub mod coordinator;
pub mod invalidation;
pub mod keys;
pub mod layers;
pub mod local;
pub mod memory;
pub mod policy;
pub mod read_through;
pub mod redis;
pub mod shared;

// Re-exports
pub use coordinator::{RevalidationCoordinator, RevalidationOutcome};
pub use invalidation::{InvalidationResult, Invalidator};
pub use keys::CacheKeys;
pub use layers::CacheLayers;
pub use local::ProcessLocalCache;
pub use memory::MemorySharedStore;
pub use policy::{CachePolicy, PolicyError};
pub use read_through::{ReadOutcome, ReadThroughHandler};
pub use redis::RedisSharedStore;
pub use shared::{SharedCacheStore, StoreError};
