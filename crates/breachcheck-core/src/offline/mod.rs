//! Offline asset cache.
//!
//! Keeps the application shell available without connectivity:
//! - Versioned generations installed all-or-nothing
//! - Activation that evicts every superseded generation
//! - Stale-while-revalidate serving with write-through refresh
//!
//! Generations live behind [`GenerationStore`]; [`MemoryStore`] for a single
//! session, [`SqliteStore`] to persist across restarts.

mod asset;
mod controller;
mod memory;
mod sqlite;
mod store;

pub use asset::{normalize_key, CacheGeneration, CachedAsset};
pub use controller::{
    ActivationReport, CacheStatus, GenerationState, InstallReport, Intercept, OfflineCache,
    RefreshHandle, Served, ServedFrom,
};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{GenerationMeta, GenerationStore};
