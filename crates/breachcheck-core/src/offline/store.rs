//! Generation store trait and types.

use super::asset::CachedAsset;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Per-generation statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationMeta {
    pub version: String,
    pub entry_count: usize,
    pub total_size_bytes: u64,
    pub is_current: bool,
}

/// Versioned resource storage: generation id → set of resource blobs.
///
/// `stage` and `activate` are atomic: a reader sees either the previous
/// content or the complete new content, never a mix. All operations are
/// synchronous to match rusqlite's API.
pub trait GenerationStore: Send + Sync {
    /// Replace the full content of `version` with `assets` in one step.
    ///
    /// Does not change which generation is current.
    fn stage(&self, version: &str, assets: &[CachedAsset]) -> Result<()>;

    /// Make `version` current and delete every other generation.
    ///
    /// Returns the evicted versions. Fails if `version` was never staged.
    fn activate(&self, version: &str) -> Result<Vec<String>>;

    /// The current generation, if any has been activated.
    fn current(&self) -> Result<Option<String>>;

    /// Look up one resource.
    fn get(&self, version: &str, key: &str) -> Result<Option<CachedAsset>>;

    /// Insert or overwrite one resource of an existing generation.
    ///
    /// Returns false (and stores nothing) when the generation does not exist.
    fn put(&self, version: &str, asset: &CachedAsset) -> Result<bool>;

    /// All stored generations, oldest first.
    fn versions(&self) -> Result<Vec<String>>;

    /// Statistics for one generation.
    fn meta(&self, version: &str) -> Result<Option<GenerationMeta>>;

    /// Drop every generation.
    fn clear(&self) -> Result<()>;
}
