//! Offline cache construction on [`BreachCheck`].

use std::path::Path;
use std::sync::Arc;

use crate::network::OriginFetcher;
use crate::offline::{GenerationStore, MemoryStore, OfflineCache, SqliteStore};
use crate::{BreachCheck, Result};

impl BreachCheck {
    /// Offline cache for the site at `origin`, backed by `store`.
    ///
    /// Shares this instance's HTTP client, so refreshes use the same timeout
    /// and user agent as API calls.
    pub fn offline_cache(
        &self,
        origin: &str,
        store: Arc<dyn GenerationStore>,
    ) -> Result<OfflineCache> {
        let fetcher = OriginFetcher::new(self.http.clone_inner(), origin)?;
        OfflineCache::new(store, Arc::new(fetcher))
    }

    /// Offline cache persisted in a SQLite file.
    pub fn persistent_offline_cache(
        &self,
        origin: &str,
        db_path: impl AsRef<Path>,
    ) -> Result<OfflineCache> {
        self.offline_cache(origin, Arc::new(SqliteStore::new(db_path)?))
    }

    /// Offline cache that lives only as long as this process.
    pub fn ephemeral_offline_cache(&self, origin: &str) -> Result<OfflineCache> {
        self.offline_cache(origin, Arc::new(MemoryStore::new()))
    }
}
