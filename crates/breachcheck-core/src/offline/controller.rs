//! Offline cache controller: install, activate, serve.
//!
//! Install fetches a whole [`CacheGeneration`] and stages it only if every
//! asset arrived. Activation makes it current and evicts all other
//! generations. Serving answers GET requests stale-while-revalidate: a cached
//! copy is returned at once while a spawned task refreshes it from the
//! network.

use super::asset::{normalize_key, CacheGeneration, CachedAsset};
use super::store::{GenerationMeta, GenerationStore};
use crate::network::DynFetcher;
use crate::{BreachError, Result};
use futures::future::join_all;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Lifecycle of one generation as seen by this controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    Installing,
    /// Staged, waiting for activation.
    Installed,
    Active,
    Superseded,
    /// Install aborted before anything was stored.
    Failed,
}

impl std::fmt::Display for GenerationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationState::Installing => write!(f, "installing"),
            GenerationState::Installed => write!(f, "installed"),
            GenerationState::Active => write!(f, "active"),
            GenerationState::Superseded => write!(f, "superseded"),
            GenerationState::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallReport {
    pub version: String,
    pub asset_count: usize,
    pub total_size_bytes: u64,
}

/// Outcome of an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationReport {
    pub version: String,
    /// Generations evicted by this activation.
    pub superseded: Vec<String>,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
}

/// Background refresh started for a cache hit. Resolves to the network
/// result; awaiting it is optional.
pub type RefreshHandle = JoinHandle<Result<CachedAsset>>;

/// A response produced by [`OfflineCache::serve`].
#[derive(Debug)]
pub struct Served {
    pub asset: CachedAsset,
    pub from: ServedFrom,
    /// Present on cache hits only.
    pub refresh: Option<RefreshHandle>,
}

/// Result of routing a request through the controller.
#[derive(Debug)]
pub enum Intercept {
    Served(Served),
    /// Not a GET: the caller must send the request to the network itself.
    PassThrough,
}

/// Snapshot of the controller for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStatus {
    pub current: Option<GenerationMeta>,
    pub generations: Vec<String>,
    pub states: HashMap<String, GenerationState>,
}

/// Controls the offline asset bundle for one session.
pub struct OfflineCache {
    store: Arc<dyn GenerationStore>,
    fetcher: DynFetcher,
    states: Mutex<HashMap<String, GenerationState>>,
}

impl OfflineCache {
    /// Create a controller over an existing store.
    ///
    /// A generation already current in the store is reported as active.
    pub fn new(store: Arc<dyn GenerationStore>, fetcher: DynFetcher) -> Result<Self> {
        let mut states = HashMap::new();
        if let Some(current) = store.current()? {
            debug!("Resuming with cache generation {}", current);
            states.insert(current, GenerationState::Active);
        }
        Ok(Self {
            store,
            fetcher,
            states: Mutex::new(states),
        })
    }

    pub fn store(&self) -> &Arc<dyn GenerationStore> {
        &self.store
    }

    /// The generation currently answering requests.
    pub fn current_version(&self) -> Result<Option<String>> {
        self.store.current()
    }

    /// Lifecycle state of a generation, if this controller has seen it.
    pub fn generation_state(&self, version: &str) -> Option<GenerationState> {
        self.states
            .lock()
            .ok()
            .and_then(|s| s.get(version).copied())
    }

    pub fn status(&self) -> Result<CacheStatus> {
        let current = match self.store.current()? {
            Some(v) => self.store.meta(&v)?,
            None => None,
        };
        Ok(CacheStatus {
            current,
            generations: self.store.versions()?,
            states: self
                .states
                .lock()
                .map(|s| s.clone())
                .unwrap_or_default(),
        })
    }

    fn set_state(&self, version: &str, state: GenerationState) {
        if let Ok(mut states) = self.states.lock() {
            states.insert(version.to_string(), state);
        }
    }

    fn restore_state(&self, version: &str, previous: Option<GenerationState>) {
        if let Ok(mut states) = self.states.lock() {
            states.insert(
                version.to_string(),
                previous.unwrap_or(GenerationState::Failed),
            );
        }
    }

    /// Fetch and stage every asset of `generation`.
    ///
    /// All-or-nothing: if any asset fails to fetch or comes back with a
    /// non-success status, nothing is stored and the current generation is
    /// left untouched.
    pub async fn install(&self, generation: &CacheGeneration) -> Result<InstallReport> {
        let version = generation.version.as_str();
        info!(
            "Installing cache generation {} ({} assets)",
            version,
            generation.assets.len()
        );
        let previous = self.generation_state(version);
        self.set_state(version, GenerationState::Installing);

        let results = join_all(
            generation
                .assets
                .iter()
                .map(|key| async move { (key, self.fetcher.fetch(key).await) }),
        )
        .await;

        let mut assets = Vec::with_capacity(results.len());
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(asset) if asset.is_success() => assets.push(asset),
                Ok(asset) => {
                    warn!("Install of {}: {} returned HTTP {}", version, key, asset.status);
                    failed.push(key.clone());
                }
                Err(e) => {
                    warn!("Install of {}: {} failed: {}", version, key, e);
                    failed.push(key.clone());
                }
            }
        }

        if !failed.is_empty() {
            self.restore_state(version, previous);
            return Err(BreachError::InstallFailure {
                version: version.to_string(),
                failed,
            });
        }

        if let Err(e) = self.store.stage(version, &assets) {
            self.restore_state(version, previous);
            return Err(e);
        }

        let report = InstallReport {
            version: version.to_string(),
            asset_count: assets.len(),
            total_size_bytes: assets.iter().map(CachedAsset::size_bytes).sum(),
        };
        // Re-installing the current version keeps it active.
        if self.store.current()?.as_deref() == Some(version) {
            self.set_state(version, GenerationState::Active);
        } else {
            self.set_state(version, GenerationState::Installed);
        }
        info!(
            "Installed cache generation {} ({} bytes)",
            version, report.total_size_bytes
        );
        Ok(report)
    }

    /// Make an installed generation current and evict every other one.
    pub async fn activate(&self, version: &str) -> Result<ActivationReport> {
        let superseded = self.store.activate(version)?;
        if let Ok(mut states) = self.states.lock() {
            for state in states.values_mut() {
                if *state == GenerationState::Active {
                    *state = GenerationState::Superseded;
                }
            }
            for old in &superseded {
                states.insert(old.clone(), GenerationState::Superseded);
            }
            states.insert(version.to_string(), GenerationState::Active);
        }

        if !superseded.is_empty() {
            info!(
                "Activated cache generation {}, evicted {}",
                version,
                superseded.join(", ")
            );
        } else {
            info!("Activated cache generation {}", version);
        }

        Ok(ActivationReport {
            version: version.to_string(),
            superseded,
        })
    }

    /// Install then activate. The previous generation stays current if the
    /// install fails.
    pub async fn install_and_activate(
        &self,
        generation: &CacheGeneration,
    ) -> Result<ActivationReport> {
        self.install(generation).await?;
        self.activate(&generation.version).await
    }

    /// Route a request: GETs are served, everything else passes through.
    pub async fn handle(&self, method: &Method, path: &str) -> Result<Intercept> {
        if *method != Method::GET {
            return Ok(Intercept::PassThrough);
        }
        self.serve(path).await.map(Intercept::Served)
    }

    /// Serve a GET request stale-while-revalidate.
    ///
    /// The network fetch always starts. A cached copy is returned without
    /// waiting for it; otherwise the network result is awaited and a transport
    /// failure becomes [`BreachError::ResourceUnavailable`]. A path the fetcher
    /// refuses to resolve stays [`BreachError::InvalidInput`].
    pub async fn serve(&self, path: &str) -> Result<Served> {
        let key = normalize_key(path);

        let cached = match self.store.current() {
            Ok(Some(version)) => self.store.get(&version, &key).unwrap_or_else(|e| {
                warn!("Cache lookup for {} failed: {}", key, e);
                None
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Cache lookup for {} failed: {}", key, e);
                None
            }
        };

        let refresh = self.spawn_refresh(key.clone());

        if let Some(asset) = cached {
            debug!("Cache hit for {}", key);
            return Ok(Served {
                asset,
                from: ServedFrom::Cache,
                refresh: Some(refresh),
            });
        }

        debug!("Cache miss for {}, waiting on network", key);
        match refresh.await {
            Ok(Ok(asset)) => Ok(Served {
                asset,
                from: ServedFrom::Network,
                refresh: None,
            }),
            Ok(Err(e @ BreachError::InvalidInput { .. })) => Err(e),
            Ok(Err(e)) => Err(BreachError::unavailable(key, e)),
            Err(e) => Err(BreachError::unavailable(key, e)),
        }
    }

    /// Fetch `key` and write a successful result through to whichever
    /// generation is current when the response arrives.
    fn spawn_refresh(&self, key: String) -> RefreshHandle {
        let fetcher = Arc::clone(&self.fetcher);
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let result = fetcher.fetch(&key).await;
            match &result {
                Ok(asset) if asset.is_success() => write_through(store.as_ref(), asset),
                Ok(asset) => debug!("Not caching {} (HTTP {})", key, asset.status),
                Err(e) => warn!("Background refresh of {} failed: {}", key, e),
            }
            result
        })
    }

    /// Drop every stored generation.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        if let Ok(mut states) = self.states.lock() {
            states.clear();
        }
        Ok(())
    }
}

fn write_through(store: &dyn GenerationStore, asset: &CachedAsset) {
    let version = match store.current() {
        Ok(Some(v)) => v,
        Ok(None) => {
            debug!("No active generation, {} not cached", asset.key);
            return;
        }
        Err(e) => {
            warn!("Cannot refresh {}: {}", asset.key, e);
            return;
        }
    };
    match store.put(&version, asset) {
        Ok(true) => debug!("Refreshed {} in {}", asset.key, version),
        Ok(false) => debug!("Generation {} vanished before refresh of {}", version, asset.key),
        Err(e) => warn!("Cannot refresh {}: {}", asset.key, e),
    }
}
