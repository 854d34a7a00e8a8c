//! In-process generation store.

use super::asset::CachedAsset;
use super::store::{GenerationMeta, GenerationStore};
use crate::error::{BreachError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Inner {
    /// Versions in staging order.
    order: Vec<String>,
    generations: HashMap<String, HashMap<String, CachedAsset>>,
    current: Option<String>,
}

/// Generation store held in memory, lost when the process exits.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| BreachError::lock_poisoned("memory store"))
    }
}

impl GenerationStore for MemoryStore {
    fn stage(&self, version: &str, assets: &[CachedAsset]) -> Result<()> {
        let entries: HashMap<String, CachedAsset> = assets
            .iter()
            .map(|a| (a.key.clone(), a.clone()))
            .collect();

        let mut inner = self.lock()?;
        if !inner.generations.contains_key(version) {
            inner.order.push(version.to_string());
        }
        inner.generations.insert(version.to_string(), entries);
        Ok(())
    }

    fn activate(&self, version: &str) -> Result<Vec<String>> {
        let mut inner = self.lock()?;
        if !inner.generations.contains_key(version) {
            return Err(BreachError::unavailable(
                format!("cache generation {}", version),
                "it was never staged",
            ));
        }

        let evicted: Vec<String> = inner
            .order
            .iter()
            .filter(|v| v.as_str() != version)
            .cloned()
            .collect();
        for v in &evicted {
            inner.generations.remove(v);
        }
        inner.order = vec![version.to_string()];
        inner.current = Some(version.to_string());
        Ok(evicted)
    }

    fn current(&self) -> Result<Option<String>> {
        Ok(self.lock()?.current.clone())
    }

    fn get(&self, version: &str, key: &str) -> Result<Option<CachedAsset>> {
        Ok(self
            .lock()?
            .generations
            .get(version)
            .and_then(|g| g.get(key))
            .cloned())
    }

    fn put(&self, version: &str, asset: &CachedAsset) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.generations.get_mut(version) {
            Some(generation) => {
                generation.insert(asset.key.clone(), asset.clone());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn versions(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.order.clone())
    }

    fn meta(&self, version: &str) -> Result<Option<GenerationMeta>> {
        let inner = self.lock()?;
        Ok(inner.generations.get(version).map(|g| GenerationMeta {
            version: version.to_string(),
            entry_count: g.len(),
            total_size_bytes: g.values().map(CachedAsset::size_bytes).sum(),
            is_current: inner.current.as_deref() == Some(version),
        }))
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = Inner::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(key: &str, body: &str) -> CachedAsset {
        CachedAsset::new(key, 200, Some("text/plain".into()), body.to_string())
    }

    #[test]
    fn test_stage_does_not_activate() {
        let store = MemoryStore::new();
        store.stage("v1", &[asset("index.html", "one")]).unwrap();
        assert_eq!(store.current().unwrap(), None);
        assert_eq!(store.versions().unwrap(), vec!["v1"]);
    }

    #[test]
    fn test_activate_evicts_others() {
        let store = MemoryStore::new();
        store.stage("v1", &[asset("index.html", "one")]).unwrap();
        store.activate("v1").unwrap();
        store.stage("v2", &[asset("index.html", "two")]).unwrap();
        assert_eq!(store.versions().unwrap(), vec!["v1", "v2"]);

        let evicted = store.activate("v2").unwrap();
        assert_eq!(evicted, vec!["v1"]);
        assert_eq!(store.versions().unwrap(), vec!["v2"]);
        assert_eq!(store.current().unwrap().as_deref(), Some("v2"));
        assert!(store.get("v1", "index.html").unwrap().is_none());
    }

    #[test]
    fn test_activate_unknown_version_fails() {
        let store = MemoryStore::new();
        assert!(store.activate("ghost").is_err());
    }

    #[test]
    fn test_restage_replaces_content() {
        let store = MemoryStore::new();
        store
            .stage("v1", &[asset("index.html", "a"), asset("stats.html", "b")])
            .unwrap();
        store.stage("v1", &[asset("index.html", "c")]).unwrap();

        assert!(store.get("v1", "stats.html").unwrap().is_none());
        assert_eq!(
            store.get("v1", "index.html").unwrap().unwrap().body,
            bytes::Bytes::from("c")
        );
        assert_eq!(store.versions().unwrap(), vec!["v1"]);
    }

    #[test]
    fn test_put_requires_generation() {
        let store = MemoryStore::new();
        assert!(!store.put("v1", &asset("index.html", "x")).unwrap());

        store.stage("v1", &[]).unwrap();
        assert!(store.put("v1", &asset("index.html", "x")).unwrap());
        let meta = store.meta("v1").unwrap().unwrap();
        assert_eq!(meta.entry_count, 1);
        assert_eq!(meta.total_size_bytes, 1);
        assert!(!meta.is_current);
    }
}
