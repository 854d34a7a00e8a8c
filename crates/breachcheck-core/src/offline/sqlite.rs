//! SQLite-backed generation store.

use super::asset::CachedAsset;
use super::store::{GenerationMeta, GenerationStore};
use crate::error::{BreachError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Generation store persisted in a single SQLite database.
///
/// Survives restarts the way browser cache storage does. Thread-safe via
/// internal mutex on the connection; staging and activation each run in one
/// transaction.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at the specified database path.
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BreachError::Io {
                message: format!("Failed to create cache directory: {}", e),
                path: Some(parent.to_path_buf()),
                source: Some(e),
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| BreachError::Database {
            message: format!("Failed to open offline cache database: {}", e),
            source: Some(e),
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| BreachError::Database {
                message: format!("Failed to set pragmas: {}", e),
                source: Some(e),
            })?;

        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS generations (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                version TEXT NOT NULL UNIQUE,
                is_current INTEGER NOT NULL DEFAULT 0,
                staged_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS assets (
                version TEXT NOT NULL,
                key TEXT NOT NULL,
                status INTEGER NOT NULL,
                content_type TEXT,
                body BLOB NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (version, key)
            );
            "#,
        )
        .map_err(|e| BreachError::Database {
            message: format!("Failed to initialize offline cache schema: {}", e),
            source: Some(e),
        })?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| BreachError::lock_poisoned("offline cache database"))
    }
}

fn insert_asset(conn: &Connection, version: &str, asset: &CachedAsset) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO assets (version, key, status, content_type, body, cached_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(version, key) DO UPDATE SET
            status = ?3,
            content_type = ?4,
            body = ?5,
            cached_at = ?6
        "#,
        params![
            version,
            asset.key,
            asset.status,
            asset.content_type,
            asset.body.as_ref(),
            asset.cached_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl GenerationStore for SqliteStore {
    fn stage(&self, version: &str, assets: &[CachedAsset]) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT OR IGNORE INTO generations (version, staged_at) VALUES (?1, ?2)",
            params![version, Utc::now().to_rfc3339()],
        )?;
        tx.execute("DELETE FROM assets WHERE version = ?1", params![version])?;
        for asset in assets {
            insert_asset(&tx, version, asset)?;
        }

        tx.commit()?;
        debug!("Staged {} assets under {}", assets.len(), version);
        Ok(())
    }

    fn activate(&self, version: &str) -> Result<Vec<String>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let exists: Option<i64> = tx
            .query_row(
                "SELECT seq FROM generations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Err(BreachError::unavailable(
                format!("cache generation {}", version),
                "it was never staged",
            ));
        }

        let mut evicted: Vec<String> = Vec::new();
        {
            let mut stmt =
                tx.prepare("SELECT version FROM generations WHERE version != ?1 ORDER BY seq")?;
            let rows = stmt.query_map(params![version], |row| row.get(0))?;
            for row in rows {
                evicted.push(row?);
            }
        }

        tx.execute("DELETE FROM assets WHERE version != ?1", params![version])?;
        tx.execute("DELETE FROM generations WHERE version != ?1", params![version])?;
        tx.execute(
            "UPDATE generations SET is_current = 1 WHERE version = ?1",
            params![version],
        )?;

        tx.commit()?;
        Ok(evicted)
    }

    fn current(&self) -> Result<Option<String>> {
        let conn = self.lock()?;
        Ok(conn
            .query_row(
                "SELECT version FROM generations WHERE is_current = 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn get(&self, version: &str, key: &str) -> Result<Option<CachedAsset>> {
        let conn = self.lock()?;
        let row: Option<(u16, Option<String>, Vec<u8>, String)> = conn
            .query_row(
                r#"
                SELECT status, content_type, body, cached_at
                FROM assets
                WHERE version = ?1 AND key = ?2
                "#,
                params![version, key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()
            .map_err(|e| BreachError::Database {
                message: format!("Failed to query cached asset: {}", e),
                source: Some(e),
            })?;

        let Some((status, content_type, body, cached_at)) = row else {
            return Ok(None);
        };
        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| BreachError::Database {
                message: format!("Corrupt cached_at '{}' for {}/{}: {}", cached_at, version, key, e),
                source: None,
            })?;

        Ok(Some(CachedAsset {
            key: key.to_string(),
            status,
            content_type,
            body: body.into(),
            cached_at,
        }))
    }

    fn put(&self, version: &str, asset: &CachedAsset) -> Result<bool> {
        let conn = self.lock()?;
        let exists: Option<i64> = conn
            .query_row(
                "SELECT seq FROM generations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()?;
        if exists.is_none() {
            return Ok(false);
        }
        insert_asset(&conn, version, asset)?;
        Ok(true)
    }

    fn versions(&self) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT version FROM generations ORDER BY seq")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut versions = Vec::new();
        for row in rows {
            versions.push(row?);
        }
        Ok(versions)
    }

    fn meta(&self, version: &str) -> Result<Option<GenerationMeta>> {
        let conn = self.lock()?;
        let is_current: Option<bool> = conn
            .query_row(
                "SELECT is_current FROM generations WHERE version = ?1",
                params![version],
                |row| row.get(0),
            )
            .optional()?;
        let Some(is_current) = is_current else {
            return Ok(None);
        };

        let (count, size): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(LENGTH(body)), 0) FROM assets WHERE version = ?1",
            params![version],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(Some(GenerationMeta {
            version: version.to_string(),
            entry_count: count as usize,
            total_size_bytes: size as u64,
            is_current,
        }))
    }

    fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM assets; DELETE FROM generations;")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn asset(key: &str, body: &str) -> CachedAsset {
        CachedAsset::new(key, 200, Some("text/html".into()), body.to_string())
    }

    #[test]
    fn test_roundtrip_asset() {
        let store = SqliteStore::in_memory().unwrap();
        store.stage("bc-v1", &[asset("index.html", "<html>")]).unwrap();

        let cached = store.get("bc-v1", "index.html").unwrap().unwrap();
        assert_eq!(cached.status, 200);
        assert_eq!(cached.content_type.as_deref(), Some("text/html"));
        assert_eq!(cached.body, bytes::Bytes::from("<html>"));
        assert!(store.get("bc-v1", "missing.html").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_timestamp_is_an_error() {
        let store = SqliteStore::in_memory().unwrap();
        store.stage("bc-v1", &[asset("index.html", "<html>")]).unwrap();
        store
            .lock()
            .unwrap()
            .execute("UPDATE assets SET cached_at = 'yesterday'", [])
            .unwrap();

        let err = store.get("bc-v1", "index.html").unwrap_err();
        assert!(matches!(err, BreachError::Database { .. }));
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn test_activation_converges_to_one_generation() {
        let store = SqliteStore::in_memory().unwrap();
        for n in 1..=4 {
            let version = format!("bc-v{}", n);
            store.stage(&version, &[asset("index.html", &version)]).unwrap();
            store.activate(&version).unwrap();
        }
        assert_eq!(store.versions().unwrap(), vec!["bc-v4"]);
        assert_eq!(store.current().unwrap().as_deref(), Some("bc-v4"));
    }

    #[test]
    fn test_activate_reports_evicted_in_order() {
        let store = SqliteStore::in_memory().unwrap();
        store.stage("a", &[]).unwrap();
        store.stage("b", &[]).unwrap();
        store.stage("c", &[]).unwrap();
        assert_eq!(store.activate("c").unwrap(), vec!["a", "b"]);
        assert!(store.activate("a").is_err());
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("cache").join("offline.db");

        {
            let store = SqliteStore::new(&db_path).unwrap();
            store.stage("bc-v2", &[asset("stats.html", "stats")]).unwrap();
            store.activate("bc-v2").unwrap();
        }

        let store = SqliteStore::new(&db_path).unwrap();
        assert_eq!(store.current().unwrap().as_deref(), Some("bc-v2"));
        let meta = store.meta("bc-v2").unwrap().unwrap();
        assert_eq!(meta.entry_count, 1);
        assert_eq!(meta.total_size_bytes, 5);
        assert!(meta.is_current);
    }

    #[test]
    fn test_put_overwrites_and_skips_unknown() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.put("nope", &asset("index.html", "x")).unwrap());

        store.stage("v", &[asset("index.html", "old")]).unwrap();
        assert!(store.put("v", &asset("index.html", "new")).unwrap());
        assert_eq!(
            store.get("v", "index.html").unwrap().unwrap().body,
            bytes::Bytes::from("new")
        );
    }

    #[test]
    fn test_clear() {
        let store = SqliteStore::in_memory().unwrap();
        store.stage("v", &[asset("index.html", "x")]).unwrap();
        store.activate("v").unwrap();
        store.clear().unwrap();
        assert!(store.versions().unwrap().is_empty());
        assert!(store.current().unwrap().is_none());
    }
}
