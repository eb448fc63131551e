//! ContentStore — redb-backed persistence for content overrides.
//!
//! Provides the flat key → value override table (`get_all`, `set`,
//! `delete`) plus the visit log. Values are JSON-serialized into redb's
//! `&[u8]` value columns. The store supports both on-disk and in-memory
//! backends (the latter for testing).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, warn};

use folio_core::{ContentEntry, ContentMap, epoch_secs};

use crate::error::{StateError, StateResult};
use crate::tables::*;
use crate::types::*;

/// Convert any `Display` error into a `StateError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StateError::$variant(e.to_string())
    };
}

/// Thread-safe content store backed by redb.
#[derive(Clone)]
pub struct ContentStore {
    db: Arc<Database>,
    visit_seq: Arc<AtomicU64>,
}

impl ContentStore {
    /// Open (or create) a persistent content store at the given path.
    pub fn open(path: &Path) -> StateResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self::from_db(db);
        store.ensure_tables()?;
        debug!(?path, "content store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory content store (for testing).
    pub fn open_in_memory() -> StateResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self::from_db(db);
        store.ensure_tables()?;
        debug!("in-memory content store opened");
        Ok(store)
    }

    fn from_db(db: Database) -> Self {
        Self {
            db: Arc::new(db),
            visit_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create all tables if they don't exist yet. Safe to call repeatedly.
    fn ensure_tables(&self) -> StateResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(CONTENT).map_err(map_err!(Table))?;
        txn.open_table(VISITS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    // ── Content ────────────────────────────────────────────────────

    /// Every override as a key → value map.
    ///
    /// Never fails: any storage error is logged and reads as "no overrides",
    /// so pages always fall back to their compiled-in defaults.
    pub fn get_all(&self) -> ContentMap {
        self.try_get_all().unwrap_or_else(|e| {
            warn!(error = %e, "content store unavailable, serving defaults");
            ContentMap::new()
        })
    }

    /// Every override, surfacing storage errors.
    pub fn try_get_all(&self) -> StateResult<ContentMap> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CONTENT).map_err(map_err!(Table))?;
        let mut results = ContentMap::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let entry: ContentEntry =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.insert(entry.key, entry.value);
        }
        Ok(results)
    }

    /// Get a single entry with its timestamp.
    pub fn get_entry(&self, key: &str) -> StateResult<Option<ContentEntry>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(CONTENT).map_err(map_err!(Table))?;
        match table.get(key).map_err(map_err!(Read))? {
            Some(guard) => {
                let entry: ContentEntry =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    /// Insert or overwrite an override. Last write wins; there is no
    /// version check.
    pub fn set(&self, key: &str, value: &str) -> StateResult<ContentEntry> {
        let entry = ContentEntry {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: epoch_secs(),
        };
        let bytes = serde_json::to_vec(&entry).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(CONTENT).map_err(map_err!(Table))?;
            table
                .insert(key, bytes.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, len = value.len(), "content stored");
        Ok(entry)
    }

    /// Delete an override. Returns true if it existed; absence is not an error.
    pub fn delete(&self, key: &str) -> StateResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let existed;
        {
            let mut table = txn.open_table(CONTENT).map_err(map_err!(Table))?;
            existed = table.remove(key).map_err(map_err!(Write))?.is_some();
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, existed, "content deleted");
        Ok(existed)
    }

    // ── Visits ─────────────────────────────────────────────────────

    /// Append a visit to the log.
    pub fn record_visit(&self, visit: &Visit) -> StateResult<()> {
        let seq = self.visit_seq.fetch_add(1, Ordering::Relaxed) % 1_000_000;
        let key = visit.table_key(seq);
        let value = serde_json::to_vec(visit).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(VISITS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Most recent visits, newest first.
    pub fn recent_visits(&self, limit: usize) -> StateResult<Vec<Visit>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(VISITS).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Read))?.rev() {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let visit: Visit =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            results.push(visit);
            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }

    /// Visit totals per path, busiest first.
    pub fn visit_counts(&self) -> StateResult<Vec<PathCount>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(VISITS).map_err(map_err!(Table))?;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for entry in table.iter().map_err(map_err!(Read))? {
            let (_, value) = entry.map_err(map_err!(Read))?;
            let visit: Visit =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            *counts.entry(visit.path).or_default() += 1;
        }
        let mut results: Vec<PathCount> = counts
            .into_iter()
            .map(|(path, visits)| PathCount { path, visits })
            .collect();
        results.sort_by(|a, b| b.visits.cmp(&a.visits).then_with(|| a.path.cmp(&b.path)));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(path: &str, at: u64) -> Visit {
        Visit {
            path: path.to_string(),
            referrer: None,
            at,
        }
    }

    // ── Content ────────────────────────────────────────────────────

    #[test]
    fn set_and_get_all() {
        let store = ContentStore::open_in_memory().unwrap();
        store.set("hero.title", "Hello").unwrap();
        store.set("exp.0.title", "Engineer").unwrap();

        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("hero.title").map(String::as_str), Some("Hello"));
    }

    #[test]
    fn set_overwrites_in_place() {
        let store = ContentStore::open_in_memory().unwrap();
        store.set("hero.title", "Hi").unwrap();
        store.set("hero.title", "Hello").unwrap();

        let entry = store.get_entry("hero.title").unwrap().unwrap();
        assert_eq!(entry.value, "Hello");
        assert!(entry.updated_at > 0);
        assert_eq!(store.get_all().len(), 1);
    }

    #[test]
    fn get_entry_nonexistent_returns_none() {
        let store = ContentStore::open_in_memory().unwrap();
        assert!(store.get_entry("nope").unwrap().is_none());
    }

    #[test]
    fn delete_is_noop_when_absent() {
        let store = ContentStore::open_in_memory().unwrap();
        store.set("x", "1").unwrap();

        assert!(store.delete("x").unwrap());
        assert!(!store.delete("x").unwrap());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn values_are_opaque_strings() {
        let store = ContentStore::open_in_memory().unwrap();
        let order = r#"["exp.2","exp.0"]"#;
        store.set("exp_order", order).unwrap();
        store.set("empty", "").unwrap();

        let all = store.get_all();
        assert_eq!(all["exp_order"], order);
        assert_eq!(all["empty"], "");
    }

    #[test]
    fn empty_store_reads_empty() {
        let store = ContentStore::open_in_memory().unwrap();
        assert!(store.get_all().is_empty());
        assert!(store.try_get_all().unwrap().is_empty());
    }

    // ── Visits ─────────────────────────────────────────────────────

    #[test]
    fn visit_counts_group_by_path() {
        let store = ContentStore::open_in_memory().unwrap();
        store.record_visit(&visit("/", 1000)).unwrap();
        store.record_visit(&visit("/", 1001)).unwrap();
        store.record_visit(&visit("/experience", 1002)).unwrap();

        let counts = store.visit_counts().unwrap();
        assert_eq!(
            counts,
            vec![
                PathCount { path: "/".to_string(), visits: 2 },
                PathCount { path: "/experience".to_string(), visits: 1 },
            ]
        );
    }

    #[test]
    fn same_millisecond_visits_are_kept() {
        let store = ContentStore::open_in_memory().unwrap();
        store.record_visit(&visit("/", 5)).unwrap();
        store.record_visit(&visit("/", 5)).unwrap();
        assert_eq!(store.visit_counts().unwrap()[0].visits, 2);
    }

    #[test]
    fn recent_visits_newest_first() {
        let store = ContentStore::open_in_memory().unwrap();
        for (i, path) in ["/a", "/b", "/c"].iter().enumerate() {
            store.record_visit(&visit(path, 1000 + i as u64)).unwrap();
        }

        let recent = store.recent_visits(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].path, "/c");
        assert_eq!(recent[1].path, "/b");
    }

    // ── Persistence (on-disk) ──────────────────────────────────────

    #[test]
    fn persistence_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.redb");

        {
            let store = ContentStore::open(&db_path).unwrap();
            store.set("hero.title", "Hi").unwrap();
        }

        let store = ContentStore::open(&db_path).unwrap();
        assert_eq!(store.get_all()["hero.title"], "Hi");
    }
}
