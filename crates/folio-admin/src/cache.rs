//! Local override cache.
//!
//! A single named slot holding the last-known override map as JSON. It is
//! read synchronously at mount so the first paint already shows overrides,
//! and rewritten whenever the map changes. Cache failures only cost the
//! instant paint, so they are logged and otherwise ignored.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use folio_core::ContentMap;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache contents are not an override map: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Synchronous persisted storage for the override map.
pub trait LocalCache: Send + Sync {
    /// Last stored map, or empty if there is none or it is unreadable.
    fn load(&self) -> ContentMap;

    /// Replace the stored map.
    fn store(&self, overrides: &ContentMap);
}

/// JSON file slot on disk.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> Result<ContentMap, CacheError> {
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn try_store(&self, overrides: &ContentMap) -> Result<(), CacheError> {
        let raw = serde_json::to_vec(overrides)?;
        // The slot is replaced atomically via rename.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalCache for FileCache {
    fn load(&self) -> ContentMap {
        match self.try_load() {
            Ok(map) => map,
            Err(CacheError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no local override cache yet");
                ContentMap::new()
            }
            Err(e) => {
                warn!(path = ?self.path, error = %e, "ignoring unreadable override cache");
                ContentMap::new()
            }
        }
    }

    fn store(&self, overrides: &ContentMap) {
        if let Err(e) = self.try_store(overrides) {
            warn!(path = ?self.path, error = %e, "failed to write override cache");
        }
    }
}

/// In-process cache, for tests and hosts without persistent storage.
#[derive(Default)]
pub struct MemoryCache {
    slot: RwLock<ContentMap>,
}

impl MemoryCache {
    pub fn with(overrides: ContentMap) -> Self {
        Self {
            slot: RwLock::new(overrides),
        }
    }
}

impl LocalCache for MemoryCache {
    fn load(&self) -> ContentMap {
        self.slot.read().map(|m| m.clone()).unwrap_or_default()
    }

    fn store(&self, overrides: &ContentMap) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = overrides.clone();
        }
    }
}
