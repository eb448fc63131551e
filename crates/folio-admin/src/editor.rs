//! Server-side editing against an in-process store.

use std::sync::{PoisonError, RwLock};

use folio_core::ContentMap;
use folio_state::{ContentStore, StateResult};
use tracing::debug;

use crate::context::PendingWrite;
use crate::remote::RemoteError;
use crate::source::{ContentEditor, ContentSource};

/// Reads from a snapshot of the store taken at load time and writes
/// synchronously through to the store.
///
/// Unlike the client context, a failed write leaves the snapshot untouched:
/// the store is the authority here.
pub struct StoreEditor {
    store: ContentStore,
    overrides: RwLock<ContentMap>,
    is_admin: bool,
}

impl StoreEditor {
    pub fn load(store: ContentStore, is_admin: bool) -> StateResult<Self> {
        let overrides = store.try_get_all()?;
        Ok(Self {
            store,
            overrides: RwLock::new(overrides),
            is_admin,
        })
    }

    pub fn overrides(&self) -> ContentMap {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ContentSource for StoreEditor {
    fn get_content(&self, key: &str, fallback: &str) -> String {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }
}

impl ContentEditor for StoreEditor {
    fn set_content(&self, key: &str, value: &str) -> PendingWrite {
        let result = self.store.set(key, value).map(|_| {
            self.overrides
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.to_string(), value.to_string());
            debug!(%key, "override written");
        });
        PendingWrite::ready(result.map_err(RemoteError::from))
    }

    fn delete_content(&self, key: &str) -> PendingWrite {
        let result = self.store.delete(key).map(|_| {
            self.overrides
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(key);
            debug!(%key, "override removed");
        });
        PendingWrite::ready(result.map_err(RemoteError::from))
    }
}
