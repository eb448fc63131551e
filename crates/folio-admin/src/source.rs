//! Read and write capabilities of the override system.

use folio_core::ContentMap;

use crate::context::PendingWrite;

/// Resolves content keys and reports whether edit affordances are allowed.
///
/// Implemented by the live [`AdminContext`](crate::AdminContext) and by
/// [`Snapshot`], the frozen per-request view a server renders from.
pub trait ContentSource {
    /// `overrides[key]` if present, otherwise `fallback`.
    fn get_content(&self, key: &str, fallback: &str) -> String;

    fn is_admin(&self) -> bool;
}

/// A [`ContentSource`] that can also persist overrides.
///
/// The live [`AdminContext`](crate::AdminContext) writes optimistically
/// through its remote; [`StoreEditor`](crate::StoreEditor) writes straight
/// to an in-process store for server-side edit actions.
pub trait ContentEditor: ContentSource {
    fn set_content(&self, key: &str, value: &str) -> PendingWrite;

    fn delete_content(&self, key: &str) -> PendingWrite;
}

/// An immutable override map plus admin flag.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub overrides: ContentMap,
    pub is_admin: bool,
}

impl Snapshot {
    pub fn new(overrides: ContentMap, is_admin: bool) -> Self {
        Self {
            overrides,
            is_admin,
        }
    }
}

impl ContentSource for Snapshot {
    fn get_content(&self, key: &str, fallback: &str) -> String {
        self.overrides
            .get(key)
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_falls_back_for_missing_keys() {
        let mut overrides = ContentMap::new();
        overrides.insert("hero.title".to_string(), "Hi".to_string());
        let snap = Snapshot::new(overrides, false);

        assert_eq!(snap.get_content("hero.title", "Default"), "Hi");
        assert_eq!(snap.get_content("hero.subtitle", "Default"), "Default");
        assert!(!snap.is_admin());
    }
}
