//! Drag-reorder helper.
//!
//! A collection's custom order is stored as a JSON list of item keys under
//! its order key. The stored list can be stale (items removed or added
//! since it was written) or not valid JSON at all, so the visible order is
//! always *reconciled*: stored keys that still exist come first, in stored
//! order, followed by every other item in its original relative order.
//! The result is a permutation of the current items.

use std::collections::HashMap;

use folio_core::ContentKey;
use folio_core::keys::{encode_key_list, parse_key_list};
use tracing::debug;

use crate::context::PendingWrite;
use crate::source::{ContentEditor, ContentSource};

/// Merge a stored key order with the current item set.
pub fn reconcile<T, F>(items: Vec<T>, key_of: F, stored: &[String]) -> Vec<T>
where
    F: Fn(&T) -> String,
{
    let mut position: HashMap<String, usize> = HashMap::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        position.entry(key_of(item)).or_insert(idx);
    }

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(slots.len());

    for key in stored {
        if let Some(item) = position.get(key).and_then(|&idx| slots[idx].take()) {
            ordered.push(item);
        }
    }
    ordered.extend(slots.into_iter().flatten());
    ordered
}

/// Move `dragged` to `target` within `order`.
///
/// The key is spliced out first and then inserted at `target`, clamped to
/// the end of the list. Returns `None` if `dragged` is not in `order`.
pub fn move_key(order: &[String], dragged: &str, target: usize) -> Option<Vec<String>> {
    let from = order.iter().position(|k| k == dragged)?;
    let mut next = order.to_vec();
    let key = next.remove(from);
    let to = target.min(next.len());
    next.insert(to, key);
    Some(next)
}

/// Reorder support for one collection, bound to its order key.
#[derive(Debug, Clone)]
pub struct ReorderList {
    order_key: ContentKey,
}

impl ReorderList {
    pub fn new(order_key: impl Into<ContentKey>) -> Self {
        Self {
            order_key: order_key.into(),
        }
    }

    pub fn order_key(&self) -> &ContentKey {
        &self.order_key
    }

    /// The stored order, or empty if missing or malformed.
    pub fn stored_order(&self, source: &impl ContentSource) -> Vec<String> {
        parse_key_list(&source.get_content(self.order_key.as_str(), ""))
    }

    /// `items` in their reconciled display order.
    pub fn ordered<T, F>(&self, source: &impl ContentSource, items: Vec<T>, key_of: F) -> Vec<T>
    where
        F: Fn(&T) -> String,
    {
        reconcile(items, key_of, &self.stored_order(source))
    }

    /// Drop `dragged` at `target` and persist the full resulting order.
    ///
    /// `visible` is the key list currently on screen. Non-admins and
    /// unknown keys get `None` and nothing is written.
    pub fn move_to(
        &self,
        ctx: &impl ContentEditor,
        visible: &[String],
        dragged: &str,
        target: usize,
    ) -> Option<PendingWrite> {
        if !ctx.is_admin() {
            return None;
        }
        let next = move_key(visible, dragged, target)?;
        debug!(order_key = %self.order_key, %dragged, target, "persisting reorder");
        Some(ctx.set_content(self.order_key.as_str(), &encode_key_list(&next)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use folio_core::ContentMap;
    use folio_state::ContentStore;

    use crate::cache::MemoryCache;
    use crate::context::AdminContext;
    use crate::cookie::CookieJar;
    use crate::remote::StoreRemote;
    use crate::source::Snapshot;

    fn keys(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn ident(s: &String) -> String {
        s.clone()
    }

    #[test]
    fn stored_prefix_then_new_items() {
        let result = reconcile(keys(&["a", "b", "c"]), ident, &keys(&["c", "a"]));
        assert_eq!(result, keys(&["c", "a", "b"]));
    }

    #[test]
    fn empty_order_is_identity() {
        let result = reconcile(keys(&["a", "b", "c"]), ident, &[]);
        assert_eq!(result, keys(&["a", "b", "c"]));
    }

    #[test]
    fn stale_and_duplicate_keys_are_dropped() {
        let result = reconcile(
            keys(&["a", "b"]),
            ident,
            &keys(&["gone", "b", "b", "a", "also-gone"]),
        );
        assert_eq!(result, keys(&["b", "a"]));
    }

    #[test]
    fn duplicate_item_keys_are_all_kept() {
        let result = reconcile(keys(&["a", "a", "b"]), ident, &keys(&["b", "a"]));
        assert_eq!(result, keys(&["b", "a", "a"]));
    }

    #[test]
    fn malformed_stored_order_is_ignored() {
        let mut overrides = ContentMap::new();
        overrides.insert("exp_order".to_string(), "[not json".to_string());
        let snap = Snapshot::new(overrides, false);
        let list = ReorderList::new("exp_order");

        let result = list.ordered(&snap, keys(&["a", "b"]), ident);
        assert_eq!(result, keys(&["a", "b"]));
    }

    #[test]
    fn move_key_splices_then_inserts() {
        let order = keys(&["a", "b", "c", "d"]);
        assert_eq!(move_key(&order, "a", 2).unwrap(), keys(&["b", "c", "a", "d"]));
        assert_eq!(move_key(&order, "d", 0).unwrap(), keys(&["d", "a", "b", "c"]));
        assert_eq!(move_key(&order, "b", 99).unwrap(), keys(&["a", "c", "d", "b"]));
        assert!(move_key(&order, "zz", 0).is_none());
    }

    fn context(jar: &CookieJar, store: &ContentStore) -> AdminContext {
        AdminContext::new(
            Arc::new(MemoryCache::default()),
            Arc::new(StoreRemote::new(store.clone())),
            Arc::new(jar.clone()),
            Duration::from_millis(10),
        )
    }

    #[tokio::test]
    async fn admin_drop_persists_full_order() {
        let store = ContentStore::open_in_memory().unwrap();
        let jar = CookieJar::new("folio_admin");
        jar.unlock(Duration::from_secs(60));
        let ctx = context(&jar, &store);
        ctx.mount();
        ctx.wait_synced().await;

        let list = ReorderList::new("exp_order");
        let visible = list.ordered(&ctx, keys(&["exp.0", "exp.1", "exp.2"]), ident);
        list.move_to(&ctx, &visible, "exp.2", 0)
            .unwrap()
            .await
            .unwrap();

        assert_eq!(list.stored_order(&ctx), keys(&["exp.2", "exp.0", "exp.1"]));
        assert_eq!(store.get_all()["exp_order"], r#"["exp.2","exp.0","exp.1"]"#);
        ctx.unmount();
    }

    #[tokio::test]
    async fn non_admin_cannot_reorder() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = context(&CookieJar::new("folio_admin"), &store);
        ctx.mount();

        let list = ReorderList::new("exp_order");
        assert!(list.move_to(&ctx, &keys(&["a", "b"]), "b", 0).is_none());
        assert!(store.get_all().is_empty());
        ctx.unmount();
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn reconcile_is_permutation(
                items in proptest::collection::hash_set("[a-f]{1,2}", 0..12),
                stored in proptest::collection::vec("[a-h]{1,2}", 0..16),
            ) {
                let items: Vec<String> = items.into_iter().collect();
                let result = reconcile(items.clone(), ident, &stored);

                prop_assert_eq!(result.len(), items.len());
                let mut sorted_in = items.clone();
                let mut sorted_out = result.clone();
                sorted_in.sort();
                sorted_out.sort();
                prop_assert_eq!(sorted_in, sorted_out);
            }

            #[test]
            fn unordered_items_keep_relative_order(
                items in proptest::collection::hash_set("[a-f]{1,2}", 0..12),
                stored in proptest::collection::vec("[a-h]{1,2}", 0..16),
            ) {
                let items: Vec<String> = items.into_iter().collect();
                let result = reconcile(items.clone(), ident, &stored);

                let tail: Vec<&String> = result.iter().filter(|k| !stored.contains(k)).collect();
                let expected: Vec<&String> = items.iter().filter(|k| !stored.contains(k)).collect();
                prop_assert_eq!(tail, expected);
            }
        }
    }
}
