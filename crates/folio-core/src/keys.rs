//! Typed content-key builder.
//!
//! Overridable content is addressed by dotted string keys such as
//! `exp.0.title`. The store treats keys as an opaque flat namespace; the
//! types here make the naming convention explicit so pages, widgets, and
//! the reorder helper agree on it.
//!
//! | Key | Meaning |
//! |---|---|
//! | `hero.title` | a standalone field |
//! | `exp.0.title` | field `title` of item `exp.0` |
//! | `exp_order` | JSON list of item keys for the `exp` collection |
//! | `added_experiences` | JSON list of item keys added at runtime |

use std::fmt;

/// A key identifying one overridable piece of site content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey(String);

impl ContentKey {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ContentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Key of one item inside a reorderable collection (`{prefix}.{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of a field belonging to this item: `{item}.{field}`.
    pub fn field(&self, field: &str) -> ContentKey {
        ContentKey(format!("{}.{field}", self.0))
    }
}

impl AsRef<str> for ItemKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection of items sharing a key prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    pub prefix: &'static str,
    /// Key holding the stored display order.
    pub order_key: &'static str,
    /// Key holding the list of items added at runtime.
    pub added_key: &'static str,
}

impl Collection {
    pub const EXPERIENCE: Collection = Collection {
        prefix: "exp",
        order_key: "exp_order",
        added_key: "added_experiences",
    };

    pub const PROJECTS: Collection = Collection {
        prefix: "proj",
        order_key: "proj_order",
        added_key: "added_projects",
    };

    pub const HOBBIES: Collection = Collection {
        prefix: "hobby",
        order_key: "hobby_order",
        added_key: "added_hobbies",
    };

    pub fn item(&self, id: impl fmt::Display) -> ItemKey {
        ItemKey(format!("{}.{id}", self.prefix))
    }

    pub fn order_key(&self) -> ContentKey {
        ContentKey::new(self.order_key)
    }

    pub fn added_key(&self) -> ContentKey {
        ContentKey::new(self.added_key)
    }

    /// Whether `raw` names an item of this collection.
    pub fn owns(&self, raw: &str) -> bool {
        raw.strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|id| !id.is_empty() && !id.contains('.'))
    }

    /// Parse an item key belonging to this collection.
    pub fn parse_item(&self, raw: &str) -> Option<ItemKey> {
        self.owns(raw).then(|| ItemKey(raw.to_string()))
    }

    pub fn from_prefix(prefix: &str) -> Option<Collection> {
        [Self::EXPERIENCE, Self::PROJECTS, Self::HOBBIES]
            .into_iter()
            .find(|c| c.prefix == prefix)
    }
}

/// Decode a stored JSON list of keys.
///
/// Malformed or non-list values decode as an empty list.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    serde_json::from_str::<Vec<String>>(raw).unwrap_or_default()
}

/// Encode a list of keys for storage.
pub fn encode_key_list<S: AsRef<str>>(keys: &[S]) -> String {
    let keys: Vec<&str> = keys.iter().map(AsRef::as_ref).collect();
    serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())
}
