//! Persisted types that live only in the store.

use serde::{Deserialize, Serialize};

/// A single recorded page view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
    /// Unix timestamp (milliseconds).
    pub at: u64,
}

impl Visit {
    pub fn table_key(&self, seq: u64) -> String {
        format!("{:020}:{seq:06}", self.at)
    }
}

/// Aggregated visit count for one path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathCount {
    pub path: String,
    pub visits: u64,
}
