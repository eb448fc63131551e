//! redb table definitions for the folio content store.

use redb::TableDefinition;

/// Content overrides keyed by content key; values are JSON `ContentEntry`.
pub const CONTENT: TableDefinition<&str, &[u8]> = TableDefinition::new("content");

/// Page visits keyed by `{epoch_millis:020}:{seq:06}` so iteration is chronological.
pub const VISITS: TableDefinition<&str, &[u8]> = TableDefinition::new("visits");
