pub mod config;
pub mod keys;
pub mod types;

pub use config::{ConfigError, FolioConfig};
pub use keys::{Collection, ContentKey, ItemKey};
pub use types::*;
