//! folio.toml configuration parser.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub server: ServerConfig,
    pub admin: AdminConfig,
    pub unlock: UnlockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("/var/lib/folio"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub cookie_name: String,
    pub poll_interval_ms: u64,
    pub cache_file: PathBuf,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            cookie_name: "folio_admin".to_string(),
            poll_interval_ms: 1500,
            cache_file: PathBuf::from("folio-content-cache.json"),
        }
    }
}

impl AdminConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockConfig {
    /// Key codes that must be held together.
    pub chord: Vec<String>,
    pub chord_ttl_secs: u64,
    pub tap_count: u32,
    /// Maximum gap between consecutive taps.
    pub tap_window_ms: u64,
    pub tap_ttl_secs: u64,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            chord: vec![
                "Control".to_string(),
                "Shift".to_string(),
                "KeyE".to_string(),
            ],
            chord_ttl_secs: 24 * 60 * 60,
            tap_count: 5,
            tap_window_ms: 600,
            tap_ttl_secs: 60 * 60,
        }
    }
}

impl FolioConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Path of the redb database inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.server.data_dir.join("folio.redb")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: FolioConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.admin.cookie_name, "folio_admin");
        assert_eq!(config.admin.poll_interval(), Duration::from_millis(1500));
        assert_eq!(config.unlock.tap_count, 5);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let toml_str = r#"
[server]
port = 9000

[unlock]
tap_count = 3
"#;
        let config: FolioConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.data_dir, PathBuf::from("/var/lib/folio"));
        assert_eq!(config.unlock.tap_count, 3);
        assert_eq!(config.unlock.tap_window_ms, 600);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = FolioConfig::default();
        let rendered = config.to_toml_string().unwrap();
        assert!(rendered.contains("folio_admin"));
        let parsed: FolioConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.unlock.chord, config.unlock.chord);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = FolioConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn db_path_lives_in_data_dir() {
        let mut config = FolioConfig::default();
        config.server.data_dir = PathBuf::from("/tmp/folio");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/folio/folio.redb"));
    }
}
