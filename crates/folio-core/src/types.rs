//! Shared types used across folio crates.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::UnlockConfig;

/// Resolved override set: content key → value.
///
/// A `BTreeMap` keeps the JSON encoding stable, which matters for the
/// local cache file and for API responses.
pub type ContentMap = BTreeMap<String, String>;

/// A single persisted content override.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentEntry {
    pub key: String,
    pub value: String,
    /// Unix timestamp (seconds) of the last write.
    pub updated_at: u64,
}

/// Body of `PUT /api/content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SetContentRequest {
    pub key: String,
    pub value: String,
}

/// Body of `DELETE /api/content`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteContentRequest {
    pub key: String,
}

/// Response envelope shared by every JSON API route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// The hidden gestures that unlock edit mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UnlockGesture {
    /// Keyboard chord held down simultaneously.
    KeyboardChord,
    /// Rapid tap sequence (touch devices).
    TapSequence,
}

impl UnlockGesture {
    /// How long the unlock cookie lives for this gesture.
    pub fn ttl(self, config: &UnlockConfig) -> Duration {
        match self {
            UnlockGesture::KeyboardChord => Duration::from_secs(config.chord_ttl_secs),
            UnlockGesture::TapSequence => Duration::from_secs(config.tap_ttl_secs),
        }
    }
}

/// Current Unix time in seconds.
pub fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Current Unix time in milliseconds.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gesture_ttls_follow_config() {
        let config = UnlockConfig::default();
        assert_eq!(
            UnlockGesture::KeyboardChord.ttl(&config),
            Duration::from_secs(24 * 60 * 60)
        );
        assert_eq!(
            UnlockGesture::TapSequence.ttl(&config),
            Duration::from_secs(60 * 60)
        );
    }

    #[test]
    fn gesture_serializes_snake_case() {
        let json = serde_json::to_string(&UnlockGesture::TapSequence).unwrap();
        assert_eq!(json, r#""tap_sequence""#);
    }
}
