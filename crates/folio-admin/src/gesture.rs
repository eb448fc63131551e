//! Hidden unlock gestures.
//!
//! Two independent detectors, fed raw input events by the host: a keyboard
//! chord and a rapid tap sequence. Either one, on completion, writes the
//! shared unlock cookie with its own lifetime. Neither knows about the
//! other or about the admin context; the context notices the cookie on its
//! next poll.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use folio_core::UnlockGesture;
use folio_core::config::UnlockConfig;
use tracing::info;

use crate::cookie::CookieJar;

/// The configured chord with repeated keys dropped, in first-seen order.
///
/// Also used to hand the chord to the page script, so both sides agree on
/// what completes it.
pub fn chord_keys(config: &UnlockConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    config
        .chord
        .iter()
        .filter(|key| !key.is_empty() && seen.insert(key.as_str()))
        .cloned()
        .collect()
}

/// Fires when every key of the chord is held at once.
pub struct ChordDetector {
    chord: Vec<String>,
    held: HashSet<String>,
    /// Cleared after firing until a chord key is released.
    armed: bool,
    ttl: Duration,
    jar: CookieJar,
}

impl ChordDetector {
    pub fn new(config: &UnlockConfig, jar: CookieJar) -> Self {
        Self {
            chord: chord_keys(config),
            held: HashSet::new(),
            armed: true,
            ttl: UnlockGesture::KeyboardChord.ttl(config),
            jar,
        }
    }

    /// Map a physical key code to the chord entry it satisfies, if any.
    /// `ShiftLeft` and `ShiftRight` both satisfy `Shift`.
    fn chord_entry(&self, code: &str) -> Option<String> {
        let base = code
            .strip_suffix("Left")
            .or_else(|| code.strip_suffix("Right"))
            .unwrap_or(code);
        self.chord
            .iter()
            .find(|entry| entry.as_str() == code || entry.as_str() == base)
            .cloned()
    }

    /// Returns true if this key press completed the chord.
    pub fn key_down(&mut self, code: &str) -> bool {
        let Some(entry) = self.chord_entry(code) else {
            return false;
        };
        self.held.insert(entry);
        if !self.armed || self.chord.is_empty() || self.held.len() < self.chord.len() {
            return false;
        }
        self.armed = false;
        self.jar.unlock(self.ttl);
        info!(gesture = "keyboard_chord", "unlock gesture detected");
        true
    }

    pub fn key_up(&mut self, code: &str) {
        if let Some(entry) = self.chord_entry(code) {
            self.held.remove(&entry);
            self.armed = true;
        }
    }
}

/// Fires after N taps, each within the window of the previous one.
pub struct TapDetector {
    required: u32,
    window: Duration,
    count: u32,
    last: Option<Instant>,
    ttl: Duration,
    jar: CookieJar,
}

impl TapDetector {
    pub fn new(config: &UnlockConfig, jar: CookieJar) -> Self {
        Self {
            required: config.tap_count.max(1),
            window: Duration::from_millis(config.tap_window_ms),
            count: 0,
            last: None,
            ttl: UnlockGesture::TapSequence.ttl(config),
            jar,
        }
    }

    pub fn tap(&mut self) -> bool {
        self.tap_at(Instant::now())
    }

    /// Returns true if this tap completed the sequence.
    pub fn tap_at(&mut self, at: Instant) -> bool {
        let in_window = self
            .last
            .is_some_and(|prev| at.saturating_duration_since(prev) <= self.window);
        self.count = if in_window { self.count + 1 } else { 1 };
        self.last = Some(at);

        if self.count < self.required {
            return false;
        }
        self.count = 0;
        self.last = None;
        self.jar.unlock(self.ttl);
        info!(gesture = "tap_sequence", "unlock gesture detected");
        true
    }
}
