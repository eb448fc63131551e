//! Unlock cookie.
//!
//! Edit mode is authorized by nothing more than the presence of a
//! time-limited boolean cookie. The [`CookieJar`] is the client-side slot
//! holding it; gesture detectors write it and the admin context polls it.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use folio_core::epoch_millis;
use tracing::info;

/// Anything that can answer "is the unlock cookie present right now?".
pub trait UnlockProbe: Send + Sync {
    fn is_unlocked(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UnlockCookie {
    /// Unix timestamp (milliseconds) after which the cookie is gone.
    expires_at: u64,
}

/// Shared, cloneable holder for the unlock cookie.
#[derive(Debug, Clone)]
pub struct CookieJar {
    name: Arc<str>,
    cookie: Arc<RwLock<Option<UnlockCookie>>>,
}

impl CookieJar {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            cookie: Arc::new(RwLock::new(None)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the cookie for `ttl` from now.
    pub fn unlock(&self, ttl: Duration) {
        self.unlock_at(epoch_millis(), ttl);
    }

    pub fn unlock_at(&self, now_ms: u64, ttl: Duration) {
        let expires_at = now_ms.saturating_add(ttl.as_millis() as u64);
        if let Ok(mut slot) = self.cookie.write() {
            *slot = Some(UnlockCookie { expires_at });
        }
        info!(cookie = %self.name, ttl_secs = ttl.as_secs(), "unlock cookie set");
    }

    /// Remove the cookie (manual lock).
    pub fn clear(&self) {
        if let Ok(mut slot) = self.cookie.write() {
            *slot = None;
        }
    }

    pub fn is_unlocked_at(&self, now_ms: u64) -> bool {
        self.cookie
            .read()
            .map(|slot| slot.as_ref().is_some_and(|c| now_ms < c.expires_at))
            .unwrap_or(false)
    }

    /// `Cookie` header value to send with admin writes, if unlocked.
    pub fn header_value(&self) -> Option<String> {
        self.is_unlocked().then(|| format!("{}=true", self.name))
    }
}

impl UnlockProbe for CookieJar {
    fn is_unlocked(&self) -> bool {
        self.is_unlocked_at(epoch_millis())
    }
}
