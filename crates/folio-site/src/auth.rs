//! Unlock-cookie checks and builders for server-side handlers.
//!
//! The cookie's presence is the only authorization for writes. It is not
//! `HttpOnly`: the page script in `base.html` polls `document.cookie` and
//! reloads when the unlock state no longer matches the rendered page.

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

/// Whether the request carries the unlock cookie.
pub fn is_unlocked(jar: &CookieJar, cookie_name: &str) -> bool {
    jar.get(cookie_name).is_some_and(|c| c.value() == "true")
}

/// Cookie granting edit mode for `ttl`.
pub fn unlock_cookie(cookie_name: &str, ttl: Duration) -> Cookie<'static> {
    Cookie::build((cookie_name.to_string(), "true"))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(ttl.try_into().unwrap_or_default())
        .build()
}

/// Cookie that removes the unlock cookie.
pub fn lock_cookie(cookie_name: &str) -> Cookie<'static> {
    Cookie::build((cookie_name.to_string(), ""))
        .path("/")
        .same_site(SameSite::Lax)
        .removal()
        .build()
}
