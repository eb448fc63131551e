//! folio-site — server-rendered portfolio pages.
//!
//! Pages resolve every piece of copy through a [`ContentSource`], so a
//! stored override replaces the compiled-in default wherever it appears.
//! When the request carries the unlock cookie the same pages render edit
//! affordances, and the `/edit/*` form actions write back to the store.
//! Every page load is recorded as a visit.
//!
//! The base template carries a small script that listens for the unlock
//! gestures, posts them to `/api/unlock`, and polls the unlock cookie so
//! pages switch between visitor and admin rendering on their own.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/` | Home (hero, about) |
//! | `/experience` | Reorderable experience list |
//! | `/projects` | Reorderable project list |
//! | `/hobbies` | Reorderable hobby list |
//! | `POST /edit/text` | Commit a text edit |
//! | `POST /edit/image` | Upload an image override |
//! | `POST /edit/reset` | Drop an override |
//! | `POST /edit/reorder` | Move one item of a collection |
//! | `POST /edit/add-item` | Append an item to a collection |
//!
//! [`ContentSource`]: folio_admin::ContentSource

pub mod actions;
pub mod auth;
pub mod content;
pub mod pages;
pub mod views;
pub mod widgets;

use axum::Router;
use axum::routing::{get, post};
use folio_core::FolioConfig;
use folio_core::config::UnlockConfig;
use folio_state::ContentStore;

/// Shared state for site handlers.
#[derive(Clone)]
pub struct SiteState {
    /// `None` when persistence is not configured; pages then show defaults.
    pub store: Option<ContentStore>,
    pub cookie_name: String,
    /// Gesture settings handed to the page script.
    pub unlock: UnlockConfig,
    /// How often the page script re-reads the unlock cookie.
    pub poll_interval_ms: u64,
}

impl SiteState {
    pub fn new(store: Option<ContentStore>, cookie_name: &str) -> Self {
        let defaults = FolioConfig::default();
        Self {
            store,
            cookie_name: cookie_name.to_string(),
            unlock: defaults.unlock,
            poll_interval_ms: defaults.admin.poll_interval_ms,
        }
    }

    pub fn from_config(store: Option<ContentStore>, config: &FolioConfig) -> Self {
        Self {
            store,
            cookie_name: config.admin.cookie_name.clone(),
            unlock: config.unlock.clone(),
            poll_interval_ms: config.admin.poll_interval_ms,
        }
    }
}

/// Build the site router.
pub fn site_router(state: SiteState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/experience", get(pages::experience))
        .route("/projects", get(pages::projects))
        .route("/hobbies", get(pages::hobbies))
        .route("/edit/text", post(actions::edit_text))
        .route("/edit/image", post(actions::edit_image))
        .route("/edit/reset", post(actions::reset))
        .route("/edit/reorder", post(actions::reorder))
        .route("/edit/add-item", post(actions::add_item))
        .with_state(state)
}
