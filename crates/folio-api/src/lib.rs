//! folio-api — content API for the portfolio site.
//!
//! Serves the override map to the in-page runtime, accepts writes from
//! unlocked sessions, and mounts the server-rendered site at the root.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/api/content` | Full override map |
//! | PUT | `/api/content` | Upsert one override (unlock cookie required) |
//! | DELETE | `/api/content` | Remove one override (unlock cookie required) |
//! | POST | `/api/unlock` | Set the unlock cookie for a gesture |
//! | POST | `/api/lock` | Clear the unlock cookie |
//! | POST | `/api/visits` | Record a page visit |
//! | GET | `/api/visits/stats` | Visit counts per path |
//! | GET | `/health` | Liveness |

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use folio_core::FolioConfig;
use folio_core::config::UnlockConfig;
use folio_state::ContentStore;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    /// `None` when persistence is not configured.
    pub store: Option<ContentStore>,
    pub cookie_name: String,
    pub unlock: UnlockConfig,
}

/// Build the complete router (content API + site pages).
pub fn build_router(store: Option<ContentStore>, config: &FolioConfig) -> Router {
    let api_state = ApiState {
        store: store.clone(),
        cookie_name: config.admin.cookie_name.clone(),
        unlock: config.unlock.clone(),
    };

    let site_state = folio_site::SiteState::from_config(store, config);

    let api_routes = Router::new()
        .route(
            "/content",
            get(handlers::get_content)
                .put(handlers::put_content)
                .delete(handlers::delete_content),
        )
        .route("/unlock", post(handlers::unlock))
        .route("/lock", post(handlers::lock))
        .route("/visits", post(handlers::record_visit))
        .route("/visits/stats", get(handlers::visit_stats))
        .with_state(api_state);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health))
        .merge(folio_site::site_router(site_state))
}
