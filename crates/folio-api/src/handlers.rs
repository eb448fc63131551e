//! Content API handlers.
//!
//! Reads never fail from the caller's point of view: a missing or broken
//! store yields an empty map. Writes require the unlock cookie.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use folio_core::{
    ApiResponse, ContentMap, DeleteContentRequest, SetContentRequest, UnlockGesture, epoch_millis,
};
use folio_site::auth::{is_unlocked, lock_cookie, unlock_cookie};
use folio_state::{ContentStore, PathCount, Visit};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::ApiState;

fn error_response(msg: &str, status: StatusCode) -> Response {
    (status, Json(ApiResponse::<()>::err(msg))).into_response()
}

/// The store, if the request may write to it.
fn writable<'a>(state: &'a ApiState, jar: &CookieJar) -> Result<&'a ContentStore, Response> {
    if !is_unlocked(jar, &state.cookie_name) {
        return Err(error_response("edit mode is locked", StatusCode::UNAUTHORIZED));
    }
    state
        .store
        .as_ref()
        .ok_or_else(|| error_response("storage not configured", StatusCode::SERVICE_UNAVAILABLE))
}

// ── Content ────────────────────────────────────────────────────

/// GET /api/content
pub async fn get_content(State(state): State<ApiState>) -> impl IntoResponse {
    let map = state
        .store
        .as_ref()
        .map(ContentStore::get_all)
        .unwrap_or_else(ContentMap::new);
    Json(ApiResponse::ok(map))
}

/// PUT /api/content
pub async fn put_content(
    State(state): State<ApiState>,
    jar: CookieJar,
    Json(req): Json<SetContentRequest>,
) -> Response {
    let store = match writable(&state, &jar) {
        Ok(store) => store,
        Err(resp) => return resp,
    };
    if req.key.is_empty() {
        return error_response("key must not be empty", StatusCode::BAD_REQUEST);
    }
    match store.set(&req.key, &req.value) {
        Ok(entry) => Json(ApiResponse::ok(entry)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// DELETE /api/content
///
/// Deleting a key that was never set is not an error.
pub async fn delete_content(
    State(state): State<ApiState>,
    jar: CookieJar,
    Json(req): Json<DeleteContentRequest>,
) -> Response {
    let store = match writable(&state, &jar) {
        Ok(store) => store,
        Err(resp) => return resp,
    };
    match store.delete(&req.key) {
        Ok(existed) => Json(ApiResponse::ok(existed)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// ── Unlock ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UnlockRequest {
    pub gesture: UnlockGesture,
}

/// POST /api/unlock
pub async fn unlock(
    State(state): State<ApiState>,
    jar: CookieJar,
    Json(req): Json<UnlockRequest>,
) -> Response {
    let ttl = req.gesture.ttl(&state.unlock);
    info!(gesture = ?req.gesture, ttl_secs = ttl.as_secs(), "edit mode unlocked");
    (
        jar.add(unlock_cookie(&state.cookie_name, ttl)),
        Json(ApiResponse::ok(ttl.as_secs())),
    )
        .into_response()
}

/// POST /api/lock
pub async fn lock(State(state): State<ApiState>, jar: CookieJar) -> Response {
    info!("edit mode locked");
    (
        jar.add(lock_cookie(&state.cookie_name)),
        Json(ApiResponse::ok("locked")),
    )
        .into_response()
}

// ── Visits ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VisitRequest {
    pub path: String,
    #[serde(default)]
    pub referrer: Option<String>,
}

/// POST /api/visits
///
/// Always accepted; recording failures are only logged.
pub async fn record_visit(
    State(state): State<ApiState>,
    Json(req): Json<VisitRequest>,
) -> impl IntoResponse {
    if let Some(store) = &state.store {
        let visit = Visit {
            path: req.path,
            referrer: req.referrer.filter(|r| !r.is_empty()),
            at: epoch_millis(),
        };
        match store.record_visit(&visit) {
            Ok(()) => debug!(path = %visit.path, "visit recorded"),
            Err(e) => warn!(error = %e, path = %visit.path, "failed to record visit"),
        }
    }
    (StatusCode::ACCEPTED, Json(ApiResponse::ok("recorded")))
}

/// GET /api/visits/stats
pub async fn visit_stats(State(state): State<ApiState>) -> Response {
    let Some(store) = &state.store else {
        return Json(ApiResponse::ok(Vec::<PathCount>::new())).into_response();
    };
    match store.visit_counts() {
        Ok(counts) => Json(ApiResponse::ok(counts)).into_response(),
        Err(e) => error_response(&e.to_string(), StatusCode::INTERNAL_SERVER_ERROR),
    }
}

// ── Health ─────────────────────────────────────────────────────

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("ok"))
}
