//! Edit action endpoints.
//!
//! Form handlers behind the admin affordances. Each one checks the unlock
//! cookie, then replays the form through the same widget or reorder logic
//! the client runtime uses, writing via a [`StoreEditor`], and redirects
//! back to the page it came from.

use std::fmt;

use axum::extract::{Form, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use folio_admin::{ContentEditor, ContentSource, PendingWrite, ReorderList, StoreEditor};
use folio_core::keys::{encode_key_list, parse_key_list};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::SiteState;
use crate::auth::is_unlocked;
use crate::content::section_for;
use crate::widgets::{EditableImage, EditableText};

/// Only same-site absolute paths are followed; anything else goes home.
pub fn safe_back(back: &str) -> &str {
    if back.starts_with('/') && !back.starts_with("//") {
        back
    } else {
        "/"
    }
}

/// An admin editor over the store, if the request may write to it.
fn editor(state: &SiteState, jar: &CookieJar) -> Result<StoreEditor, Response> {
    if !is_unlocked(jar, &state.cookie_name) {
        return Err((StatusCode::UNAUTHORIZED, "edit mode is locked").into_response());
    }
    let Some(store) = &state.store else {
        return Err((StatusCode::SERVICE_UNAVAILABLE, "storage not configured").into_response());
    };
    StoreEditor::load(store.clone(), true).map_err(storage_error)
}

fn storage_error(e: impl fmt::Display) -> Response {
    warn!(error = %e, "edit action failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
}

/// Wait for an optional write, then redirect.
async fn finish(write: Option<PendingWrite>, back: &str) -> Response {
    if let Some(write) = write {
        if let Err(e) = write.await {
            return storage_error(e);
        }
    }
    Redirect::to(safe_back(back)).into_response()
}

// ── Text ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct TextForm {
    pub key: String,
    pub value: String,
    /// Value the editor was opened with; used when nothing is stored yet.
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub back: String,
}

pub async fn edit_text(
    State(state): State<SiteState>,
    jar: CookieJar,
    Form(form): Form<TextForm>,
) -> Response {
    let editor = match editor(&state, &jar) {
        Ok(editor) => editor,
        Err(resp) => return resp,
    };
    let mut widget = EditableText::new(form.key.as_str(), form.current);
    widget.begin_edit(&editor);
    widget.update_draft(&form.value);
    finish(widget.commit(&editor), &form.back).await
}

// ── Image ───────────────────────────────────────────────────────

pub async fn edit_image(
    State(state): State<SiteState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let editor = match editor(&state, &jar) {
        Ok(editor) => editor,
        Err(resp) => return resp,
    };

    let mut key = None;
    let mut back = String::new();
    let mut file = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };
        let name = field.name().unwrap_or_default().to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };
        match name.as_str() {
            "key" => key = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "back" => back = String::from_utf8_lossy(&bytes).into_owned(),
            "file" => file = Some((mime, bytes)),
            _ => {}
        }
    }

    let Some(key) = key else {
        return (StatusCode::BAD_REQUEST, "missing key").into_response();
    };
    let widget = EditableImage::new(key.as_str(), "", "");
    let write = file.and_then(|(mime, bytes)| widget.select_file(&editor, &mime, &bytes));
    finish(write, &back).await
}

// ── Reset ───────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetForm {
    pub key: String,
    #[serde(default)]
    pub back: String,
}

pub async fn reset(
    State(state): State<SiteState>,
    jar: CookieJar,
    Form(form): Form<ResetForm>,
) -> Response {
    let editor = match editor(&state, &jar) {
        Ok(editor) => editor,
        Err(resp) => return resp,
    };
    finish(Some(editor.delete_content(&form.key)), &form.back).await
}

// ── Reorder ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReorderForm {
    pub collection: String,
    pub dragged: String,
    pub target: usize,
    #[serde(default)]
    pub back: String,
}

pub async fn reorder(
    State(state): State<SiteState>,
    jar: CookieJar,
    Form(form): Form<ReorderForm>,
) -> Response {
    let editor = match editor(&state, &jar) {
        Ok(editor) => editor,
        Err(resp) => return resp,
    };
    let Some(section) = section_for(&form.collection) else {
        return (StatusCode::BAD_REQUEST, "unknown collection").into_response();
    };

    // Recompute what the page showed, then move within that.
    let list = ReorderList::new(section.collection.order_key);
    let visible: Vec<String> = list
        .ordered(&editor, section.items(&editor), |k| k.to_string())
        .iter()
        .map(|k| k.to_string())
        .collect();
    let write = list.move_to(&editor, &visible, &form.dragged, form.target);
    finish(write, &form.back).await
}

// ── Add item ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AddItemForm {
    pub collection: String,
    #[serde(default)]
    pub back: String,
}

pub async fn add_item(
    State(state): State<SiteState>,
    jar: CookieJar,
    Form(form): Form<AddItemForm>,
) -> Response {
    let editor = match editor(&state, &jar) {
        Ok(editor) => editor,
        Err(resp) => return resp,
    };
    let Some(section) = section_for(&form.collection) else {
        return (StatusCode::BAD_REQUEST, "unknown collection").into_response();
    };

    let item = section
        .collection
        .item(section.next_item_id(&section.items(&editor)));
    let added_key = section.collection.added_key;
    let mut added = parse_key_list(&editor.get_content(added_key, ""));
    added.push(item.to_string());
    debug!(item = %item, "collection item added");
    finish(Some(editor.set_content(added_key, &encode_key_list(&added))), &form.back).await
}
