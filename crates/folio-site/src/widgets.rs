//! Editable field widgets.
//!
//! Each widget resolves its value through a [`ContentSource`] and renders
//! one of three shapes: static content for visitors, content plus an edit
//! affordance for admins, or an inline editor while an admin is editing.
//! Writes always go through a [`ContentEditor`]: the client-side
//! `AdminContext` or the server-side `StoreEditor` behind the edit actions.
//! Widgets never touch the override map themselves.

use askama::Template;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use folio_admin::{ContentEditor, ContentSource, PendingWrite};
use folio_core::ContentKey;
use tracing::debug;

/// Value to persist for a committed draft, if any.
///
/// Blank drafts and drafts equal to the current value are discarded.
pub fn commit_value(draft: &str, current: &str) -> Option<String> {
    let trimmed = draft.trim();
    if trimmed.is_empty() || trimmed == current {
        return None;
    }
    Some(trimmed.to_string())
}

/// Encode an uploaded image as a `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn render<T: Template>(tmpl: T) -> String {
    tmpl.render()
        .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>"))
}

// ── Text ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    SingleLine,
    MultiLine,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum EditState {
    Viewing,
    Editing { draft: String },
}

#[derive(Template)]
#[template(path = "widgets/text.html")]
struct TextTemplate<'a> {
    key: &'a str,
    tag: &'a str,
    value: &'a str,
    admin: bool,
    editing: bool,
    draft: &'a str,
    multiline: bool,
    back: &'a str,
}

/// In-place editable text.
#[derive(Debug, Clone)]
pub struct EditableText {
    key: ContentKey,
    default: String,
    tag: &'static str,
    mode: TextMode,
    state: EditState,
}

impl EditableText {
    pub fn new(key: impl Into<ContentKey>, default: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            tag: "span",
            mode: TextMode::SingleLine,
            state: EditState::Viewing,
        }
    }

    /// Element used for the static rendering (`h1`, `p`, ...).
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = tag;
        self
    }

    pub fn multiline(mut self) -> Self {
        self.mode = TextMode::MultiLine;
        self
    }

    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    pub fn resolved(&self, source: &impl ContentSource) -> String {
        source.get_content(self.key.as_str(), &self.default)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn draft(&self) -> Option<&str> {
        match &self.state {
            EditState::Editing { draft } => Some(draft),
            EditState::Viewing => None,
        }
    }

    /// Enter editing with the draft seeded from the current value.
    /// Returns false (and stays put) for non-admins.
    pub fn begin_edit(&mut self, source: &impl ContentSource) -> bool {
        if !source.is_admin() {
            return false;
        }
        self.state = EditState::Editing {
            draft: self.resolved(source),
        };
        true
    }

    pub fn update_draft(&mut self, text: &str) {
        if let EditState::Editing { draft } = &mut self.state {
            *draft = text.to_string();
        }
    }

    /// Leave editing and persist the draft if it is a real change.
    pub fn commit(&mut self, ctx: &impl ContentEditor) -> Option<PendingWrite> {
        let EditState::Editing { draft } = std::mem::replace(&mut self.state, EditState::Viewing)
        else {
            return None;
        };
        let value = commit_value(&draft, &self.resolved(ctx))?;
        debug!(key = %self.key, "committing text edit");
        Some(ctx.set_content(self.key.as_str(), &value))
    }

    /// Leave editing without persisting.
    pub fn cancel(&mut self) {
        self.state = EditState::Viewing;
    }

    /// Focus left the editor.
    pub fn blur(&mut self, ctx: &impl ContentEditor) -> Option<PendingWrite> {
        self.commit(ctx)
    }

    /// Keyboard handling while editing: `Escape` cancels, `Enter` confirms
    /// single-line fields, `Ctrl+Enter` confirms multi-line ones.
    pub fn key_press(
        &mut self,
        ctx: &impl ContentEditor,
        key: &str,
        ctrl: bool,
    ) -> Option<PendingWrite> {
        if !self.is_editing() {
            return None;
        }
        match key {
            "Escape" => {
                self.cancel();
                None
            }
            "Enter" if self.mode == TextMode::SingleLine || ctrl => self.commit(ctx),
            _ => None,
        }
    }

    /// HTML for the widget. `back` is the page path edit forms return to.
    pub fn render(&self, source: &impl ContentSource, back: &str) -> String {
        let value = self.resolved(source);
        let admin = source.is_admin();
        render(TextTemplate {
            key: self.key.as_str(),
            tag: self.tag,
            value: &value,
            admin,
            editing: admin && self.is_editing(),
            draft: self.draft().unwrap_or(value.as_str()),
            multiline: self.mode == TextMode::MultiLine,
            back,
        })
    }
}

// ── Image ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "widgets/image.html")]
struct ImageTemplate<'a> {
    key: &'a str,
    src: &'a str,
    alt: &'a str,
    admin: bool,
    back: &'a str,
}

/// Image whose source can be replaced by an uploaded file.
#[derive(Debug, Clone)]
pub struct EditableImage {
    key: ContentKey,
    default: String,
    alt: String,
}

impl EditableImage {
    /// `default` may be empty for "no image unless overridden".
    pub fn new(key: impl Into<ContentKey>, default: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: default.into(),
            alt: alt.into(),
        }
    }

    pub fn key(&self) -> &ContentKey {
        &self.key
    }

    pub fn resolved(&self, source: &impl ContentSource) -> String {
        source.get_content(self.key.as_str(), &self.default)
    }

    /// Store a picked file as the image source. Non-admins and non-image
    /// files are ignored.
    pub fn select_file(
        &self,
        ctx: &impl ContentEditor,
        mime: &str,
        bytes: &[u8],
    ) -> Option<PendingWrite> {
        if !ctx.is_admin() || !mime.starts_with("image/") || bytes.is_empty() {
            return None;
        }
        debug!(key = %self.key, %mime, size = bytes.len(), "storing image override");
        Some(ctx.set_content(self.key.as_str(), &data_url(mime, bytes)))
    }

    pub fn render(&self, source: &impl ContentSource, back: &str) -> String {
        let src = self.resolved(source);
        let admin = source.is_admin();
        if !admin && src.is_empty() {
            return String::new();
        }
        render(ImageTemplate {
            key: self.key.as_str(),
            src: &src,
            alt: &self.alt,
            admin,
            back,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use folio_admin::{AdminContext, CookieJar, MemoryCache, Snapshot, StoreEditor, StoreRemote};
    use folio_core::ContentMap;
    use folio_state::ContentStore;

    fn snapshot(pairs: &[(&str, &str)], admin: bool) -> Snapshot {
        let overrides: ContentMap = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Snapshot::new(overrides, admin)
    }

    /// An admin context writing to an in-memory store.
    async fn admin_context(store: &ContentStore) -> AdminContext {
        let jar = CookieJar::new("folio_admin");
        jar.unlock(Duration::from_secs(60));
        let ctx = AdminContext::new(
            Arc::new(MemoryCache::default()),
            Arc::new(StoreRemote::new(store.clone())),
            Arc::new(jar),
            Duration::from_secs(60),
        );
        ctx.mount();
        ctx.wait_synced().await;
        ctx
    }

    #[test]
    fn commit_rule() {
        assert_eq!(commit_value("  New  ", "Old").as_deref(), Some("New"));
        assert_eq!(commit_value("Old", "Old"), None);
        assert_eq!(commit_value(" Old ", "Old"), None);
        assert_eq!(commit_value("", "Old"), None);
        assert_eq!(commit_value(" \n\t", "Old"), None);
    }

    #[test]
    fn data_url_encoding() {
        assert_eq!(data_url("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn visitor_sees_static_text() {
        let widget = EditableText::new("hero.title", "Default").tag("h1");
        let html = widget.render(&snapshot(&[("hero.title", "Hi")], false), "/");

        assert!(html.contains("<h1"));
        assert!(html.contains("Hi"));
        assert!(!html.contains("folio-editable"));
        assert!(!html.contains("<form"));
    }

    #[test]
    fn visitor_cannot_begin_edit() {
        let mut widget = EditableText::new("hero.title", "Default");
        assert!(!widget.begin_edit(&snapshot(&[], false)));
        assert!(!widget.is_editing());
    }

    #[test]
    fn admin_sees_affordance_then_editor() {
        let source = snapshot(&[], true);
        let mut widget = EditableText::new("about.body", "Hello <world>").tag("p").multiline();

        let html = widget.render(&source, "/");
        assert!(html.contains("folio-editable"));
        assert!(html.contains("Hello &lt;world&gt;"));

        assert!(widget.begin_edit(&source));
        assert_eq!(widget.draft(), Some("Hello <world>"));
        let html = widget.render(&source, "/");
        assert!(html.contains("<textarea"));
        assert!(html.contains(r#"action="/edit/text""#));
    }

    #[tokio::test]
    async fn commit_persists_changed_draft() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = admin_context(&store).await;
        let mut widget = EditableText::new("hero.title", "Default");

        assert!(widget.begin_edit(&ctx));
        widget.update_draft("  Hello ");
        widget.commit(&ctx).unwrap().await.unwrap();

        assert!(!widget.is_editing());
        assert_eq!(widget.resolved(&ctx), "Hello");
        assert_eq!(store.get_all()["hero.title"], "Hello");
        ctx.unmount();
    }

    #[tokio::test]
    async fn unchanged_draft_is_not_persisted() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = admin_context(&store).await;
        let mut widget = EditableText::new("hero.title", "Default");

        widget.begin_edit(&ctx);
        assert!(widget.commit(&ctx).is_none());
        assert!(store.get_all().is_empty());
        assert!(ctx.session().overrides.is_empty());
        ctx.unmount();
    }

    #[tokio::test]
    async fn blank_draft_is_not_persisted() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = admin_context(&store).await;
        let mut widget = EditableText::new("hero.title", "Default");

        widget.begin_edit(&ctx);
        widget.update_draft("   ");
        assert!(widget.blur(&ctx).is_none());
        assert_eq!(widget.resolved(&ctx), "Default");
        assert!(store.get_all().is_empty());
        ctx.unmount();
    }

    #[tokio::test]
    async fn escape_cancels_and_enter_commits() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = admin_context(&store).await;

        let mut title = EditableText::new("hero.title", "Default");
        title.begin_edit(&ctx);
        title.update_draft("Discarded");
        assert!(title.key_press(&ctx, "Escape", false).is_none());
        assert!(!title.is_editing());
        assert_eq!(title.resolved(&ctx), "Default");

        let mut body = EditableText::new("about.body", "Default").multiline();
        body.begin_edit(&ctx);
        body.update_draft("Line one");
        assert!(body.key_press(&ctx, "Enter", false).is_none());
        assert!(body.is_editing());
        body.key_press(&ctx, "Enter", true).unwrap().await.unwrap();
        assert_eq!(store.get_all()["about.body"], "Line one");
        ctx.unmount();
    }

    #[test]
    fn visitor_without_image_renders_nothing() {
        let widget = EditableImage::new("hero.photo", "", "Portrait");
        assert_eq!(widget.render(&snapshot(&[], false), "/"), "");

        let html = widget.render(&snapshot(&[("hero.photo", "/me.jpg")], false), "/");
        assert!(html.contains(r#"src="/me.jpg""#));
        assert!(!html.contains("type=\"file\""));
    }

    #[test]
    fn admin_gets_file_picker_even_without_image() {
        let widget = EditableImage::new("hero.photo", "", "Portrait");
        let html = widget.render(&snapshot(&[], true), "/");
        assert!(html.contains(r#"type="file""#));
        assert!(!html.contains("<img"));
    }

    #[tokio::test]
    async fn selected_image_is_stored_as_data_url() {
        let store = ContentStore::open_in_memory().unwrap();
        let ctx = admin_context(&store).await;
        let widget = EditableImage::new("hero.photo", "", "Portrait");

        assert!(widget.select_file(&ctx, "text/plain", b"abc").is_none());
        widget
            .select_file(&ctx, "image/png", b"abc")
            .unwrap()
            .await
            .unwrap();
        assert_eq!(store.get_all()["hero.photo"], "data:image/png;base64,YWJj");
        ctx.unmount();
    }

    #[tokio::test]
    async fn store_editor_commits_synchronously() {
        let store = ContentStore::open_in_memory().unwrap();
        store.set("about.body", "Stored").unwrap();
        let editor = StoreEditor::load(store.clone(), true).unwrap();

        let mut widget = EditableText::new("about.body", "Default").multiline();
        assert!(widget.begin_edit(&editor));
        assert_eq!(widget.draft(), Some("Stored"));
        widget.update_draft("Rewritten");
        widget.key_press(&editor, "Enter", true).unwrap().await.unwrap();

        assert_eq!(store.get_all()["about.body"], "Rewritten");
        assert_eq!(widget.resolved(&editor), "Rewritten");
    }
}
