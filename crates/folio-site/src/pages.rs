//! Page handlers.
//!
//! Each handler records the visit, snapshots the overrides once, builds
//! view types, and renders an Askama template. The unlock cookie decides
//! whether widgets render edit affordances.

use askama::Template;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header};
use axum::response::Html;
use axum_extra::extract::cookie::CookieJar;
use folio_admin::{ReorderList, Snapshot};
use folio_core::{ContentMap, epoch_millis};
use folio_state::Visit;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::SiteState;
use crate::auth::is_unlocked;
use crate::content::{self, Section};
use crate::views::{ItemView, Shell, text_widget};
use crate::widgets::EditableImage;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(tmpl.render().unwrap_or_else(|e| {
        format!("<pre>Template error: {e}</pre>")
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    /// Content key whose editor should be open.
    pub edit: Option<String>,
}

/// Per-request view of the overrides. Missing or failing storage reads as
/// "no overrides".
pub fn snapshot(state: &SiteState, jar: &CookieJar) -> Snapshot {
    let overrides = state
        .store
        .as_ref()
        .map(|store| store.get_all())
        .unwrap_or_else(ContentMap::new);
    Snapshot::new(overrides, is_unlocked(jar, &state.cookie_name))
}

/// Record a page view. Failures are logged and never affect the page.
pub fn record_visit(state: &SiteState, path: &str, headers: &HeaderMap) {
    let Some(store) = &state.store else {
        return;
    };
    let referrer = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|r| !r.is_empty())
        .map(str::to_string);
    let visit = Visit {
        path: path.to_string(),
        referrer,
        at: epoch_millis(),
    };
    match store.record_visit(&visit) {
        Ok(()) => debug!(%path, "page visit recorded"),
        Err(e) => warn!(error = %e, %path, "failed to record page visit"),
    }
}

// ── Home ────────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    active_page: &'static str,
    admin: bool,
    shell: Shell,
    hero_title: String,
    hero_subtitle: String,
    hero_photo: String,
    about_heading: String,
    about_body: String,
}

pub async fn home(
    State(state): State<SiteState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    record_visit(&state, "/", &headers);
    let snap = snapshot(&state, &jar);
    let edit = query.edit.as_deref();

    let text = |key: &str, default: &str, tag: &'static str| {
        text_widget(key, default, &snap, edit)
            .tag(tag)
            .render(&snap, "/")
    };

    render(HomeTemplate {
        active_page: "home",
        admin: snap.is_admin,
        shell: Shell::new(&state),
        hero_title: text(content::HERO_TITLE, content::DEFAULT_HERO_TITLE, "h1"),
        hero_subtitle: text(content::HERO_SUBTITLE, content::DEFAULT_HERO_SUBTITLE, "p"),
        hero_photo: EditableImage::new(content::HERO_PHOTO, "", "Portrait").render(&snap, "/"),
        about_heading: text(content::ABOUT_HEADING, content::DEFAULT_ABOUT_HEADING, "h2"),
        about_body: text_widget(content::ABOUT_BODY, content::DEFAULT_ABOUT_BODY, &snap, edit)
            .tag("p")
            .multiline()
            .render(&snap, "/"),
    })
}

// ── Collection pages ────────────────────────────────────────────

#[derive(Template)]
#[template(path = "section.html")]
struct SectionTemplate {
    active_page: &'static str,
    admin: bool,
    shell: Shell,
    path: &'static str,
    prefix: &'static str,
    order_key: &'static str,
    heading: String,
    items: Vec<ItemView>,
}

fn section_page(
    state: &SiteState,
    headers: &HeaderMap,
    jar: &CookieJar,
    query: &PageQuery,
    section: &Section,
) -> Html<String> {
    record_visit(state, section.path, headers);
    let snap = snapshot(state, jar);
    let edit = query.edit.as_deref();

    let order = ReorderList::new(section.collection.order_key);
    let items = order.ordered(&snap, section.items(&snap), |k| k.to_string());
    let total = items.len();
    let item_views = items
        .iter()
        .enumerate()
        .map(|(index, item)| ItemView::build(section, item, index, total, &snap, edit))
        .collect();

    render(SectionTemplate {
        active_page: section.collection.prefix,
        admin: snap.is_admin,
        shell: Shell::new(state),
        path: section.path,
        prefix: section.collection.prefix,
        order_key: section.collection.order_key,
        heading: text_widget(section.heading_key, section.heading, &snap, edit)
            .tag("h2")
            .render(&snap, section.path),
        items: item_views,
    })
}

pub async fn experience(
    State(state): State<SiteState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    section_page(&state, &headers, &jar, &query, &content::EXPERIENCE)
}

pub async fn projects(
    State(state): State<SiteState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    section_page(&state, &headers, &jar, &query, &content::PROJECTS)
}

pub async fn hobbies(
    State(state): State<SiteState>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    section_page(&state, &headers, &jar, &query, &content::HOBBIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};
    use folio_state::ContentStore;

    fn test_state() -> SiteState {
        SiteState::new(Some(ContentStore::open_in_memory().unwrap()), "folio_admin")
    }

    fn admin_jar() -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("folio_admin=true"));
        CookieJar::from_headers(&headers)
    }

    #[tokio::test]
    async fn home_renders_defaults_without_store() {
        let state = SiteState::new(None, "folio_admin");
        let html = home(
            State(state),
            HeaderMap::new(),
            CookieJar::new(),
            Query(PageQuery::default()),
        )
        .await
        .0;
        assert!(html.contains("Hi, I&#39;m Sam.") || html.contains("Hi, I&#x27;m Sam."));
        assert!(!html.contains("folio-editable"));
    }

    #[tokio::test]
    async fn home_renders_override() {
        let state = test_state();
        state.store.as_ref().unwrap().set("hero.title", "Hello").unwrap();

        let html = home(
            State(state),
            HeaderMap::new(),
            CookieJar::new(),
            Query(PageQuery::default()),
        )
        .await
        .0;
        assert!(html.contains(">Hello</h1>"));
    }

    #[tokio::test]
    async fn admin_sees_editor_for_requested_key() {
        let state = test_state();
        let query = PageQuery {
            edit: Some("hero.title".to_string()),
        };
        let html = home(State(state), HeaderMap::new(), admin_jar(), Query(query)).await.0;
        assert!(html.contains(r#"action="/edit/text""#));
        assert!(html.contains("folio-editable"));
    }

    #[tokio::test]
    async fn visitor_cannot_open_editor() {
        let state = test_state();
        let query = PageQuery {
            edit: Some("hero.title".to_string()),
        };
        let html = home(State(state), HeaderMap::new(), CookieJar::new(), Query(query)).await.0;
        assert!(!html.contains("/edit/text"));
    }

    #[tokio::test]
    async fn experience_follows_stored_order() {
        let state = test_state();
        state
            .store
            .as_ref()
            .unwrap()
            .set("exp_order", r#"["exp.2","exp.0"]"#)
            .unwrap();

        let html = experience(
            State(state),
            HeaderMap::new(),
            CookieJar::new(),
            Query(PageQuery::default()),
        )
        .await
        .0;
        let intern = html.find("Intern").unwrap();
        let senior = html.find("Senior Software Engineer").unwrap();
        let middle = html.find("Contoso Labs").unwrap();
        assert!(intern < senior && senior < middle);
        assert!(!html.contains("/edit/reorder"));
    }

    #[tokio::test]
    async fn admin_sees_reorder_controls() {
        let state = test_state();
        let html = projects(
            State(state),
            HeaderMap::new(),
            admin_jar(),
            Query(PageQuery::default()),
        )
        .await
        .0;
        assert!(html.contains("/edit/reorder"));
        assert!(html.contains("/edit/add-item"));
        assert!(html.contains(r#"data-order-key="proj_order""#));
    }

    #[tokio::test]
    async fn page_load_records_visit_with_referrer() {
        let state = test_state();
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("https://search.example/"));

        let query = || Query(PageQuery::default());
        home(State(state.clone()), headers, CookieJar::new(), query()).await;
        hobbies(State(state.clone()), HeaderMap::new(), CookieJar::new(), query()).await;

        let store = state.store.as_ref().unwrap();
        let recent = store.recent_visits(10).unwrap();
        assert_eq!(recent.len(), 2);
        let home_visit = recent.iter().find(|v| v.path == "/").unwrap();
        assert_eq!(home_visit.referrer.as_deref(), Some("https://search.example/"));
        assert!(recent.iter().any(|v| v.path == "/hobbies" && v.referrer.is_none()));
    }

    #[tokio::test]
    async fn page_carries_unlock_script_settings() {
        let html = home(
            State(test_state()),
            HeaderMap::new(),
            CookieJar::new(),
            Query(PageQuery::default()),
        )
        .await
        .0;
        assert!(html.contains(r#"data-cookie="folio_admin""#));
        assert!(html.contains(r#"data-admin="false""#));
        assert!(html.contains("/api/unlock"));
        assert!(html.contains("keydown"));
        assert!(html.contains("touchend"));
    }
}
