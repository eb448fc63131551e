//! View types for page template rendering.
//!
//! These carry pre-rendered widget HTML and computed fields so templates
//! stay simple.

use folio_admin::{ContentSource, chord_keys};
use folio_core::ItemKey;

use crate::SiteState;
use crate::content::{ITEM_FIELDS, Section};
use crate::widgets::EditableText;

/// Build a text widget, opening its editor if the request asked to edit it.
pub fn text_widget(
    key: &str,
    default: &str,
    source: &impl ContentSource,
    edit: Option<&str>,
) -> EditableText {
    let mut widget = EditableText::new(key, default);
    if edit == Some(key) {
        widget.begin_edit(source);
    }
    widget
}

/// Settings the page script reads from `<body>` data attributes.
pub struct Shell {
    pub cookie_name: String,
    /// Chord entries joined with `+`.
    pub chord: String,
    pub tap_count: u32,
    pub tap_window_ms: u64,
    pub poll_ms: u64,
}

impl Shell {
    pub fn new(state: &SiteState) -> Self {
        Self {
            cookie_name: state.cookie_name.clone(),
            chord: chord_keys(&state.unlock).join("+"),
            tap_count: state.unlock.tap_count.max(1),
            tap_window_ms: state.unlock.tap_window_ms,
            poll_ms: state.poll_interval_ms.max(100),
        }
    }
}

pub struct ItemView {
    pub key: String,
    pub index: usize,
    pub title_html: String,
    pub subtitle_html: String,
    pub period_html: String,
    pub summary_html: String,
    pub has_prev: bool,
    pub has_next: bool,
}

impl ItemView {
    pub fn build(
        section: &Section,
        item: &ItemKey,
        index: usize,
        total: usize,
        source: &impl ContentSource,
        edit: Option<&str>,
    ) -> Self {
        let defaults = section.defaults_for(item);
        let [title, subtitle, period, summary] = ITEM_FIELDS.map(|field| {
            let key = item.field(field);
            let widget = text_widget(key.as_str(), defaults.field(field), source, edit);
            let widget = match field {
                "title" => widget.tag("h3"),
                "summary" => widget.tag("p").multiline(),
                _ => widget.tag("span"),
            };
            widget.render(source, section.path)
        });

        Self {
            key: item.to_string(),
            index,
            title_html: title,
            subtitle_html: subtitle,
            period_html: period,
            summary_html: summary,
            has_prev: index > 0,
            has_next: index + 1 < total,
        }
    }

    pub fn prev_index(&self) -> usize {
        self.index.saturating_sub(1)
    }

    pub fn next_index(&self) -> usize {
        self.index + 1
    }
}
