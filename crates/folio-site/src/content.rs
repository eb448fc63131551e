//! Compiled-in default copy and the key layout of each page.

use std::collections::BTreeSet;

use folio_admin::ContentSource;
use folio_core::keys::parse_key_list;
use folio_core::{Collection, ItemKey};

pub const HERO_TITLE: &str = "hero.title";
pub const HERO_SUBTITLE: &str = "hero.subtitle";
pub const HERO_PHOTO: &str = "hero.photo";
pub const ABOUT_HEADING: &str = "about.heading";
pub const ABOUT_BODY: &str = "about.body";

pub const DEFAULT_HERO_TITLE: &str = "Hi, I'm Sam.";
pub const DEFAULT_HERO_SUBTITLE: &str = "Software engineer. I build small, sturdy systems.";
pub const DEFAULT_ABOUT_HEADING: &str = "About";
pub const DEFAULT_ABOUT_BODY: &str = "I work on backend services and developer tooling. \
Outside of work I play music, cook, and take long walks with a camera.";

/// Field names every collection item carries.
pub const ITEM_FIELDS: [&str; 4] = ["title", "subtitle", "period", "summary"];

/// Default copy for one collection item.
#[derive(Debug, Clone, Copy)]
pub struct ItemDefaults {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub period: &'static str,
    pub summary: &'static str,
}

impl ItemDefaults {
    pub const BLANK: ItemDefaults = ItemDefaults {
        title: "New item",
        subtitle: "",
        period: "",
        summary: "",
    };

    pub fn field(&self, name: &str) -> &'static str {
        match name {
            "title" => self.title,
            "subtitle" => self.subtitle,
            "period" => self.period,
            "summary" => self.summary,
            _ => "",
        }
    }
}

/// A page listing one reorderable collection.
#[derive(Debug)]
pub struct Section {
    pub collection: Collection,
    pub path: &'static str,
    pub heading_key: &'static str,
    pub heading: &'static str,
    pub defaults: &'static [ItemDefaults],
}

pub static EXPERIENCE: Section = Section {
    collection: Collection::EXPERIENCE,
    path: "/experience",
    heading_key: "exp.heading",
    heading: "Experience",
    defaults: &[
        ItemDefaults {
            title: "Senior Software Engineer",
            subtitle: "Northwind Systems",
            period: "2022 – present",
            summary: "Own the ingestion pipeline and its on-call rotation.",
        },
        ItemDefaults {
            title: "Software Engineer",
            subtitle: "Contoso Labs",
            period: "2019 – 2022",
            summary: "Built internal tooling for build and release.",
        },
        ItemDefaults {
            title: "Intern",
            subtitle: "Fabrikam",
            period: "2018",
            summary: "Prototyped a metrics dashboard.",
        },
    ],
};

pub static PROJECTS: Section = Section {
    collection: Collection::PROJECTS,
    path: "/projects",
    heading_key: "proj.heading",
    heading: "Projects",
    defaults: &[
        ItemDefaults {
            title: "tiny-kv",
            subtitle: "Rust",
            period: "2024",
            summary: "A log-structured key-value store for learning.",
        },
        ItemDefaults {
            title: "trailhead",
            subtitle: "TypeScript",
            period: "2023",
            summary: "Hiking trip planner with offline maps.",
        },
    ],
};

pub static HOBBIES: Section = Section {
    collection: Collection::HOBBIES,
    path: "/hobbies",
    heading_key: "hobby.heading",
    heading: "Hobbies",
    defaults: &[
        ItemDefaults {
            title: "Music",
            subtitle: "Guitar and synths",
            period: "",
            summary: "Mostly ambient, occasionally loud.",
        },
        ItemDefaults {
            title: "Photography",
            subtitle: "35mm film",
            period: "",
            summary: "Street and landscape.",
        },
    ],
};

pub fn section_for(prefix: &str) -> Option<&'static Section> {
    [&EXPERIENCE, &PROJECTS, &HOBBIES]
        .into_iter()
        .find(|s| s.collection.prefix == prefix)
}

impl Section {
    /// Current item keys: the built-in items, then any added at runtime.
    pub fn items(&self, source: &impl ContentSource) -> Vec<ItemKey> {
        let mut items: Vec<ItemKey> = (0..self.defaults.len())
            .map(|i| self.collection.item(i))
            .collect();
        let added = parse_key_list(&source.get_content(self.collection.added_key, ""));
        for raw in added {
            if let Some(item) = self.collection.parse_item(&raw) {
                if !items.contains(&item) {
                    items.push(item);
                }
            }
        }
        items
    }

    /// Defaults for an item key; runtime-added items get blank copy.
    pub fn defaults_for(&self, item: &ItemKey) -> ItemDefaults {
        item.as_str()
            .rsplit('.')
            .next()
            .and_then(|id| id.parse::<usize>().ok())
            .and_then(|idx| self.defaults.get(idx).copied())
            .unwrap_or(ItemDefaults::BLANK)
    }

    /// Id for a newly added item: one past the highest numeric id in use,
    /// or the lowest free id once the highest is `usize::MAX`.
    pub fn next_item_id(&self, items: &[ItemKey]) -> usize {
        let ids: BTreeSet<usize> = items
            .iter()
            .filter_map(|k| k.as_str().rsplit('.').next()?.parse::<usize>().ok())
            .collect();
        match ids.last() {
            None => 0,
            Some(&max) => max
                .checked_add(1)
                .unwrap_or_else(|| (0..).find(|id| !ids.contains(id)).unwrap_or(0)),
        }
    }
}
