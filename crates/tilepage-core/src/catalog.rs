#![forbid(unsafe_code)]

//! Widget catalog.
//!
//! The catalog is the closed set of widgets the start page knows about. It is
//! built once at startup and never mutated. Its insertion order is the
//! canonical order used by the settings panel.
//!
//! # Invariants
//!
//! 1. Identifiers are unique within a catalog; later duplicates are ignored.
//! 2. Pinned widgets render outside the grid: they are never paginated,
//!    dragged, or reordered.
//! 3. Anything not in the catalog is treated as unknown and dropped by
//!    [`WidgetCatalog::retain_known`].

use std::borrow::Borrow;
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::size::SizeClass;

/// Stable widget identifier (e.g. `"tasks"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub const TASKS: &'static str = "tasks";
    pub const NOTES: &'static str = "notes";
    pub const WEATHER: &'static str = "weather";
    pub const QUOTE: &'static str = "quote";
    pub const AI_ASSISTANT: &'static str = "ai_assistant";
    pub const LINKS: &'static str = "links";
    pub const SEARCH: &'static str = "search";

    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for WidgetId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl Borrow<str> for WidgetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for WidgetId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for WidgetId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Static description of one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WidgetDescriptor {
    pub id: WidgetId,
    /// Human-readable name shown in the settings panel and widget header.
    pub display_name: String,
    /// Rendered outside the reorderable grid.
    pub pinned: bool,
    /// Size used when the user has never resized the widget.
    pub default_size: SizeClass,
}

impl WidgetDescriptor {
    /// A regular grid widget with the default one-column size.
    #[must_use]
    pub fn grid(id: impl Into<WidgetId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            pinned: false,
            default_size: SizeClass::MIN,
        }
    }

    /// A pinned widget that renders outside the grid.
    #[must_use]
    pub fn pinned(id: impl Into<WidgetId>, display_name: impl Into<String>) -> Self {
        Self {
            pinned: true,
            ..Self::grid(id, display_name)
        }
    }

    /// Override the default size class.
    #[must_use]
    pub fn with_default_size(mut self, size: SizeClass) -> Self {
        self.default_size = size;
        self
    }
}

/// Read-only registry of known widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetCatalog {
    entries: Vec<WidgetDescriptor>,
}

impl WidgetCatalog {
    /// The stock start-page catalog.
    ///
    /// | id             | name         | pinned |
    /// |----------------|--------------|--------|
    /// | `tasks`        | Tasks        | no     |
    /// | `notes`        | Notes        | no     |
    /// | `weather`      | Weather      | no     |
    /// | `quote`        | Quote        | yes    |
    /// | `ai_assistant` | AI Assistant | no     |
    /// | `links`        | Links        | no     |
    /// | `search`       | Search       | no     |
    #[must_use]
    pub fn standard() -> Self {
        Self::from_descriptors([
            WidgetDescriptor::grid(WidgetId::TASKS, "Tasks"),
            WidgetDescriptor::grid(WidgetId::NOTES, "Notes"),
            WidgetDescriptor::grid(WidgetId::WEATHER, "Weather"),
            WidgetDescriptor::pinned(WidgetId::QUOTE, "Quote"),
            WidgetDescriptor::grid(WidgetId::AI_ASSISTANT, "AI Assistant"),
            WidgetDescriptor::grid(WidgetId::LINKS, "Links"),
            WidgetDescriptor::grid(WidgetId::SEARCH, "Search"),
        ])
    }

    /// Build a catalog from descriptors; duplicate ids keep the first entry.
    #[must_use]
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = WidgetDescriptor>) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for descriptor in descriptors {
            if seen.insert(descriptor.id.clone()) {
                entries.push(descriptor);
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!(id = %descriptor.id, "duplicate catalog entry ignored");
            }
        }
        Self { entries }
    }

    /// All descriptors in canonical order.
    #[must_use]
    pub fn all(&self) -> &[WidgetDescriptor] {
        &self.entries
    }

    /// Look up a descriptor by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&WidgetDescriptor> {
        self.entries.iter().find(|d| d.id.as_str() == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` is a known pinned widget. Unknown ids are not pinned.
    #[must_use]
    pub fn is_pinned(&self, id: &str) -> bool {
        self.get(id).is_some_and(|d| d.pinned)
    }

    /// Default size for `id`, or [`SizeClass::MIN`] when unknown.
    #[must_use]
    pub fn default_size(&self, id: &str) -> SizeClass {
        self.get(id).map_or(SizeClass::MIN, |d| d.default_size)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Filter an id sequence down to known, first-occurrence entries.
    ///
    /// Relative order of the surviving ids is preserved.
    #[must_use]
    pub fn retain_known<I>(&self, ids: I) -> Vec<WidgetId>
    where
        I: IntoIterator<Item = WidgetId>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for id in ids {
            if !self.contains(id.as_str()) {
                #[cfg(feature = "tracing")]
                tracing::warn!(id = %id, "unknown widget id dropped");
                continue;
            }
            if seen.insert(id.clone()) {
                out.push(id);
            }
        }
        out
    }
}

impl Default for WidgetCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
