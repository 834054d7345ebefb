#![forbid(unsafe_code)]

//! Start page configuration.
//!
//! [`StartPageConfig`] gathers everything a [`StartPage`](crate::StartPage)
//! needs besides its storage backend. The numeric layout knobs live in
//! [`LayoutSettings`], which is (de)serializable so hosts can ship them as
//! JSON; missing fields take their defaults.

use serde::{Deserialize, Serialize};
use tilepage_core::{WidgetCatalog, WidgetId};
use tilepage_layout::{Breakpoints, CapacityTable, DEFAULT_WHEEL_THRESHOLD};

/// Viewport width assumed until the host reports a real one.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// Serializable layout parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    pub breakpoints: Breakpoints,
    pub capacities: CapacityTable,
    /// Wheel magnitude that must be exceeded to change page.
    pub wheel_threshold: u32,
    pub initial_viewport_width: u32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            breakpoints: Breakpoints::DEFAULT,
            capacities: CapacityTable::DEFAULT,
            wheel_threshold: DEFAULT_WHEEL_THRESHOLD,
            initial_viewport_width: DEFAULT_VIEWPORT_WIDTH,
        }
    }
}

impl LayoutSettings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Start page configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartPageConfig {
    /// Known widgets.
    pub catalog: WidgetCatalog,
    /// Order used when nothing is stored yet.
    pub default_order: Vec<WidgetId>,
    pub layout: LayoutSettings,
}

impl Default for StartPageConfig {
    fn default() -> Self {
        Self {
            catalog: WidgetCatalog::standard(),
            default_order: vec![WidgetId::new(WidgetId::QUOTE), WidgetId::new(WidgetId::TASKS)],
            layout: LayoutSettings::default(),
        }
    }
}

impl StartPageConfig {
    #[must_use]
    pub fn with_catalog(mut self, catalog: WidgetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the first-run widget order.
    #[must_use]
    pub fn with_default_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<WidgetId>,
    {
        self.default_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Replace all layout settings at once.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutSettings) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: Breakpoints) -> Self {
        self.layout.breakpoints = breakpoints;
        self
    }

    #[must_use]
    pub fn with_capacities(mut self, capacities: CapacityTable) -> Self {
        self.layout.capacities = capacities;
        self
    }

    #[must_use]
    pub fn with_wheel_threshold(mut self, threshold: u32) -> Self {
        self.layout.wheel_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_initial_viewport_width(mut self, width: u32) -> Self {
        self.layout.initial_viewport_width = width;
        self
    }
}
