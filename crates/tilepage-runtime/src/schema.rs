#![forbid(unsafe_code)]

//! Persisted record names and tolerant decoding.
//!
//! | Key               | Shape                         |
//! |-------------------|-------------------------------|
//! | `widget_order`    | JSON array of id strings      |
//! | `widget_sizes`    | JSON object, id -> integer    |
//! | `enabled_widgets` | legacy array, migrated once   |
//!
//! Decoding never fails: wrong shapes fall back to defaults, non-string ids
//! and non-numeric sizes are dropped, and sizes are clamped into range.
//! Catalog filtering is left to the order model, which knows the catalog.

use serde_json::Value;
use tilepage_core::{SizeClass, SizeMap, WidgetId};

use crate::config_store::ConfigStore;

/// Current widget order.
pub const WIDGET_ORDER_KEY: &str = "widget_order";
/// Per-widget size classes.
pub const WIDGET_SIZES_KEY: &str = "widget_sizes";
/// Pre-ordering list of enabled widgets.
pub const LEGACY_ENABLED_WIDGETS_KEY: &str = "enabled_widgets";

/// Decoded durable layout state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// `None` when nothing usable is stored (first run).
    pub widget_order: Option<Vec<WidgetId>>,
    pub widget_sizes: SizeMap,
}

impl PersistedState {
    /// Read both records from the store, coercing malformed content.
    #[must_use]
    pub fn load(store: &ConfigStore) -> Self {
        Self {
            widget_order: store.read_value(WIDGET_ORDER_KEY).and_then(decode_order),
            widget_sizes: store
                .read_value(WIDGET_SIZES_KEY)
                .map(decode_sizes)
                .unwrap_or_default(),
        }
    }
}

/// Persist the order record. Returns whether the durable write succeeded.
pub fn save_order(store: &mut ConfigStore, order: &[WidgetId]) -> bool {
    store.write(WIDGET_ORDER_KEY, order)
}

/// Persist the sizes record. Returns whether the durable write succeeded.
pub fn save_sizes(store: &mut ConfigStore, sizes: &SizeMap) -> bool {
    store.write(WIDGET_SIZES_KEY, sizes)
}

/// Decode an id array. Non-array values yield `None`.
pub(crate) fn decode_order(value: &Value) -> Option<Vec<WidgetId>> {
    let Some(items) = value.as_array() else {
        tracing::warn!(key = WIDGET_ORDER_KEY, found = %value, "stored order is not an array");
        return None;
    };
    let ids = items
        .iter()
        .filter_map(|item| match item.as_str() {
            Some(id) => Some(WidgetId::new(id)),
            None => {
                tracing::warn!(
                    key = WIDGET_ORDER_KEY,
                    item = %item,
                    "non-string widget id dropped"
                );
                None
            }
        })
        .collect();
    Some(ids)
}

fn decode_sizes(value: &Value) -> SizeMap {
    let Some(object) = value.as_object() else {
        tracing::warn!(key = WIDGET_SIZES_KEY, found = %value, "stored sizes are not an object");
        return SizeMap::new();
    };
    object
        .iter()
        .filter_map(|(id, raw)| {
            let requested = raw
                .as_i64()
                .or_else(|| raw.as_f64().map(|f| f.round() as i64));
            match requested {
                Some(requested) => {
                    Some((WidgetId::new(id.as_str()), SizeClass::clamped(requested)))
                }
                None => {
                    tracing::warn!(key = WIDGET_SIZES_KEY, id = %id, "non-numeric size dropped");
                    None
                }
            }
        })
        .collect()
}
