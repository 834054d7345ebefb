#![forbid(unsafe_code)]

//! One-time migration of the legacy `enabled_widgets` record.
//!
//! Older installs stored only the set of enabled widgets, as an array of
//! ids. Migration turns that array into `widget_order` (same ids, same
//! order), seeds an empty `widget_sizes` record, and deletes the legacy key.
//!
//! | Stored state                             | Outcome          |
//! |------------------------------------------|------------------|
//! | no legacy key                            | `NoLegacyData`   |
//! | legacy key and `widget_order` both exist | `Superseded`     |
//! | legacy value not an array of strings     | `Skipped`        |
//! | `widget_order` could not be persisted    | `Skipped`        |
//! | otherwise                                | `Migrated`       |
//!
//! A skipped migration leaves the legacy key in place so a later start can
//! try again. Unknown ids are carried over untouched; the order model drops
//! them when it hydrates.

use serde::Serialize;
use tilepage_core::{SizeMap, WidgetId};

use crate::config_store::ConfigStore;
use crate::schema::{LEGACY_ENABLED_WIDGETS_KEY, WIDGET_ORDER_KEY, WIDGET_SIZES_KEY};

/// Result of a migration attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MigrationOutcome {
    /// Nothing to migrate.
    NoLegacyData,
    /// Legacy ids were written as the widget order.
    Migrated { widgets: usize },
    /// A current order already existed; the legacy key was discarded.
    Superseded,
    /// Migration could not complete; the legacy key was left in place.
    Skipped { reason: String },
    /// Migration already ran for this store.
    AlreadyRan,
}

/// Migrate `enabled_widgets` into `widget_order`, at most once per store.
///
/// Later calls on the same store return [`MigrationOutcome::AlreadyRan`]
/// without touching it.
pub fn migrate_legacy_enabled_widgets(store: &mut ConfigStore) -> MigrationOutcome {
    if store.migration_outcome().is_some() {
        return MigrationOutcome::AlreadyRan;
    }
    let outcome = run(store);
    store.record_migration(outcome.clone());
    outcome
}

fn run(store: &mut ConfigStore) -> MigrationOutcome {
    let Some(legacy) = store.read_value(LEGACY_ENABLED_WIDGETS_KEY).cloned() else {
        return MigrationOutcome::NoLegacyData;
    };

    if store.contains(WIDGET_ORDER_KEY) {
        store.remove(LEGACY_ENABLED_WIDGETS_KEY);
        tracing::info!("legacy enabled_widgets superseded by widget_order, removed");
        return MigrationOutcome::Superseded;
    }

    let ids: Vec<WidgetId> = match serde_json::from_value(legacy) {
        Ok(ids) => ids,
        Err(e) => {
            tracing::warn!(
                key = LEGACY_ENABLED_WIDGETS_KEY,
                error = %e,
                "legacy widget list malformed, migration skipped"
            );
            return MigrationOutcome::Skipped {
                reason: format!("malformed legacy value: {e}"),
            };
        }
    };

    if !store.write(WIDGET_ORDER_KEY, &ids) {
        return MigrationOutcome::Skipped {
            reason: "widget_order could not be persisted".into(),
        };
    }
    if !store.contains(WIDGET_SIZES_KEY) {
        store.write(WIDGET_SIZES_KEY, &SizeMap::new());
    }
    store.remove(LEGACY_ENABLED_WIDGETS_KEY);

    tracing::info!(widgets = ids.len(), "migrated legacy enabled_widgets to widget_order");
    MigrationOutcome::Migrated { widgets: ids.len() }
}
