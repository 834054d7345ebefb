#![forbid(unsafe_code)]

//! Authoritative widget order and size preferences.
//!
//! [`WidgetOrderModel`] owns the active widget order and the per-widget size
//! map, and is the only component that writes them to the [`ConfigStore`].
//! Every mutation is all-or-nothing: it either changes state, persists it
//! and notifies subscribers, or it is a silent no-op that returns `false`.
//!
//! # Invariants
//!
//! 1. The order holds only catalog ids and no duplicates.
//! 2. Pinned widgets never occupy a grid slot, wherever they sit in the
//!    stored order. Enabling one puts it first; `reorder` re-prepends them.
//! 3. Sizes are stored only for resizable (known, non-pinned) widgets and are
//!    always within `[SizeClass::MIN, SizeClass::MAX]`.
//! 4. A disabled widget keeps its size, so re-enabling restores it.

use serde::Serialize;
use tilepage_core::{SizeClass, SizeMap, WidgetCatalog, WidgetDescriptor, WidgetId};

use crate::config_store::ConfigStore;
use crate::reactive::{Notifier, Subscription};
use crate::schema::{self, PersistedState};

/// Read-only copy of the model state, handed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetLayoutSnapshot {
    pub order: Vec<WidgetId>,
    pub sizes: SizeMap,
}

/// Widget order and sizes, backed by a [`ConfigStore`].
#[derive(Debug)]
pub struct WidgetOrderModel {
    catalog: WidgetCatalog,
    store: ConfigStore,
    order: Vec<WidgetId>,
    sizes: SizeMap,
    notifier: Notifier<WidgetLayoutSnapshot>,
    revision: u64,
}

impl WidgetOrderModel {
    /// Load order and sizes from `store`.
    ///
    /// Unknown and duplicate ids are dropped from the stored order, which is
    /// written back only when something was dropped. Pinned ids keep their
    /// stored position. When no order is stored, `default_order` is used and
    /// persisted.
    #[must_use]
    pub fn hydrate(
        catalog: WidgetCatalog,
        mut store: ConfigStore,
        default_order: &[WidgetId],
    ) -> Self {
        let PersistedState {
            widget_order,
            widget_sizes,
        } = PersistedState::load(&store);

        let order = match widget_order {
            Some(stored) => {
                let sanitized = catalog.retain_known(stored.iter().cloned());
                if sanitized != stored {
                    tracing::warn!(
                        stored = stored.len(),
                        kept = sanitized.len(),
                        "stored widget order sanitized"
                    );
                    schema::save_order(&mut store, &sanitized);
                }
                sanitized
            }
            None => {
                let initial = normalize_order(&catalog, default_order.iter().cloned());
                tracing::info!(widgets = initial.len(), "no stored widget order, using defaults");
                schema::save_order(&mut store, &initial);
                initial
            }
        };

        let mut sizes = widget_sizes;
        let before = sizes.len();
        sizes.retain(|id, _| is_resizable(&catalog, id.as_str()));
        if sizes.len() != before || !store.contains(schema::WIDGET_SIZES_KEY) {
            schema::save_sizes(&mut store, &sizes);
        }

        tracing::debug!(
            order = ?order,
            sized = sizes.len(),
            "widget order model hydrated"
        );

        Self {
            catalog,
            store,
            order,
            sizes,
            notifier: Notifier::new(),
            revision: 0,
        }
    }

    // ── Mutations ──────────────────────────────────────────────────────────

    /// Activate `id`. Grid widgets are appended; pinned widgets go first.
    ///
    /// No-op for unknown or already active ids.
    pub fn enable(&mut self, id: &str) -> bool {
        let Some(descriptor) = self.catalog.get(id) else {
            return false;
        };
        if self.is_enabled(id) {
            return false;
        }
        let id = descriptor.id.clone();
        if descriptor.pinned {
            self.order.insert(0, id);
        } else {
            self.order.push(id);
        }
        self.commit_order();
        true
    }

    /// Deactivate `id`. Its stored size is kept. No-op if not active.
    pub fn disable(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.order.remove(index);
        self.commit_order();
        true
    }

    /// Remove a widget from its own close control.
    ///
    /// Same effect as [`disable`](Self::disable); any exit animation is the
    /// rendering layer's concern and must finish before this is called.
    pub fn close(&mut self, id: &str) -> bool {
        let closed = self.disable(id);
        if closed {
            tracing::debug!(id = %id, "widget closed");
        }
        closed
    }

    /// Enable `id` if inactive, otherwise disable it.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.is_enabled(id) {
            self.disable(id)
        } else {
            self.enable(id)
        }
    }

    /// Store a size preference, clamped into `[1, 3]`.
    ///
    /// Ignored for unknown and pinned ids, and when the stored value would
    /// not change. Inactive widgets may be resized.
    pub fn set_size(&mut self, id: &str, requested: i64) -> bool {
        let Some(descriptor) = self.catalog.get(id).filter(|d| !d.pinned) else {
            return false;
        };
        let size = SizeClass::clamped(requested);
        if self.sizes.get(&descriptor.id) == Some(size) {
            return false;
        }
        self.sizes.insert(descriptor.id.clone(), size);
        schema::save_sizes(&mut self.store, &self.sizes);
        self.publish();
        true
    }

    /// Move `dragged` to `target`'s position among grid widgets.
    ///
    /// Pinned widgets stay in front, unchanged. No-op when the ids are equal
    /// or either one is not an active grid widget.
    pub fn reorder(&mut self, dragged: &str, target: &str) -> bool {
        if dragged == target {
            return false;
        }
        let (pinned, mut grid): (Vec<WidgetId>, Vec<WidgetId>) = self
            .order
            .iter()
            .cloned()
            .partition(|id| self.catalog.is_pinned(id.as_str()));

        let from = grid.iter().position(|id| id == dragged);
        let to = grid.iter().position(|id| id == target);
        let (Some(from), Some(to)) = (from, to) else {
            return false;
        };

        let moved = grid.remove(from);
        grid.insert(to, moved);

        let mut order = pinned;
        order.extend(grid);
        self.order = order;
        self.commit_order();
        true
    }

    fn commit_order(&mut self) {
        schema::save_order(&mut self.store, &self.order);
        self.publish();
    }

    fn publish(&mut self) {
        self.revision = self.revision.saturating_add(1);
        let snapshot = self.snapshot();
        self.notifier.notify(&snapshot);
    }

    // ── Queries ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn snapshot(&self) -> WidgetLayoutSnapshot {
        WidgetLayoutSnapshot {
            order: self.order.clone(),
            sizes: self.sizes.clone(),
        }
    }

    /// Active ids in stored order, pinned included.
    #[must_use]
    pub fn order(&self) -> &[WidgetId] {
        &self.order
    }

    #[must_use]
    pub fn sizes(&self) -> &SizeMap {
        &self.sizes
    }

    #[must_use]
    pub fn is_enabled(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Stored size for `id`, or its catalog default.
    #[must_use]
    pub fn size_of(&self, id: &str) -> SizeClass {
        self.sizes
            .get_or(&WidgetId::new(id), self.catalog.default_size(id))
    }

    /// Descriptors of active widgets in display order.
    #[must_use]
    pub fn active_descriptors(&self) -> Vec<&WidgetDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.catalog.get(id.as_str()))
            .collect()
    }

    /// Catalog widgets that are not active, in catalog order.
    #[must_use]
    pub fn available_descriptors(&self) -> Vec<&WidgetDescriptor> {
        self.catalog
            .all()
            .iter()
            .filter(|d| !self.is_enabled(d.id.as_str()))
            .collect()
    }

    /// Active grid widgets (pinned excluded) in display order.
    pub fn grid_order(&self) -> impl Iterator<Item = &WidgetId> + '_ {
        self.order
            .iter()
            .filter(|id| !self.catalog.is_pinned(id.as_str()))
    }

    /// Whether `id` can be picked up by a drag gesture.
    #[must_use]
    pub fn is_reorderable(&self, id: &str) -> bool {
        self.is_enabled(id) && !self.catalog.is_pinned(id)
    }

    #[must_use]
    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Number of applied mutations since hydration.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Observe every applied mutation. Callbacks receive the new snapshot.
    pub fn subscribe(&self, callback: impl Fn(&WidgetLayoutSnapshot) + 'static) -> Subscription {
        self.notifier.subscribe(callback)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.order.iter().position(|active| active == id)
    }
}

fn is_resizable(catalog: &WidgetCatalog, id: &str) -> bool {
    catalog.get(id).is_some_and(|d| !d.pinned)
}

/// Known, first-occurrence ids with pinned widgets moved first.
fn normalize_order(
    catalog: &WidgetCatalog,
    ids: impl IntoIterator<Item = WidgetId>,
) -> Vec<WidgetId> {
    let (mut pinned, grid): (Vec<WidgetId>, Vec<WidgetId>) = catalog
        .retain_known(ids)
        .into_iter()
        .partition(|id| catalog.is_pinned(id.as_str()));
    pinned.extend(grid);
    pinned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_persistence::{Entries, MemoryStorage};
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn ids(raw: &[&str]) -> Vec<WidgetId> {
        raw.iter().map(|s| WidgetId::new(*s)).collect()
    }

    fn model_with_order(order: &[&str]) -> (Arc<MemoryStorage>, WidgetOrderModel) {
        let mut entries = Entries::new();
        entries.insert("widget_order".into(), json!(order));
        let backend = Arc::new(MemoryStorage::with_entries(entries));
        let store = ConfigStore::open(Box::new(Arc::clone(&backend)));
        let model = WidgetOrderModel::hydrate(WidgetCatalog::standard(), store, &[]);
        (backend, model)
    }

    #[test]
    fn first_run_uses_and_persists_defaults() {
        let backend = Arc::new(MemoryStorage::new());
        let store = ConfigStore::open(Box::new(Arc::clone(&backend)));
        let model =
            WidgetOrderModel::hydrate(WidgetCatalog::standard(), store, &ids(&["quote", "tasks"]));
        assert_eq!(model.order(), ids(&["quote", "tasks"]).as_slice());
        assert_eq!(backend.peek("widget_order"), Some(json!(["quote", "tasks"])));
        assert_eq!(backend.peek("widget_sizes"), Some(json!({})));
    }

    #[test]
    fn hydrate_sanitizes_stored_order() {
        let (backend, model) = model_with_order(&["tasks", "bogus", "quote", "tasks", "notes"]);
        assert_eq!(model.order(), ids(&["tasks", "quote", "notes"]).as_slice());
        assert_eq!(backend.peek("widget_order"), Some(json!(["tasks", "quote", "notes"])));
    }

    #[test]
    fn hydrate_keeps_stored_pinned_position() {
        let (backend, model) = model_with_order(&["weather", "quote", "tasks"]);
        assert_eq!(model.order(), ids(&["weather", "quote", "tasks"]).as_slice());
        assert_eq!(backend.peek("widget_order"), Some(json!(["weather", "quote", "tasks"])));
        let grid: Vec<&str> = model.grid_order().map(WidgetId::as_str).collect();
        assert_eq!(grid, vec!["weather", "tasks"]);
        assert!(!model.is_reorderable("quote"));
    }

    #[test]
    fn reorder_reprepends_interleaved_pinned() {
        let (backend, mut model) = model_with_order(&["weather", "quote", "tasks"]);
        assert!(model.reorder("tasks", "weather"));
        assert_eq!(model.order(), ids(&["quote", "tasks", "weather"]).as_slice());
        assert_eq!(backend.peek("widget_order"), Some(json!(["quote", "tasks", "weather"])));
    }

    #[test]
    fn hydrate_drops_unusable_sizes() {
        let mut entries = Entries::new();
        entries.insert("widget_order".into(), json!(["tasks"]));
        entries.insert("widget_sizes".into(), json!({"tasks": 2, "quote": 3, "bogus": 1}));
        let backend = Arc::new(MemoryStorage::with_entries(entries));
        let model = WidgetOrderModel::hydrate(
            WidgetCatalog::standard(),
            ConfigStore::open(Box::new(Arc::clone(&backend))),
            &[],
        );
        assert_eq!(model.sizes().len(), 1);
        assert_eq!(backend.peek("widget_sizes"), Some(json!({"tasks": 2})));
    }

    #[test]
    fn enable_appends_and_pinned_goes_first() {
        let (_, mut model) = model_with_order(&["tasks"]);
        assert!(model.enable("notes"));
        assert!(model.enable("quote"));
        assert_eq!(model.order(), ids(&["quote", "tasks", "notes"]).as_slice());
    }

    #[test]
    fn enable_is_idempotent_and_ignores_unknown() {
        let (backend, mut model) = model_with_order(&["tasks"]);
        let revision = model.revision();
        assert!(!model.enable("tasks"));
        assert!(!model.enable("bogus"));
        assert_eq!(model.revision(), revision);
        assert_eq!(backend.peek("widget_order"), Some(json!(["tasks"])));
    }

    #[test]
    fn disable_and_close_remove() {
        let (_, mut model) = model_with_order(&["tasks", "notes", "weather"]);
        assert!(model.disable("notes"));
        assert!(!model.disable("notes"));
        assert!(model.close("weather"));
        assert_eq!(model.order(), ids(&["tasks"]).as_slice());
    }

    #[test]
    fn toggle_flips() {
        let (_, mut model) = model_with_order(&["tasks"]);
        assert!(model.toggle("tasks"));
        assert!(!model.is_enabled("tasks"));
        assert!(model.toggle("tasks"));
        assert!(model.is_enabled("tasks"));
        assert!(!model.toggle("bogus"));
    }

    #[test]
    fn size_clamped_and_survives_disable() {
        let (backend, mut model) = model_with_order(&["tasks"]);
        assert!(model.set_size("tasks", 9));
        assert_eq!(model.size_of("tasks"), SizeClass::MAX);
        assert_eq!(backend.peek("widget_sizes"), Some(json!({"tasks": 3})));

        model.disable("tasks");
        model.enable("tasks");
        assert_eq!(model.size_of("tasks"), SizeClass::MAX);
    }

    #[test]
    fn set_size_ignores_pinned_unknown_and_unchanged() {
        let (_, mut model) = model_with_order(&["quote", "tasks"]);
        assert!(!model.set_size("quote", 2));
        assert!(!model.set_size("bogus", 2));
        assert!(model.set_size("tasks", 2));
        assert!(!model.set_size("tasks", 2));
        assert_eq!(model.size_of("notes"), SizeClass::MIN);
    }

    #[test]
    fn reorder_moves_within_grid() {
        let (backend, mut model) = model_with_order(&["quote", "tasks", "notes", "weather"]);
        assert!(model.reorder("notes", "tasks"));
        assert_eq!(
            model.order(),
            ids(&["quote", "notes", "tasks", "weather"]).as_slice()
        );
        assert_eq!(
            backend.peek("widget_order"),
            Some(json!(["quote", "notes", "tasks", "weather"]))
        );
    }

    #[test]
    fn reorder_forward_lands_on_target_slot() {
        let (_, mut model) = model_with_order(&["tasks", "notes", "weather"]);
        assert!(model.reorder("tasks", "weather"));
        assert_eq!(model.order(), ids(&["notes", "weather", "tasks"]).as_slice());
    }

    #[test]
    fn reorder_noops() {
        let (_, mut model) = model_with_order(&["quote", "tasks", "notes"]);
        assert!(!model.reorder("tasks", "tasks"));
        assert!(!model.reorder("quote", "tasks"));
        assert!(!model.reorder("tasks", "quote"));
        assert!(!model.reorder("tasks", "weather"));
        assert_eq!(model.revision(), 0);
    }

    #[test]
    fn subscribers_see_snapshots() {
        let (_, mut model) = model_with_order(&["tasks"]);
        let last_len = Rc::new(Cell::new(0usize));
        let seen = Rc::clone(&last_len);
        let _sub = model.subscribe(move |snap| seen.set(snap.order.len()));

        model.enable("notes");
        assert_eq!(last_len.get(), 2);
        model.disable("tasks");
        assert_eq!(last_len.get(), 1);
        assert_eq!(model.revision(), 2);
    }

    #[test]
    fn descriptor_views() {
        let (_, model) = model_with_order(&["quote", "notes"]);
        let active: Vec<&str> = model
            .active_descriptors()
            .iter()
            .map(|d| d.display_name.as_str())
            .collect();
        assert_eq!(active, vec!["Quote", "Notes"]);
        assert_eq!(model.available_descriptors().len(), 5);
        let grid: Vec<&WidgetId> = model.grid_order().collect();
        assert_eq!(grid, vec![&WidgetId::new("notes")]);
        assert!(model.is_reorderable("notes"));
        assert!(!model.is_reorderable("quote"));
        assert!(!model.is_reorderable("tasks"));
    }
}
