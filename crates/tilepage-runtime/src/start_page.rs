#![forbid(unsafe_code)]

//! Application root for the widget layout engine.
//!
//! [`StartPage`] owns the one [`WidgetOrderModel`] of the application along
//! with the drag controller, the paginator and the page navigator. Hosts
//! feed it [`LayoutEvent`]s (or call the mutation methods directly) and read
//! back the current page.
//!
//! ```text
//! ConfigStore ─▶ WidgetOrderModel ─(subscribe)─▶ Paginator ─▶ PageNavigator
//!                      ▲                                          │
//!       DragReorderController                              current_page()
//! ```
//!
//! Pagination is recomputed whenever the model reports a change or the
//! viewport crosses a breakpoint; the page index is clamped in the same step.

use std::cell::Cell;
use std::rc::Rc;

use serde::Serialize;
use tilepage_core::{LayoutEvent, WidgetDescriptor};
use tilepage_layout::{
    Breakpoints, Page, PageNavigator, PageStep, Pagination, Paginator, PlacedWidget,
    ViewportClass, WheelPager,
};

use crate::config::StartPageConfig;
use crate::config_store::ConfigStore;
use crate::drag::{DragReorderController, DragState, DragTransition};
use crate::order_model::{WidgetLayoutSnapshot, WidgetOrderModel};
use crate::reactive::{Notifier, Subscription};
use crate::state_persistence::{MemoryStorage, StorageBackend};

/// Page position as seen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageStatus {
    pub viewport_class: ViewportClass,
    pub page_count: usize,
    pub current_page_index: usize,
}

/// What a [`StartPage::handle_event`] call changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// Drag controller step, for drag events.
    pub transition: Option<DragTransition>,
    /// Pagination was recomputed.
    pub repaginated: bool,
    /// The current page index moved.
    pub page_changed: bool,
}

/// Start page layout state.
pub struct StartPage {
    model: WidgetOrderModel,
    drag: DragReorderController,
    paginator: Paginator,
    breakpoints: Breakpoints,
    wheel: WheelPager,
    viewport_width: u32,
    pagination: Pagination,
    navigator: PageNavigator,
    stale: Rc<Cell<bool>>,
    _model_watch: Subscription,
    status: Notifier<PageStatus>,
}

impl StartPage {
    /// Open over `backend`, migrating and hydrating stored state.
    #[must_use]
    pub fn open(config: StartPageConfig, backend: Box<dyn StorageBackend>) -> Self {
        let store = ConfigStore::open(backend);
        let model = WidgetOrderModel::hydrate(config.catalog, store, &config.default_order);

        let stale = Rc::new(Cell::new(false));
        let flag = Rc::clone(&stale);
        let model_watch = model.subscribe(move |_| flag.set(true));

        let layout = config.layout;
        let paginator = Paginator::new(layout.capacities);
        let class = layout.breakpoints.classify_width(layout.initial_viewport_width);
        let pagination = paginator.paginate(model.order(), model.sizes(), model.catalog(), class);
        let navigator = PageNavigator::new(pagination.page_count());

        tracing::info!(
            backend = %model.store().backend_name(),
            widgets = model.order().len(),
            class = %class,
            pages = pagination.page_count(),
            "start page opened"
        );

        Self {
            model,
            drag: DragReorderController::new(),
            paginator,
            breakpoints: layout.breakpoints,
            wheel: WheelPager::new(layout.wheel_threshold),
            viewport_width: layout.initial_viewport_width,
            pagination,
            navigator,
            stale,
            _model_watch: model_watch,
            status: Notifier::new(),
        }
    }

    /// Start page over fresh in-memory storage.
    #[must_use]
    pub fn in_memory(config: StartPageConfig) -> Self {
        Self::open(config, Box::new(MemoryStorage::new()))
    }

    // ── Events ─────────────────────────────────────────────────────────────

    /// Apply one host event.
    pub fn handle_event(&mut self, event: &LayoutEvent) -> EventOutcome {
        let index_before = self.navigator.current();
        let mut outcome = EventOutcome::default();

        match event {
            LayoutEvent::Resize { width } => {
                outcome.repaginated = self.set_viewport_width(*width);
            }
            LayoutEvent::Drag(drag_event) => {
                outcome.transition = Some(self.drag.apply_event(&mut self.model, drag_event));
                outcome.repaginated = self.refresh_if_stale();
            }
            LayoutEvent::Wheel { delta_y } => {
                if let Some(step) = self.wheel.classify(*delta_y) {
                    self.step(step);
                }
            }
            LayoutEvent::NextPage => {
                self.next_page();
            }
            LayoutEvent::PreviousPage => {
                self.previous_page();
            }
        }

        outcome.page_changed = self.navigator.current() != index_before;
        outcome
    }

    /// Report a new viewport width. Returns whether pagination was redone.
    pub fn set_viewport_width(&mut self, width: u32) -> bool {
        self.viewport_width = width;
        let class = self.breakpoints.classify_width(width);
        if class == self.pagination.viewport_class() {
            return false;
        }
        tracing::debug!(width, class = %class, "viewport class changed");
        self.refresh();
        true
    }

    // ── Model mutations ────────────────────────────────────────────────────

    pub fn enable(&mut self, id: &str) -> bool {
        let changed = self.model.enable(id);
        self.refresh_if_stale();
        changed
    }

    pub fn disable(&mut self, id: &str) -> bool {
        let changed = self.model.disable(id);
        self.refresh_if_stale();
        changed
    }

    pub fn close(&mut self, id: &str) -> bool {
        let changed = self.model.close(id);
        self.refresh_if_stale();
        changed
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        let changed = self.model.toggle(id);
        self.refresh_if_stale();
        changed
    }

    pub fn set_size(&mut self, id: &str, requested: i64) -> bool {
        let changed = self.model.set_size(id, requested);
        self.refresh_if_stale();
        changed
    }

    pub fn reorder(&mut self, dragged: &str, target: &str) -> bool {
        let changed = self.model.reorder(dragged, target);
        self.refresh_if_stale();
        changed
    }

    // ── Navigation ─────────────────────────────────────────────────────────

    pub fn next_page(&mut self) -> bool {
        self.step(PageStep::Advance)
    }

    pub fn previous_page(&mut self) -> bool {
        self.step(PageStep::Retreat)
    }

    /// Jump to `index`, clamped to the available pages.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        let moved = self.navigator.go_to(index);
        if moved {
            self.publish_status();
        }
        moved
    }

    fn step(&mut self, step: PageStep) -> bool {
        let moved = self.navigator.step(step);
        if moved {
            self.publish_status();
        }
        moved
    }

    // ── Queries ────────────────────────────────────────────────────────────

    /// Widgets on the current page with their effective sizes.
    #[must_use]
    pub fn current_page(&self) -> &[PlacedWidget] {
        self.pagination
            .page(self.navigator.current())
            .map(Page::widgets)
            .unwrap_or_default()
    }

    /// Active pinned widgets, rendered outside the grid.
    #[must_use]
    pub fn pinned_widgets(&self) -> Vec<&WidgetDescriptor> {
        self.model
            .active_descriptors()
            .into_iter()
            .filter(|d| d.pinned)
            .collect()
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        self.pagination.pages()
    }

    #[must_use]
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pagination.page_count()
    }

    #[must_use]
    pub fn current_page_index(&self) -> usize {
        self.navigator.current()
    }

    #[must_use]
    pub fn status(&self) -> PageStatus {
        PageStatus {
            viewport_class: self.pagination.viewport_class(),
            page_count: self.pagination.page_count(),
            current_page_index: self.navigator.current(),
        }
    }

    #[must_use]
    pub fn viewport_class(&self) -> ViewportClass {
        self.pagination.viewport_class()
    }

    #[must_use]
    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    #[must_use]
    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    #[must_use]
    pub fn model(&self) -> &WidgetOrderModel {
        &self.model
    }

    /// Observe model mutations.
    pub fn subscribe(&self, callback: impl Fn(&WidgetLayoutSnapshot) + 'static) -> Subscription {
        self.model.subscribe(callback)
    }

    /// Observe page count, page index and viewport class changes.
    pub fn subscribe_status(&self, callback: impl Fn(&PageStatus) + 'static) -> Subscription {
        self.status.subscribe(callback)
    }

    // ── Internals ──────────────────────────────────────────────────────────

    fn refresh_if_stale(&mut self) -> bool {
        if !self.stale.replace(false) {
            return false;
        }
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        let class = self.breakpoints.classify_width(self.viewport_width);
        let before = self.status();
        self.pagination = self.paginator.paginate(
            self.model.order(),
            self.model.sizes(),
            self.model.catalog(),
            class,
        );
        if self.navigator.sync_page_count(self.pagination.page_count()) {
            tracing::debug!(
                page = self.navigator.current(),
                pages = self.pagination.page_count(),
                "page index clamped"
            );
        }
        if self.status() != before {
            self.publish_status();
        }
    }

    fn publish_status(&mut self) {
        let status = self.status();
        self.status.notify(&status);
    }
}

impl std::fmt::Debug for StartPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartPage")
            .field("order", &self.model.order())
            .field("viewport_width", &self.viewport_width)
            .field("status", &self.status())
            .field("drag", self.drag.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutSettings;
    use std::cell::RefCell;
    use tilepage_core::WidgetId;

    fn page_ids(page: &StartPage) -> Vec<&str> {
        page.current_page().iter().map(|w| w.id().as_str()).collect()
    }

    fn config_with(order: &[&str]) -> StartPageConfig {
        StartPageConfig::default().with_default_order(order.iter().copied())
    }

    #[test]
    fn first_run_shows_tasks_with_quote_pinned() {
        let page = StartPage::in_memory(StartPageConfig::default());
        assert_eq!(page_ids(&page), vec!["tasks"]);
        let pinned: Vec<&str> = page.pinned_widgets().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(pinned, vec!["quote"]);
        assert_eq!(page.viewport_class(), ViewportClass::Wide);
    }

    #[test]
    fn resize_across_breakpoint_repaginates() {
        let mut page = StartPage::in_memory(config_with(&[
            "tasks", "notes", "weather", "links", "search",
        ]));
        assert_eq!(page.page_count(), 1);

        let outcome = page.handle_event(&LayoutEvent::Resize { width: 400 });
        assert!(outcome.repaginated);
        assert_eq!(page.viewport_class(), ViewportClass::Narrow);
        assert_eq!(page.page_count(), 2);

        let outcome = page.handle_event(&LayoutEvent::Resize { width: 500 });
        assert!(!outcome.repaginated);
    }

    #[test]
    fn widening_clamps_index() {
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather", "links", "search", "ai_assistant"])
                .with_initial_viewport_width(375),
        );
        assert_eq!(page.page_count(), 2);
        assert!(page.next_page());
        assert_eq!(page.current_page_index(), 1);

        let outcome = page.handle_event(&LayoutEvent::Resize { width: 1440 });
        assert!(outcome.page_changed);
        assert_eq!(page.page_count(), 1);
        assert_eq!(page.current_page_index(), 0);
    }

    #[test]
    fn wheel_respects_threshold() {
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather", "links"]).with_initial_viewport_width(375),
        );
        assert!(!page.handle_event(&LayoutEvent::Wheel { delta_y: 50 }).page_changed);
        assert!(page.handle_event(&LayoutEvent::Wheel { delta_y: 51 }).page_changed);
        assert!(!page.handle_event(&LayoutEvent::Wheel { delta_y: 200 }).page_changed);
        assert!(page.handle_event(&LayoutEvent::Wheel { delta_y: -80 }).page_changed);
        assert_eq!(page.current_page_index(), 0);
    }

    #[test]
    fn drag_events_reorder_and_repaginate() {
        let mut page = StartPage::in_memory(config_with(&["quote", "tasks", "notes", "weather"]));
        page.handle_event(&LayoutEvent::drag_start("weather"));
        page.handle_event(&LayoutEvent::drag_over("tasks"));
        let outcome = page.handle_event(&LayoutEvent::drop_on("tasks"));
        assert!(outcome.transition.as_ref().is_some_and(DragTransition::reordered));
        assert!(outcome.repaginated);
        assert_eq!(page_ids(&page), vec!["weather", "tasks", "notes"]);
    }

    #[test]
    fn json_settings_are_sanitized_before_paginating() {
        let settings = LayoutSettings::from_json(
            r#"{
                "breakpoints": {"medium": 900, "wide": 600},
                "capacities": {
                    "narrow": {"columns": 1, "max_rows_per_page": 3},
                    "medium": {"columns": 2, "max_rows_per_page": 3},
                    "wide": {"columns": 0, "max_rows_per_page": 0}
                }
            }"#,
        )
        .unwrap();
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather"])
                .with_layout(settings)
                .with_initial_viewport_width(800),
        );
        assert_eq!(page.viewport_class(), ViewportClass::Narrow);
        assert_eq!(page.page_count(), 1);

        page.handle_event(&LayoutEvent::Resize { width: 1000 });
        assert_eq!(page.viewport_class(), ViewportClass::Wide);
        assert_eq!(page.page_count(), 3);
        assert_eq!(page_ids(&page), vec!["tasks"]);
    }

    #[test]
    fn disable_shrinks_pages() {
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather", "links"]).with_initial_viewport_width(375),
        );
        page.go_to_page(1);
        assert!(page.disable("links"));
        assert_eq!(page.page_count(), 1);
        assert_eq!(page.current_page_index(), 0);
    }

    #[test]
    fn resize_widget_moves_to_next_page() {
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather", "links"]).with_initial_viewport_width(900),
        );
        assert_eq!(page.page_count(), 1);
        for id in ["tasks", "notes", "weather", "links"] {
            page.set_size(id, 2);
        }
        assert_eq!(page.page_count(), 2);
        assert_eq!(page.pages()[1].ids().collect::<Vec<_>>(), vec![&WidgetId::new("links")]);
    }

    #[test]
    fn status_subscribers_notified() {
        let mut page = StartPage::in_memory(
            config_with(&["tasks", "notes", "weather", "links"]).with_initial_viewport_width(375),
        );
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = page.subscribe_status(move |s| sink.borrow_mut().push(s.current_page_index));

        page.handle_event(&LayoutEvent::NextPage);
        page.handle_event(&LayoutEvent::NextPage);
        page.handle_event(&LayoutEvent::PreviousPage);
        assert_eq!(*seen.borrow(), vec![1, 0]);
    }
}
