#![forbid(unsafe_code)]

//! Runtime: persistence, the widget order model and the start page root.
//!
//! # Key Components
//!
//! - [`StartPage`] - Application root; routes [`LayoutEvent`](tilepage_core::LayoutEvent)s
//! - [`WidgetOrderModel`] - Authoritative order and sizes with change notification
//! - [`DragReorderController`] - Drag gesture state machine
//! - [`ConfigStore`] - Typed, fail-soft store with one-time legacy migration
//! - [`StorageBackend`] - Pluggable durable storage ([`MemoryStorage`], `FileStorage`)
//!
//! Nothing here returns storage errors to callers: reads fall back to
//! defaults and failed writes are logged while in-memory state stays
//! authoritative.

pub mod config;
pub mod config_store;
pub mod drag;
pub mod migration;
pub mod order_model;
pub mod reactive;
pub mod schema;
pub mod start_page;
pub mod state_persistence;

pub use config::{DEFAULT_VIEWPORT_WIDTH, LayoutSettings, StartPageConfig};
pub use config_store::{ConfigStore, StoreStats};
pub use drag::{DragEffect, DragNoopReason, DragReorderController, DragState, DragTransition};
pub use migration::{MigrationOutcome, migrate_legacy_enabled_widgets};
pub use order_model::{WidgetLayoutSnapshot, WidgetOrderModel};
pub use reactive::{Notifier, Subscription};
pub use schema::{
    LEGACY_ENABLED_WIDGETS_KEY, PersistedState, WIDGET_ORDER_KEY, WIDGET_SIZES_KEY,
};
pub use start_page::{EventOutcome, PageStatus, StartPage};
#[cfg(feature = "file-storage")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    Entries, MemoryStorage, StorageBackend, StorageError, StorageResult,
};
