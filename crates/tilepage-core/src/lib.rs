#![forbid(unsafe_code)]

//! Core: widget catalog, size classes, and layout input events.
//!
//! Everything in this crate is plain data. The layout crate consumes the
//! catalog and size map to paginate; the runtime crate owns the mutable
//! order model and persistence.

pub mod catalog;
pub mod event;
pub mod size;

pub use catalog::{WidgetCatalog, WidgetDescriptor, WidgetId};
pub use event::{DragEvent, LayoutEvent};
pub use size::{SizeClass, SizeMap};
