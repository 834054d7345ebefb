#![forbid(unsafe_code)]

//! Layout input events.
//!
//! These are the discrete signals the host (browser shell, test harness)
//! feeds into the layout engine. Raw pointer handling stays in the host; by
//! the time an event reaches this layer it already names the widgets
//! involved.

use serde::{Deserialize, Serialize};

use crate::catalog::WidgetId;

/// Drag-and-drop signal for grid reordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragEvent {
    /// A widget was picked up.
    Start { id: WidgetId },
    /// The pointer moved over another widget while dragging.
    Over { target: WidgetId },
    /// The dragged widget was released over `target`.
    Drop { target: WidgetId },
    /// Drag ended without a drop (released outside any target, Escape, blur).
    End,
}

/// Canonical layout input event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutEvent {
    /// Viewport was resized.
    Resize {
        /// New viewport width in CSS pixels.
        width: u32,
    },
    /// Drag-and-drop step.
    Drag(DragEvent),
    /// Vertical wheel delta in host units (positive scrolls down).
    Wheel { delta_y: i32 },
    /// Explicit "next page" button.
    NextPage,
    /// Explicit "previous page" button.
    PreviousPage,
}

impl LayoutEvent {
    /// Convenience constructor for drag start.
    #[must_use]
    pub fn drag_start(id: impl Into<WidgetId>) -> Self {
        Self::Drag(DragEvent::Start { id: id.into() })
    }

    /// Convenience constructor for drag over.
    #[must_use]
    pub fn drag_over(target: impl Into<WidgetId>) -> Self {
        Self::Drag(DragEvent::Over {
            target: target.into(),
        })
    }

    /// Convenience constructor for drop.
    #[must_use]
    pub fn drop_on(target: impl Into<WidgetId>) -> Self {
        Self::Drag(DragEvent::Drop {
            target: target.into(),
        })
    }

    /// Whether this event can change pagination inputs or the page index.
    #[must_use]
    pub fn affects_layout(&self) -> bool {
        !matches!(
            self,
            Self::Drag(DragEvent::Start { .. } | DragEvent::Over { .. })
        )
    }
}
