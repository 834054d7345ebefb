#![forbid(unsafe_code)]

//! Drag-and-drop reorder state machine.
//!
//! ```text
//!          begin_drag(id)             drop_on(target)
//! Idle ─────────────────▶ Dragging ─────────────────▶ Idle   (model.reorder)
//!                          │  ▲  │
//!             drag_over(t) └──┘  └── cancel ────────▶ Idle   (no mutation)
//! ```
//!
//! `begin_drag` while already dragging replaces the active drag. Every call
//! returns a [`DragTransition`] record; events that do not apply in the
//! current state produce [`DragEffect::Noop`] with an explicit reason rather
//! than an error.

use serde::{Deserialize, Serialize};
use tilepage_core::{DragEvent, WidgetId};

use crate::order_model::WidgetOrderModel;

/// Controller state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        dragged: WidgetId,
        /// Widget currently under the pointer, for drop highlighting.
        hover: Option<WidgetId>,
    },
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    /// Hover, drop or cancel without an active drag.
    IdleWithoutActiveDrag,
    /// The widget is pinned, inactive or unknown and cannot be dragged.
    NotReorderable,
    /// The pointer is still over the same target.
    HoverUnchanged,
}

/// Effect of one controller step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    Lifted {
        dragged: WidgetId,
    },
    /// A new drag replaced an unfinished one.
    Relifted {
        previous: WidgetId,
        dragged: WidgetId,
    },
    Hovered {
        dragged: WidgetId,
        target: WidgetId,
    },
    Dropped {
        dragged: WidgetId,
        target: WidgetId,
        /// Whether the model accepted the reorder.
        reordered: bool,
    },
    Canceled {
        dragged: WidgetId,
    },
    Noop {
        reason: DragNoopReason,
    },
}

/// One state-machine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragTransition {
    pub transition_id: u64,
    pub from: DragState,
    pub to: DragState,
    pub effect: DragEffect,
}

impl DragTransition {
    /// Whether the step mutated the widget order.
    #[must_use]
    pub fn reordered(&self) -> bool {
        matches!(self.effect, DragEffect::Dropped { reordered: true, .. })
    }
}

/// Translates drag gestures into [`WidgetOrderModel::reorder`] calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragReorderController {
    state: DragState,
    transition_counter: u64,
}

impl DragReorderController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> &DragState {
        &self.state
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Widget being dragged, if any.
    #[must_use]
    pub fn dragged(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::Dragging { dragged, .. } => Some(dragged),
            DragState::Idle => None,
        }
    }

    /// Widget under the pointer during a drag, if any.
    #[must_use]
    pub fn hover_target(&self) -> Option<&WidgetId> {
        match &self.state {
            DragState::Dragging { hover, .. } => hover.as_ref(),
            DragState::Idle => None,
        }
    }

    /// Pick up `id`.
    ///
    /// Only active grid widgets can be dragged. Picking up a widget that
    /// cannot be dragged while another drag is active cancels that drag and
    /// reports it as [`DragEffect::Canceled`].
    pub fn begin_drag(&mut self, model: &WidgetOrderModel, id: &str) -> DragTransition {
        let from = self.state.clone();
        let effect = if !model.is_reorderable(id) {
            match std::mem::take(&mut self.state) {
                DragState::Dragging { dragged, .. } => {
                    tracing::debug!(
                        dragged = %dragged,
                        refused = %id,
                        "active drag canceled by unreorderable lift"
                    );
                    DragEffect::Canceled { dragged }
                }
                DragState::Idle => DragEffect::Noop {
                    reason: DragNoopReason::NotReorderable,
                },
            }
        } else {
            let dragged = WidgetId::new(id);
            self.state = DragState::Dragging {
                dragged: dragged.clone(),
                hover: None,
            };
            match from {
                DragState::Dragging {
                    dragged: ref previous,
                    ..
                } => DragEffect::Relifted {
                    previous: previous.clone(),
                    dragged,
                },
                DragState::Idle => DragEffect::Lifted { dragged },
            }
        };
        self.record(from, effect)
    }

    /// Track the widget under the pointer. Never mutates the model.
    pub fn drag_over(&mut self, target: &str) -> DragTransition {
        let from = self.state.clone();
        let effect = match &mut self.state {
            DragState::Idle => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            DragState::Dragging { hover, .. }
                if hover.as_ref().is_some_and(|current| current == target) =>
            {
                DragEffect::Noop {
                    reason: DragNoopReason::HoverUnchanged,
                }
            }
            DragState::Dragging { dragged, hover } => {
                let target = WidgetId::new(target);
                *hover = Some(target.clone());
                DragEffect::Hovered {
                    dragged: dragged.clone(),
                    target,
                }
            }
        };
        self.record(from, effect)
    }

    /// Release the dragged widget over `target` and reorder the model.
    pub fn drop_on(&mut self, model: &mut WidgetOrderModel, target: &str) -> DragTransition {
        let from = self.state.clone();
        let effect = match std::mem::take(&mut self.state) {
            DragState::Idle => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            DragState::Dragging { dragged, .. } => {
                let reordered = model.reorder(dragged.as_str(), target);
                tracing::debug!(
                    dragged = %dragged,
                    target = %target,
                    reordered,
                    "widget dropped"
                );
                DragEffect::Dropped {
                    dragged,
                    target: WidgetId::new(target),
                    reordered,
                }
            }
        };
        self.record(from, effect)
    }

    /// Abandon the active drag without touching the model.
    pub fn cancel(&mut self) -> DragTransition {
        let from = self.state.clone();
        let effect = match std::mem::take(&mut self.state) {
            DragState::Idle => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            DragState::Dragging { dragged, .. } => DragEffect::Canceled { dragged },
        };
        self.record(from, effect)
    }

    /// Dispatch a host drag event.
    pub fn apply_event(
        &mut self,
        model: &mut WidgetOrderModel,
        event: &DragEvent,
    ) -> DragTransition {
        match event {
            DragEvent::Start { id } => self.begin_drag(model, id.as_str()),
            DragEvent::Over { target } => self.drag_over(target.as_str()),
            DragEvent::Drop { target } => self.drop_on(model, target.as_str()),
            DragEvent::End => self.cancel(),
        }
    }

    fn record(&mut self, from: DragState, effect: DragEffect) -> DragTransition {
        self.transition_counter = self.transition_counter.saturating_add(1);
        DragTransition {
            transition_id: self.transition_counter,
            from,
            to: self.state.clone(),
            effect,
        }
    }
}
