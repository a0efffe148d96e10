#![forbid(unsafe_code)]

//! Drag capability consumed by the engine.
//!
//! A [`DragController`] turns raw pointer input on one handle into
//! begin/move/end notifications. [`ThresholdDrag`] is the default: it arms
//! on mouse-down and only reports a drag once the pointer has travelled the
//! activation threshold.
//!
//! ```text
//! Idle -> Armed -> Dragging -> Idle
//!    \------> Idle (release before the threshold)
//! ```

use fwidget_dom::PagePoint;
use serde::{Deserialize, Serialize};

/// Pointer travel (pixels) before an armed handle starts dragging.
pub const DEFAULT_DRAG_THRESHOLD: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

/// Allowed travel from the drag origin along one axis: `before` pixels
/// towards negative coordinates, `after` towards positive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisConstraint {
    pub before: i32,
    pub after: i32,
}

impl AxisConstraint {
    /// No travel at all.
    pub const LOCKED: Self = Self {
        before: 0,
        after: 0,
    };

    fn apply(self, origin: i32, value: i32) -> i32 {
        value.clamp(
            origin.saturating_sub(self.before.max(0)),
            origin.saturating_add(self.after.max(0)),
        )
    }
}

/// Raw pointer input routed to one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum DragInput {
    MouseDown { page: PagePoint },
    Move { page: PagePoint },
    MouseUp { page: PagePoint },
}

/// Lifecycle state of a [`ThresholdDrag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragState {
    #[default]
    Idle,
    Armed {
        origin: PagePoint,
        current: PagePoint,
    },
    Dragging {
        origin: PagePoint,
        current: PagePoint,
    },
}

/// Explicit diagnostics for input that is safely ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragNoopReason {
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    ThresholdNotReached,
    Unregistered,
}

/// Notification emitted by one input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum DragEffect {
    MouseDown {
        origin: PagePoint,
    },
    StartDrag {
        origin: PagePoint,
        current: PagePoint,
    },
    Drag {
        origin: PagePoint,
        previous: PagePoint,
        current: PagePoint,
    },
    MouseUp {
        origin: PagePoint,
        end: PagePoint,
        /// Whether the threshold was crossed before release.
        dragged: bool,
    },
    Noop {
        reason: DragNoopReason,
    },
}

impl DragEffect {
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        matches!(self, Self::Noop { .. })
    }
}

/// Per-handle drag behavior.
pub trait DragController {
    /// Feed one pointer input.
    fn process(&mut self, input: DragInput) -> DragEffect;

    /// Limit pointer travel along `axis` for the rest of the registration.
    fn set_axis_constraint(&mut self, axis: Axis, constraint: AxisConstraint);

    fn clear_constraints(&mut self);

    /// Detach for good; later input is ignored.
    fn unregister(&mut self);

    fn is_registered(&self) -> bool;

    /// Drop any in-flight gesture without notifying.
    fn cancel(&mut self);
}

/// Default [`DragController`] with a squared-distance activation threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdDrag {
    state: DragState,
    threshold: u16,
    x_constraint: Option<AxisConstraint>,
    y_constraint: Option<AxisConstraint>,
    registered: bool,
    transition_counter: u64,
}

impl Default for ThresholdDrag {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_THRESHOLD)
    }
}

impl ThresholdDrag {
    /// A zero threshold starts dragging on the first move.
    #[must_use]
    pub const fn new(threshold: u16) -> Self {
        Self {
            state: DragState::Idle,
            threshold,
            x_constraint: None,
            y_constraint: None,
            registered: true,
            transition_counter: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> DragState {
        self.state
    }

    #[must_use]
    pub const fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Number of non-noop transitions taken so far.
    #[must_use]
    pub const fn transition_count(&self) -> u64 {
        self.transition_counter
    }

    #[must_use]
    pub const fn constraint(&self, axis: Axis) -> Option<AxisConstraint> {
        match axis {
            Axis::X => self.x_constraint,
            Axis::Y => self.y_constraint,
        }
    }

    fn constrain(&self, origin: PagePoint, page: PagePoint) -> PagePoint {
        let x = self
            .x_constraint
            .map_or(page.x, |c| c.apply(origin.x, page.x));
        let y = self
            .y_constraint
            .map_or(page.y, |c| c.apply(origin.y, page.y));
        PagePoint::new(x, y)
    }
}

impl DragController for ThresholdDrag {
    fn process(&mut self, input: DragInput) -> DragEffect {
        if !self.registered {
            return DragEffect::Noop {
                reason: DragNoopReason::Unregistered,
            };
        }
        let effect = match (self.state, input) {
            (DragState::Idle, DragInput::MouseDown { page }) => {
                self.state = DragState::Armed {
                    origin: page,
                    current: page,
                };
                DragEffect::MouseDown { origin: page }
            }
            (DragState::Idle, _) => DragEffect::Noop {
                reason: DragNoopReason::IdleWithoutActiveDrag,
            },
            (DragState::Armed { .. } | DragState::Dragging { .. }, DragInput::MouseDown { .. }) => {
                DragEffect::Noop {
                    reason: DragNoopReason::ActiveDragAlreadyInProgress,
                }
            }
            (DragState::Armed { origin, .. }, DragInput::Move { page }) => {
                let current = self.constrain(origin, page);
                if crossed_drag_threshold(origin, page, self.threshold) {
                    self.state = DragState::Dragging { origin, current };
                    DragEffect::StartDrag { origin, current }
                } else {
                    self.state = DragState::Armed { origin, current };
                    DragEffect::Noop {
                        reason: DragNoopReason::ThresholdNotReached,
                    }
                }
            }
            (DragState::Dragging { origin, current: previous }, DragInput::Move { page }) => {
                let current = self.constrain(origin, page);
                self.state = DragState::Dragging { origin, current };
                DragEffect::Drag {
                    origin,
                    previous,
                    current,
                }
            }
            (DragState::Armed { origin, .. }, DragInput::MouseUp { page }) => {
                self.state = DragState::Idle;
                DragEffect::MouseUp {
                    origin,
                    end: self.constrain(origin, page),
                    dragged: false,
                }
            }
            (DragState::Dragging { origin, .. }, DragInput::MouseUp { page }) => {
                self.state = DragState::Idle;
                DragEffect::MouseUp {
                    origin,
                    end: self.constrain(origin, page),
                    dragged: true,
                }
            }
        };
        if !effect.is_noop() {
            self.transition_counter = self.transition_counter.saturating_add(1);
        }
        effect
    }

    fn set_axis_constraint(&mut self, axis: Axis, constraint: AxisConstraint) {
        match axis {
            Axis::X => self.x_constraint = Some(constraint),
            Axis::Y => self.y_constraint = Some(constraint),
        }
    }

    fn clear_constraints(&mut self) {
        self.x_constraint = None;
        self.y_constraint = None;
    }

    fn unregister(&mut self) {
        self.registered = false;
        self.state = DragState::Idle;
    }

    fn is_registered(&self) -> bool {
        self.registered
    }

    fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

fn crossed_drag_threshold(origin: PagePoint, current: PagePoint, threshold: u16) -> bool {
    let (dx, dy) = current.delta_from(origin);
    let threshold = i64::from(threshold);
    let squared_distance = i64::from(dx) * i64::from(dx) + i64::from(dy) * i64::from(dy);
    squared_distance >= threshold * threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> PagePoint {
        PagePoint::new(x, y)
    }

    #[test]
    fn arms_then_starts_after_threshold() {
        let mut drag = ThresholdDrag::new(3);
        assert_eq!(
            drag.process(DragInput::MouseDown { page: p(10, 10) }),
            DragEffect::MouseDown { origin: p(10, 10) }
        );
        assert_eq!(
            drag.process(DragInput::Move { page: p(11, 11) }),
            DragEffect::Noop {
                reason: DragNoopReason::ThresholdNotReached
            }
        );
        assert_eq!(
            drag.process(DragInput::Move { page: p(13, 10) }),
            DragEffect::StartDrag {
                origin: p(10, 10),
                current: p(13, 10)
            }
        );
        assert!(matches!(
            drag.process(DragInput::Move { page: p(20, 10) }),
            DragEffect::Drag { previous, current, .. } if previous == p(13, 10) && current == p(20, 10)
        ));
        assert_eq!(
            drag.process(DragInput::MouseUp { page: p(20, 10) }),
            DragEffect::MouseUp {
                origin: p(10, 10),
                end: p(20, 10),
                dragged: true
            }
        );
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.transition_count(), 4);
    }

    #[test]
    fn release_before_threshold_is_not_a_drag() {
        let mut drag = ThresholdDrag::default();
        drag.process(DragInput::MouseDown { page: p(0, 0) });
        assert!(matches!(
            drag.process(DragInput::MouseUp { page: p(1, 0) }),
            DragEffect::MouseUp { dragged: false, .. }
        ));
    }

    #[test]
    fn second_mouse_down_is_ignored() {
        let mut drag = ThresholdDrag::default();
        drag.process(DragInput::MouseDown { page: p(0, 0) });
        assert_eq!(
            drag.process(DragInput::MouseDown { page: p(5, 5) }),
            DragEffect::Noop {
                reason: DragNoopReason::ActiveDragAlreadyInProgress
            }
        );
    }

    #[test]
    fn locked_axis_pins_the_coordinate() {
        let mut drag = ThresholdDrag::new(0);
        drag.set_axis_constraint(Axis::Y, AxisConstraint::LOCKED);
        drag.process(DragInput::MouseDown { page: p(10, 10) });
        assert_eq!(
            drag.process(DragInput::Move { page: p(30, 50) }),
            DragEffect::StartDrag {
                origin: p(10, 10),
                current: p(30, 10)
            }
        );
        drag.clear_constraints();
        assert_eq!(drag.constraint(Axis::Y), None);
    }

    #[test]
    fn unregistered_controller_ignores_input() {
        let mut drag = ThresholdDrag::default();
        drag.unregister();
        assert!(!drag.is_registered());
        assert_eq!(
            drag.process(DragInput::MouseDown { page: p(0, 0) }),
            DragEffect::Noop {
                reason: DragNoopReason::Unregistered
            }
        );
    }
}
