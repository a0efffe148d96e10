#![forbid(unsafe_code)]

//! Engine state, notifications and per-input transition records.

use fwidget_dom::PagePoint;
use serde::{Deserialize, Serialize};

use crate::animation::AnimationId;
use crate::drag::DragNoopReason;
use crate::edge::ResizeEdge;
use crate::geometry::Geometry;

/// Resize lifecycle of one engine.
///
/// ```text
/// Idle -> Primed -> Resizing -> Idle
///    \------> Idle (release before the drag threshold)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ResizeState {
    #[default]
    Idle,
    Primed {
        edge: ResizeEdge,
    },
    Resizing {
        edge: ResizeEdge,
    },
}

impl ResizeState {
    #[must_use]
    pub const fn edge(&self) -> Option<ResizeEdge> {
        match self {
            Self::Idle => None,
            Self::Primed { edge } | Self::Resizing { edge } => Some(*edge),
        }
    }
}

/// Why an input was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeNoopReason {
    NotAHandle,
    IdleWithoutActiveDrag,
    ActiveDragAlreadyInProgress,
    ThresholdNotReached,
    HandleUnregistered,
    Destroyed,
}

impl From<DragNoopReason> for ResizeNoopReason {
    fn from(reason: DragNoopReason) -> Self {
        match reason {
            DragNoopReason::IdleWithoutActiveDrag => Self::IdleWithoutActiveDrag,
            DragNoopReason::ActiveDragAlreadyInProgress => Self::ActiveDragAlreadyInProgress,
            DragNoopReason::ThresholdNotReached => Self::ThresholdNotReached,
            DragNoopReason::Unregistered => Self::HandleUnregistered,
        }
    }
}

/// Answer of a before-resize hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeforeResizeVerdict {
    #[default]
    Proceed,
    /// Drop this frame; geometry stays at the previous frame.
    Cancel,
}

/// Consumer-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ResizeEvent {
    StartResize {
        edge: ResizeEdge,
        geometry: Geometry,
    },
    /// Geometry applied to the element (live frame or commit).
    Resize { geometry: Geometry },
    /// Geometry applied to the proxy before commit.
    ProxyResize { geometry: Geometry },
    /// Session finished; carries the final cached geometry.
    EndResize {
        edge: ResizeEdge,
        geometry: Geometry,
    },
    /// Whole-element drag moved the element.
    Drag { position: PagePoint },
}

/// What one input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum ResizeEffect {
    Primed {
        edge: ResizeEdge,
    },
    /// Released before the drag threshold; no session ran.
    Released {
        edge: ResizeEdge,
    },
    Applied {
        geometry: Geometry,
    },
    Cancelled {
        geometry: Geometry,
    },
    /// Commit handed to the animation driver.
    Animating {
        animation: AnimationId,
        geometry: Geometry,
    },
    Ended {
        edge: ResizeEdge,
        geometry: Geometry,
    },
    MoveArmed,
    Moved {
        position: PagePoint,
    },
    MoveEnded,
    Ignored {
        reason: ResizeNoopReason,
    },
}

/// One engine step with its emitted notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeDispatch {
    pub transition_id: u64,
    pub from: ResizeState,
    pub to: ResizeState,
    pub effect: ResizeEffect,
    pub events: Vec<ResizeEvent>,
}

impl ResizeDispatch {
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        matches!(self.effect, ResizeEffect::Ignored { .. })
    }

    #[must_use]
    pub const fn ignored_reason(&self) -> Option<ResizeNoopReason> {
        match self.effect {
            ResizeEffect::Ignored { reason } => Some(reason),
            _ => None,
        }
    }
}
