#![forbid(unsafe_code)]

//! Floating size readout shown while dragging.

use fwidget_dom::{Display, DomError, Document, NodeId, PagePoint, Position, Tag};
use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Distance of the readout from the pointer, on both axes.
pub const STATUS_POINTER_OFFSET: i32 = 12;

/// What the overlay shows: the live size and its change since the last
/// committed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReadout {
    pub height: i32,
    pub width: i32,
    pub delta_height: i32,
    pub delta_width: i32,
}

impl StatusReadout {
    #[must_use]
    pub const fn new(current: Size, committed: Size) -> Self {
        Self {
            height: current.height,
            width: current.width,
            delta_height: current.height.saturating_sub(committed.height),
            delta_width: current.width.saturating_sub(committed.width),
        }
    }

    /// `"120 x 300 (+20 x 0)"`
    #[must_use]
    pub fn text(&self) -> String {
        format!(
            "{} x {} ({} x {})",
            self.height,
            self.width,
            signed(self.delta_height),
            signed(self.delta_width)
        )
    }
}

fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

/// The readout element. It lives as the first child of the body and is
/// hidden (`display: none`) outside of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOverlay {
    node: NodeId,
}

impl StatusOverlay {
    pub fn create(doc: &mut Document, class: &str) -> Result<Self, DomError> {
        let node = doc.create_element(Tag::Span);
        doc.add_class(node, class);
        if let Some(style) = doc.style_mut(node) {
            style.position = Position::Absolute;
            style.display = Display::None;
        }
        let body = doc.body();
        let first = doc.first_child(body);
        doc.insert_before(body, node, first)?;
        Ok(Self { node })
    }

    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn is_visible(&self, doc: &Document) -> bool {
        doc.style(self.node)
            .is_some_and(|s| s.display != Display::None)
    }

    /// Rewrite the readout and move it next to the pointer. `show` makes it
    /// visible; otherwise only the content is kept current.
    pub fn update(
        &self,
        doc: &mut Document,
        readout: &StatusReadout,
        pointer: PagePoint,
        show: bool,
    ) -> Result<(), DomError> {
        if show && let Some(style) = doc.style_mut(self.node) {
            style.display = Display::Inline;
        }
        doc.set_text(self.node, &readout.text())?;
        doc.set_xy(
            self.node,
            pointer.offset(STATUS_POINTER_OFFSET, STATUS_POINTER_OFFSET),
        )
    }

    pub fn hide(&self, doc: &mut Document) {
        if let Some(style) = doc.style_mut(self.node) {
            style.display = Display::None;
        }
    }
}
