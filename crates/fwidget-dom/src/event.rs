#![forbid(unsafe_code)]

//! Raw input records as reported by the host.
//!
//! A [`RawEvent`] carries whatever the host platform happened to populate:
//! page coordinates may be missing (only client coordinates known), the
//! related target may only be available through the legacy
//! `to_element`/`from_element` fields, and the target may be a text node.
//! Normalization is the event layer's job; this module only records.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::PagePoint;
use crate::node::NodeId;

/// DOM event type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseMove,
    MouseOver,
    MouseOut,
    KeyDown,
    KeyUp,
    KeyPress,
    Focus,
    Blur,
    /// Bubbling focus (platforms that support it).
    FocusIn,
    /// Bubbling blur (platforms that support it).
    FocusOut,
    /// Synthetic: focus of the container or any descendant.
    FocusWithin,
    /// Synthetic: blur of the container or any descendant.
    BlurWithin,
    SelectStart,
    Change,
    Submit,
    Load,
    Unload,
    Custom(String),
}

impl EventType {
    /// Parse a DOM event name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "click" => Self::Click,
            "dblclick" => Self::DblClick,
            "mousedown" => Self::MouseDown,
            "mouseup" => Self::MouseUp,
            "mousemove" => Self::MouseMove,
            "mouseover" => Self::MouseOver,
            "mouseout" => Self::MouseOut,
            "keydown" => Self::KeyDown,
            "keyup" => Self::KeyUp,
            "keypress" => Self::KeyPress,
            "focus" => Self::Focus,
            "blur" => Self::Blur,
            "focusin" => Self::FocusIn,
            "focusout" => Self::FocusOut,
            "focuswithin" => Self::FocusWithin,
            "blurwithin" => Self::BlurWithin,
            "selectstart" => Self::SelectStart,
            "change" => Self::Change,
            "submit" => Self::Submit,
            "load" => Self::Load,
            "unload" => Self::Unload,
            other => Self::Custom(other.to_owned()),
        }
    }

    /// DOM event name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseMove => "mousemove",
            Self::MouseOver => "mouseover",
            Self::MouseOut => "mouseout",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::KeyPress => "keypress",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::FocusIn => "focusin",
            Self::FocusOut => "focusout",
            Self::FocusWithin => "focuswithin",
            Self::BlurWithin => "blurwithin",
            Self::SelectStart => "selectstart",
            Self::Change => "change",
            Self::Submit => "submit",
            Self::Load => "load",
            Self::Unload => "unload",
            Self::Custom(name) => name,
        }
    }

    /// Whether the event propagates from the target back up to the root.
    #[must_use]
    pub const fn bubbles(&self) -> bool {
        !matches!(
            self,
            Self::Focus | Self::Blur | Self::Load | Self::Unload
        )
    }

    /// Synthetic types never reach a native listener directly.
    #[must_use]
    pub const fn is_synthetic(&self) -> bool {
        matches!(self, Self::FocusWithin | Self::BlurWithin)
    }
}

bitflags! {
    /// Modifier keys held while an input event was generated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const META  = 0b1000;
    }
}

/// Pointer button that generated a mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
}

/// One unnormalized input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub event_type: EventType,
    /// Node the host reports as the target (may be a text node).
    pub target: Option<NodeId>,
    /// Page coordinates when the platform reports them.
    pub page: Option<PagePoint>,
    /// Viewport-relative coordinates.
    pub client: PagePoint,
    pub related_target: Option<NodeId>,
    /// Legacy related target for `mouseout`.
    pub to_element: Option<NodeId>,
    /// Legacy related target for `mouseover`.
    pub from_element: Option<NodeId>,
    pub modifiers: Modifiers,
    pub button: MouseButton,
    pub key_code: u32,
    pub char_code: u32,
}

impl RawEvent {
    /// Create an event with every optional field unset.
    #[must_use]
    pub fn new(event_type: EventType, target: Option<NodeId>) -> Self {
        Self {
            event_type,
            target,
            page: None,
            client: PagePoint::default(),
            related_target: None,
            to_element: None,
            from_element: None,
            modifiers: Modifiers::NONE,
            button: MouseButton::Primary,
            key_code: 0,
            char_code: 0,
        }
    }

    /// Mouse event with page coordinates populated.
    #[must_use]
    pub fn pointer(event_type: EventType, target: NodeId, page: PagePoint) -> Self {
        Self::new(event_type, Some(target)).with_page(page)
    }

    #[must_use]
    pub fn with_page(mut self, page: PagePoint) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: PagePoint) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    #[must_use]
    pub fn with_related_target(mut self, related: NodeId) -> Self {
        self.related_target = Some(related);
        self
    }

    #[must_use]
    pub fn with_key_code(mut self, key_code: u32) -> Self {
        self.key_code = key_code;
        self
    }

    #[must_use]
    pub fn with_char_code(mut self, char_code: u32) -> Self {
        self.char_code = char_code;
        self
    }

    /// Populate only the legacy related-target fields.
    #[must_use]
    pub fn with_legacy_related(mut self, to: Option<NodeId>, from: Option<NodeId>) -> Self {
        self.to_element = to;
        self.from_element = from;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for ty in [
            EventType::Click,
            EventType::MouseDown,
            EventType::MouseMove,
            EventType::FocusIn,
            EventType::FocusWithin,
            EventType::SelectStart,
            EventType::Unload,
        ] {
            assert_eq!(EventType::from_name(ty.name()), ty);
        }
        assert_eq!(
            EventType::from_name("fw:dragged"),
            EventType::Custom("fw:dragged".into())
        );
    }

    #[test]
    fn focus_and_blur_do_not_bubble() {
        assert!(!EventType::Focus.bubbles());
        assert!(!EventType::Blur.bubbles());
        assert!(EventType::FocusIn.bubbles());
        assert!(EventType::MouseMove.bubbles());
    }
}
