#![forbid(unsafe_code)]

//! Node identity, element tags, and inline style.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable arena key for a document node.
///
/// Ids are never reused within one [`Document`](crate::Document), so a stale
/// id resolves to "not found" rather than to an unrelated node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Document,
    Body,
    Div,
    Span,
    Img,
    Input,
    Textarea,
    Iframe,
    Select,
    /// Character data. Event targets that resolve to a text node are
    /// retargeted to the parent element.
    Text,
    Other(String),
}

impl Tag {
    /// Parse a tag name case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "#document" => Self::Document,
            "body" => Self::Body,
            "div" => Self::Div,
            "span" => Self::Span,
            "img" => Self::Img,
            "input" => Self::Input,
            "textarea" => Self::Textarea,
            "iframe" => Self::Iframe,
            "select" => Self::Select,
            "#text" => Self::Text,
            other => Self::Other(other.to_owned()),
        }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Document => "#document",
            Self::Body => "body",
            Self::Div => "div",
            Self::Span => "span",
            Self::Img => "img",
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Iframe => "iframe",
            Self::Select => "select",
            Self::Text => "#text",
            Self::Other(name) => name,
        }
    }

    /// Whether decorations (such as resize handles) may be appended as
    /// children of this element.
    ///
    /// Replaced and form-control elements render no child content, so they
    /// must be wrapped instead.
    #[must_use]
    pub const fn accepts_children(&self) -> bool {
        !matches!(
            self,
            Self::Img | Self::Input | Self::Textarea | Self::Iframe | Self::Select | Self::Text
        )
    }
}

/// CSS `position` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
}

/// CSS `visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// CSS `display`, limited to the values widgets toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    /// No inline override; the element's natural display.
    #[default]
    Initial,
    Inline,
    Block,
    None,
}

/// Inline style of one element. Lengths are whole pixels; `None` means the
/// property is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Style {
    pub position: Position,
    pub top: Option<i32>,
    pub left: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub visibility: Visibility,
    pub display: Display,
    pub z_index: Option<i32>,
}

impl Style {
    /// Whether `top`/`left` take effect for this element.
    #[must_use]
    pub const fn is_positioned(&self) -> bool {
        !matches!(self.position, Position::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_round_trip() {
        for tag in [
            Tag::Div,
            Tag::Span,
            Tag::Img,
            Tag::Input,
            Tag::Textarea,
            Tag::Iframe,
            Tag::Select,
            Tag::Body,
        ] {
            assert_eq!(Tag::from_name(tag.name()), tag);
        }
        assert_eq!(Tag::from_name("IMG"), Tag::Img);
        assert_eq!(Tag::from_name("canvas"), Tag::Other("canvas".into()));
    }

    #[test]
    fn childless_tags_are_flagged() {
        for tag in [Tag::Img, Tag::Input, Tag::Textarea, Tag::Iframe, Tag::Select] {
            assert!(!tag.accepts_children(), "{} must not accept children", tag.name());
        }
        assert!(Tag::Div.accepts_children());
        assert!(Tag::Other("section".into()).accepts_children());
    }

    #[test]
    fn static_is_not_positioned() {
        let mut style = Style::default();
        assert!(!style.is_positioned());
        style.position = Position::Absolute;
        assert!(style.is_positioned());
    }
}
