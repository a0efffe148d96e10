#![forbid(unsafe_code)]

//! Handle positions and the configured handle set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// One of the eight handle positions around a resizable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResizeEdge {
    #[serde(rename = "t")]
    Top,
    #[serde(rename = "b")]
    Bottom,
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
}

impl ResizeEdge {
    /// Every edge, in the order `"all"` expands to.
    pub const ALL: [Self; 8] = [
        Self::Top,
        Self::Bottom,
        Self::Right,
        Self::Left,
        Self::BottomLeft,
        Self::BottomRight,
        Self::TopLeft,
        Self::TopRight,
    ];

    /// Short edge id (`t`, `br`, ...).
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Top => "t",
            Self::Bottom => "b",
            Self::Left => "l",
            Self::Right => "r",
            Self::TopLeft => "tl",
            Self::TopRight => "tr",
            Self::BottomLeft => "bl",
            Self::BottomRight => "br",
        }
    }

    /// Whether the handle changes the width.
    #[must_use]
    pub const fn moves_width(self) -> bool {
        !matches!(self, Self::Top | Self::Bottom)
    }

    /// Whether the handle changes the height.
    #[must_use]
    pub const fn moves_height(self) -> bool {
        !matches!(self, Self::Left | Self::Right)
    }

    /// Dragging right shrinks the element (the left edge moves).
    #[must_use]
    pub const fn flips_x(self) -> bool {
        matches!(self, Self::Left | Self::TopLeft | Self::BottomLeft)
    }

    /// Dragging down shrinks the element (the top edge moves).
    #[must_use]
    pub const fn flips_y(self) -> bool {
        matches!(self, Self::Top | Self::TopLeft | Self::TopRight)
    }

    /// Single-edge handles move along one axis only.
    #[must_use]
    pub const fn is_corner(self) -> bool {
        self.moves_width() && self.moves_height()
    }
}

impl fmt::Display for ResizeEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ResizeEdge {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "t" => Ok(Self::Top),
            "b" => Ok(Self::Bottom),
            "l" => Ok(Self::Left),
            "r" => Ok(Self::Right),
            "tl" => Ok(Self::TopLeft),
            "tr" => Ok(Self::TopRight),
            "bl" => Ok(Self::BottomLeft),
            "br" => Ok(Self::BottomRight),
            other => Err(ConfigError::UnknownEdge(other.to_owned())),
        }
    }
}

/// Ordered, duplicate-free set of handles to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "HandleSpecRepr", into = "Vec<ResizeEdge>")]
pub struct HandleSpec {
    edges: Vec<ResizeEdge>,
}

impl HandleSpec {
    /// All eight handles.
    #[must_use]
    pub fn all() -> Self {
        Self {
            edges: ResizeEdge::ALL.to_vec(),
        }
    }

    /// Build from edges; later duplicates are dropped.
    #[must_use]
    pub fn new(edges: impl IntoIterator<Item = ResizeEdge>) -> Self {
        let mut unique = Vec::new();
        for edge in edges {
            if !unique.contains(&edge) {
                unique.push(edge);
            }
        }
        Self { edges: unique }
    }

    /// Parse `"all"` or a comma separated list such as `"r, b, br"`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        if text.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        let edges = text
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<ResizeEdge>, _>>()?;
        Ok(Self::new(edges))
    }

    #[must_use]
    pub fn edges(&self) -> &[ResizeEdge] {
        &self.edges
    }

    #[must_use]
    pub fn contains(&self, edge: ResizeEdge) -> bool {
        self.edges.contains(&edge)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Default for HandleSpec {
    fn default() -> Self {
        Self::new([ResizeEdge::Right, ResizeEdge::Bottom, ResizeEdge::BottomRight])
    }
}

impl From<HandleSpec> for Vec<ResizeEdge> {
    fn from(spec: HandleSpec) -> Self {
        spec.edges
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum HandleSpecRepr {
    Text(String),
    List(Vec<String>),
}

impl TryFrom<HandleSpecRepr> for HandleSpec {
    type Error = ConfigError;

    fn try_from(repr: HandleSpecRepr) -> Result<Self, Self::Error> {
        match repr {
            HandleSpecRepr::Text(text) => Self::parse(&text),
            HandleSpecRepr::List(items) => {
                if items.len() == 1 && items[0].trim().eq_ignore_ascii_case("all") {
                    return Ok(Self::all());
                }
                let edges = items
                    .iter()
                    .map(|item| item.parse())
                    .collect::<Result<Vec<ResizeEdge>, _>>()?;
                Ok(Self::new(edges))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_expands_to_eight_unique_edges() {
        let spec = HandleSpec::parse("ALL").unwrap();
        assert_eq!(spec.len(), 8);
        for edge in ResizeEdge::ALL {
            assert!(spec.contains(edge));
        }
    }

    #[test]
    fn comma_list_tolerates_spaces_and_duplicates() {
        let spec = HandleSpec::parse("r, b,br, r").unwrap();
        assert_eq!(
            spec.edges(),
            &[ResizeEdge::Right, ResizeEdge::Bottom, ResizeEdge::BottomRight]
        );
        assert_eq!(spec, HandleSpec::default());
    }

    #[test]
    fn unknown_edge_is_rejected() {
        assert_eq!(
            HandleSpec::parse("r, x"),
            Err(ConfigError::UnknownEdge("x".into()))
        );
    }

    #[test]
    fn flip_rules_match_the_moving_edge() {
        assert!(ResizeEdge::Left.flips_x());
        assert!(!ResizeEdge::Left.flips_y());
        assert!(ResizeEdge::TopRight.flips_y());
        assert!(!ResizeEdge::TopRight.flips_x());
        assert!(!ResizeEdge::BottomRight.flips_x());
        assert!(!ResizeEdge::Right.moves_height());
        assert!(!ResizeEdge::Bottom.moves_width());
        assert!(ResizeEdge::BottomLeft.is_corner());
    }

    #[test]
    fn ids_parse_back() {
        for edge in ResizeEdge::ALL {
            assert_eq!(edge.id().parse::<ResizeEdge>().unwrap(), edge);
        }
    }
}
