#![forbid(unsafe_code)]

//! Stand-in element resized during a proxy session.

use fwidget_dom::{DomError, Document, NodeId, Position, Rect, Tag, Visibility};

/// Stacking order while the proxy is shown.
pub const PROXY_ACTIVE_Z_INDEX: i32 = 1000;
/// Stacking order while the proxy is parked.
pub const PROXY_PARKED_Z_INDEX: i32 = -1;

/// An absolutely positioned body child. Hidden and stacked below the page
/// while no proxy session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proxy {
    node: NodeId,
}

impl Proxy {
    /// Create the proxy sized like `element`.
    pub fn create(doc: &mut Document, element: NodeId, class: &str) -> Result<Self, DomError> {
        let node = doc.create_element(Tag::Div);
        doc.add_class(node, class);
        let (height, width) = (doc.client_height(element), doc.client_width(element));
        if let Some(style) = doc.style_mut(node) {
            style.position = Position::Absolute;
            style.height = Some(height);
            style.width = Some(width);
            style.visibility = Visibility::Hidden;
            style.z_index = Some(PROXY_PARKED_Z_INDEX);
        }
        let body = doc.body();
        doc.append_child(body, node)?;
        Ok(Self { node })
    }

    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub fn is_visible(&self, doc: &Document) -> bool {
        doc.style(self.node)
            .is_some_and(|s| s.visibility == Visibility::Visible)
    }

    /// Bring the proxy up over `rect`.
    pub fn show(&self, doc: &mut Document, rect: Rect) -> Result<(), DomError> {
        let style = doc
            .style_mut(self.node)
            .ok_or(DomError::NodeNotFound(self.node))?;
        style.visibility = Visibility::Visible;
        style.z_index = Some(PROXY_ACTIVE_Z_INDEX);
        style.height = Some(rect.height);
        style.width = Some(rect.width);
        doc.set_xy(self.node, rect.origin())
    }

    pub fn hide(&self, doc: &mut Document) {
        if let Some(style) = doc.style_mut(self.node) {
            style.visibility = Visibility::Hidden;
            style.z_index = Some(PROXY_PARKED_Z_INDEX);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwidget_dom::PagePoint;

    #[test]
    fn show_covers_the_rect_and_hide_parks_it() {
        let mut doc = Document::new();
        let el = doc.create_element(Tag::Div);
        if let Some(style) = doc.style_mut(el) {
            style.width = Some(80);
            style.height = Some(40);
        }
        let proxy = Proxy::create(&mut doc, el, "fw-resize-proxy").unwrap();
        assert_eq!(doc.client_width(proxy.node()), 80);
        assert!(!proxy.is_visible(&doc));

        proxy
            .show(&mut doc, Rect::new(30, 60, 120, 90))
            .unwrap();
        assert!(proxy.is_visible(&doc));
        assert_eq!(doc.xy(proxy.node()), Some(PagePoint::new(30, 60)));
        assert_eq!(doc.client_height(proxy.node()), 90);
        assert_eq!(
            doc.style(proxy.node()).and_then(|s| s.z_index),
            Some(PROXY_ACTIVE_Z_INDEX)
        );

        proxy.hide(&mut doc);
        assert!(!proxy.is_visible(&doc));
    }
}
