#![forbid(unsafe_code)]

//! The node arena.
//!
//! # Invariants
//!
//! 1. A node's `parent` and its presence in that parent's `children` list are
//!    always updated together.
//! 2. The tree is acyclic: a node can never be inserted below itself.
//! 3. Destroyed node ids are never reused; lookups on them fail with
//!    [`DomError::NodeNotFound`].
//! 4. `get_element_by_id` only resolves nodes reachable from the root.
//!
//! # Geometry model
//!
//! The host performs layout and records each node's offset relative to its
//! parent. Page positions are the sum of offsets along the ancestor chain, so
//! moving a container moves everything inside it. `set_xy` writes the offset
//! back and mirrors it into `style.top`/`style.left` for positioned nodes.

use rustc_hash::FxHashMap;

use crate::error::DomError;
use crate::event::EventType;
use crate::geometry::{PagePoint, Rect};
use crate::node::{NodeId, Style, Tag};

/// Loading phase of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    #[default]
    Loading,
    Interactive,
    Complete,
}

/// Handle for one native listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeListenerId(u64);

impl NativeListenerId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NativeListener {
    node: NodeId,
    event_type: EventType,
    capture: bool,
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: Tag,
    id: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    style: Style,
    offset: PagePoint,
    text: String,
}

impl NodeData {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            parent: None,
            children: Vec::new(),
            classes: Vec::new(),
            style: Style::default(),
            offset: PagePoint::default(),
            text: String::new(),
        }
    }
}

/// Host-driven document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<NodeData>>,
    ids: FxHashMap<String, NodeId>,
    root: NodeId,
    body: NodeId,
    scroll: PagePoint,
    ready_state: ReadyState,
    native: FxHashMap<NativeListenerId, NativeListener>,
    next_native: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only the root and an empty body.
    #[must_use]
    pub fn new() -> Self {
        let root = NodeId::new(0);
        let body = NodeId::new(1);
        let mut root_data = NodeData::new(Tag::Document);
        root_data.children.push(body);
        let mut body_data = NodeData::new(Tag::Body);
        body_data.parent = Some(root);
        Self {
            nodes: vec![Some(root_data), Some(body_data)],
            ids: FxHashMap::default(),
            root,
            body,
            scroll: PagePoint::default(),
            ready_state: ReadyState::Loading,
            native: FxHashMap::default(),
            next_native: 1,
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    #[must_use]
    pub const fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Current viewport scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> PagePoint {
        self.scroll
    }

    pub fn set_scroll_offset(&mut self, scroll: PagePoint) {
        self.scroll = scroll;
    }

    // -----------------------------------------------------------------------
    // Node lifecycle
    // -----------------------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: Tag) -> NodeId {
        let id = NodeId::new(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Some(NodeData::new(tag)));
        id
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        let id = self.create_element(Tag::Text);
        if let Some(data) = self.data_mut(id) {
            data.text = text.to_owned();
        }
        id
    }

    /// Whether the node exists (was created and not destroyed).
    #[must_use]
    pub fn exists(&self, node: NodeId) -> bool {
        self.data(node).is_some()
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.data(current).and_then(|d| d.parent);
        }
        false
    }

    /// Detach a node (with its subtree) and free it. Its native listeners are
    /// dropped and its id stops resolving.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), DomError> {
        if node == self.root || node == self.body {
            return Err(DomError::HierarchyRequest {
                parent: self.root,
                child: node,
                reason: "the root and body cannot be destroyed",
            });
        }
        self.require(node)?;
        self.detach(node)?;
        for doomed in self.subtree(node) {
            if let Some(data) = self.nodes.get_mut(doomed.index()).and_then(Option::take)
                && let Some(id) = data.id
                && self.ids.get(&id) == Some(&doomed)
            {
                self.ids.remove(&id);
            }
            self.native.retain(|_, l| l.node != doomed);
        }
        tracing::trace!(node = %node, "node subtree destroyed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&Tag> {
        self.data(node).map(|d| &d.tag)
    }

    #[must_use]
    pub fn id_attr(&self, node: NodeId) -> Option<&str> {
        self.data(node).and_then(|d| d.id.as_deref())
    }

    /// Assign the element's `id` attribute.
    pub fn set_id_attr(&mut self, node: NodeId, id: &str) -> Result<(), DomError> {
        let data = self.data_mut(node).ok_or(DomError::NodeNotFound(node))?;
        let previous = data.id.replace(id.to_owned());
        if let Some(previous) = previous
            && self.ids.get(&previous) == Some(&node)
        {
            self.ids.remove(&previous);
        }
        self.ids.insert(id.to_owned(), node);
        Ok(())
    }

    /// Resolve an element id among attached nodes.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids
            .get(id)
            .copied()
            .filter(|node| self.is_attached(*node))
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.data(node).map(|d| d.text.as_str())
    }

    /// Replace the node's text content.
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let data = self.data_mut(node).ok_or(DomError::NodeNotFound(node))?;
        data.text.clear();
        data.text.push_str(text);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Tree structure
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.data(node).and_then(|d| d.parent)
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.data(node).map_or(&[], |d| d.children.as_slice())
    }

    #[must_use]
    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    #[must_use]
    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|c| *c == node)?;
        siblings.get(index + 1).copied()
    }

    /// Ancestor chain starting at `node` and ending at the topmost ancestor.
    #[must_use]
    pub fn path_to_root(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.data(node).map(|_| node);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// `node` and all of its descendants in document order.
    #[must_use]
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if self.data(current).is_none() {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.path_to_root(node).contains(&ancestor)
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    /// elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` into `parent` before `reference` (or last when `None`).
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        self.check_insertable(parent, child)?;
        if let Some(reference) = reference
            && (reference == child || self.parent(reference) != Some(parent))
        {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.detach(child)?;
        let index = reference.and_then(|r| self.children(parent).iter().position(|c| *c == r));
        let data = self.data_mut(parent).ok_or(DomError::NodeNotFound(parent))?;
        match index {
            Some(index) => data.children.insert(index, child),
            None => data.children.push(child),
        }
        if let Some(child_data) = self.data_mut(child) {
            child_data.parent = Some(parent);
        }
        Ok(())
    }

    /// Put `new_child` where `old_child` is; `old_child` becomes detached.
    pub fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(old_child) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: old_child,
            });
        }
        if new_child == old_child {
            return Ok(());
        }
        self.check_insertable(parent, new_child)?;
        self.detach(new_child)?;
        let data = self.data_mut(parent).ok_or(DomError::NodeNotFound(parent))?;
        if let Some(slot) = data.children.iter_mut().find(|c| **c == old_child) {
            *slot = new_child;
        }
        if let Some(new_data) = self.data_mut(new_child) {
            new_data.parent = Some(parent);
        }
        if let Some(old_data) = self.data_mut(old_child) {
            old_data.parent = None;
        }
        Ok(())
    }

    /// Remove `child` from `parent`; the child stays alive, detached.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Detach `node` from its parent, if any.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        let parent = self.require(node)?.parent;
        if let Some(parent) = parent {
            if let Some(data) = self.data_mut(parent) {
                data.children.retain(|c| *c != node);
            }
            if let Some(data) = self.data_mut(node) {
                data.parent = None;
            }
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Classes
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.data(node)
            .is_some_and(|d| d.classes.iter().any(|c| c == class))
    }

    /// Add a class name; adding an existing class is a no-op.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.data_mut(node)
            && !data.classes.iter().any(|c| c == class)
        {
            data.classes.push(class.to_owned());
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(data) = self.data_mut(node) {
            data.classes.retain(|c| c != class);
        }
    }

    #[must_use]
    pub fn classes(&self, node: NodeId) -> &[String] {
        self.data(node).map_or(&[], |d| d.classes.as_slice())
    }

    // -----------------------------------------------------------------------
    // Style and geometry
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn style(&self, node: NodeId) -> Option<&Style> {
        self.data(node).map(|d| &d.style)
    }

    pub fn style_mut(&mut self, node: NodeId) -> Option<&mut Style> {
        self.data_mut(node).map(|d| &mut d.style)
    }

    /// Inner width in pixels (inline width, `0` when unset).
    #[must_use]
    pub fn client_width(&self, node: NodeId) -> i32 {
        self.style(node).and_then(|s| s.width).unwrap_or(0)
    }

    /// Inner height in pixels (inline height, `0` when unset).
    #[must_use]
    pub fn client_height(&self, node: NodeId) -> i32 {
        self.style(node).and_then(|s| s.height).unwrap_or(0)
    }

    /// Offset relative to the parent, as last laid out by the host.
    #[must_use]
    pub fn offset(&self, node: NodeId) -> Option<PagePoint> {
        self.data(node).map(|d| d.offset)
    }

    /// Record a layout result: the node's offset relative to its parent.
    pub fn set_offset(&mut self, node: NodeId, offset: PagePoint) -> Result<(), DomError> {
        let data = self.data_mut(node).ok_or(DomError::NodeNotFound(node))?;
        data.offset = offset;
        Ok(())
    }

    /// Page position of the node's top-left corner.
    #[must_use]
    pub fn xy(&self, node: NodeId) -> Option<PagePoint> {
        let path = self.path_to_root(node);
        if path.is_empty() {
            return None;
        }
        Some(path.iter().fold(PagePoint::default(), |acc, n| {
            let offset = self.offset(*n).unwrap_or_default();
            acc.offset(offset.x, offset.y)
        }))
    }

    /// Move the node so its top-left corner lands on `page`.
    pub fn set_xy(&mut self, node: NodeId, page: PagePoint) -> Result<(), DomError> {
        self.require(node)?;
        let parent_xy = self
            .parent(node)
            .and_then(|p| self.xy(p))
            .unwrap_or_default();
        let (x, y) = page.delta_from(parent_xy);
        let data = self.data_mut(node).ok_or(DomError::NodeNotFound(node))?;
        data.offset = PagePoint::new(x, y);
        if data.style.is_positioned() {
            data.style.left = Some(x);
            data.style.top = Some(y);
        }
        Ok(())
    }

    /// Move only the horizontal page position.
    pub fn set_x(&mut self, node: NodeId, x: i32) -> Result<(), DomError> {
        let current = self.xy(node).ok_or(DomError::NodeNotFound(node))?;
        self.set_xy(node, PagePoint::new(x, current.y))
    }

    /// Move only the vertical page position.
    pub fn set_y(&mut self, node: NodeId, y: i32) -> Result<(), DomError> {
        let current = self.xy(node).ok_or(DomError::NodeNotFound(node))?;
        self.set_xy(node, PagePoint::new(current.x, y))
    }

    /// Page rectangle (position plus client size).
    #[must_use]
    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        let origin = self.xy(node)?;
        Some(Rect::new(
            origin.x,
            origin.y,
            self.client_width(node),
            self.client_height(node),
        ))
    }

    // -----------------------------------------------------------------------
    // Native listeners
    // -----------------------------------------------------------------------

    /// Register a native listener on `node`.
    pub fn add_native_listener(
        &mut self,
        node: NodeId,
        event_type: &EventType,
        capture: bool,
    ) -> Result<NativeListenerId, DomError> {
        self.require(node)?;
        let id = NativeListenerId(self.next_native);
        self.next_native = self.next_native.saturating_add(1);
        self.native.insert(
            id,
            NativeListener {
                node,
                event_type: event_type.clone(),
                capture,
            },
        );
        Ok(id)
    }

    /// Remove a native listener registration.
    pub fn remove_native_listener(&mut self, id: NativeListenerId) -> Result<(), DomError> {
        self.native
            .remove(&id)
            .map(|_| ())
            .ok_or(DomError::UnknownNativeListener(id.0))
    }

    /// Number of native registrations on `node`.
    #[must_use]
    pub fn native_listener_count(&self, node: NodeId) -> usize {
        self.native.values().filter(|l| l.node == node).count()
    }

    /// Whether a native registration exists for `node`/`event_type`/`capture`.
    #[must_use]
    pub fn has_native_listener(&self, node: NodeId, event_type: &EventType, capture: bool) -> bool {
        self.native
            .values()
            .any(|l| l.node == node && &l.event_type == event_type && l.capture == capture)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn data(&self, node: NodeId) -> Option<&NodeData> {
        self.nodes.get(node.index()).and_then(Option::as_ref)
    }

    fn data_mut(&mut self, node: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(node.index()).and_then(Option::as_mut)
    }

    fn require(&self, node: NodeId) -> Result<&NodeData, DomError> {
        self.data(node).ok_or(DomError::NodeNotFound(node))
    }

    fn check_insertable(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_data = self.require(parent)?;
        self.require(child)?;
        if matches!(parent_data.tag, Tag::Text) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "text nodes cannot have children",
            });
        }
        if child == self.root {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "the document root cannot be inserted",
            });
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest {
                parent,
                child,
                reason: "a node cannot be inserted below itself",
            });
        }
        Ok(())
    }
}
