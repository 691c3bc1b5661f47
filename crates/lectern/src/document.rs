//! The rendered document tree.
//!
//! A [`DocumentTree`] is an arena of element and text nodes keyed by
//! [`NodeId`]. The host owns it: it builds the tree (by hand or through
//! [`DocumentTree::from_markup`](crate::DocumentTree::from_markup)), keeps
//! layout boxes, computed styles and the scroll offset current, and removes
//! nodes when the page changes. Everything else in Lectern only reads it.
//!
//! # Example
//!
//! ```
//! use lectern::{DocumentTree, Rect};
//!
//! let mut doc = DocumentTree::new();
//! let p = doc.append_element(doc.root(), "p")?;
//! doc.append_text(p, "  Hello world ")?;
//! doc.set_layout(p, Rect::new(0.0, 100.0, 400.0, 20.0))?;
//!
//! assert_eq!(doc.category(p).map(|c| c.as_str()), Some("P"));
//! assert_eq!(doc.trimmed_text(p), "Hello world");
//! # Ok::<(), lectern::DocumentError>(())
//! ```

use std::fmt;

use lectern_core::NodeId;
use slotmap::SlotMap;

use crate::bounds::LineHeight;
use crate::error::DocumentError;
use crate::geometry::{Point, Rect};

/// Result type alias for document operations.
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// An element's category: its tag name, upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(String);

impl Category {
    /// The category of the document root.
    pub const ROOT: &'static str = "BODY";

    /// Create a category from a tag name. Case is normalized.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_uppercase())
    }

    /// The upper-cased tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The subset of an element's computed style Lectern reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedStyle {
    /// Font size in px.
    pub font_size: f32,
    /// Computed line height.
    pub line_height: LineHeight,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            font_size: 16.0,
            line_height: LineHeight::Normal,
        }
    }
}

/// Data carried by an element node.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    pub category: Category,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
    /// Layout box relative to the viewport.
    pub layout: Rect,
    pub style: ComputedStyle,
}

impl ElementData {
    fn new(category: Category) -> Self {
        Self {
            category,
            attributes: Vec::new(),
            layout: Rect::ZERO,
            style: ComputedStyle::default(),
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// What a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An arena-backed document tree rooted at a `BODY` element.
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: SlotMap<NodeId, NodeData>,
    root: NodeId,
    scroll: Point,
}

impl DocumentTree {
    /// Create a document holding only its root element.
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData {
            kind: NodeKind::Element(ElementData::new(Category::new(Category::ROOT))),
            parent: None,
            children: Vec::new(),
        });
        Self {
            nodes,
            root,
            scroll: Point::ZERO,
        }
    }

    /// The root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, text nodes and the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds nothing but its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// The document scroll offset.
    pub fn scroll(&self) -> Point {
        self.scroll
    }

    /// Update the document scroll offset.
    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    /// Append a new element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        category: impl Into<Category>,
    ) -> DocumentResult<NodeId> {
        self.element(parent)?;
        let kind = NodeKind::Element(ElementData::new(category.into()));
        Ok(self.insert_child(parent, kind))
    }

    /// Append a text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> DocumentResult<NodeId> {
        self.element(parent)?;
        Ok(self.insert_child(parent, NodeKind::Text(text.into())))
    }

    fn insert_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.insert(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, node: NodeId) -> DocumentResult<()> {
        if node == self.root {
            return Err(DocumentError::RootRemoval);
        }
        let parent = self
            .nodes
            .get(node)
            .ok_or(DocumentError::InvalidNode(node))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|&child| child != node);
        }

        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(data) = self.nodes.remove(id) {
                stack.extend(data.children);
            }
        }
        tracing::trace!(target: "lectern::document", ?node, "removed subtree");
        Ok(())
    }

    /// Set an element's layout box (viewport coordinates).
    pub fn set_layout(&mut self, node: NodeId, layout: Rect) -> DocumentResult<()> {
        self.element_mut(node)?.layout = layout;
        Ok(())
    }

    /// Set an element's computed style.
    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) -> DocumentResult<()> {
        self.element_mut(node)?.style = style;
        Ok(())
    }

    /// Set or replace an attribute on an element.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> DocumentResult<()> {
        let (name, value) = (name.into(), value.into());
        let element = self.element_mut(node)?;
        match element.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => element.attributes.push((name, value)),
        }
        Ok(())
    }

    /// Whether the node is part of the document.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Whether the node is an element.
    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.nodes.get(node).map(|data| &data.kind),
            Some(NodeKind::Element(_))
        )
    }

    /// What the node is.
    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|data| &data.kind)
    }

    /// Element data for `node`.
    pub fn element(&self, node: NodeId) -> DocumentResult<&ElementData> {
        match self.nodes.get(node) {
            Some(NodeData {
                kind: NodeKind::Element(element),
                ..
            }) => Ok(element),
            Some(_) => Err(DocumentError::NotAnElement(node)),
            None => Err(DocumentError::InvalidNode(node)),
        }
    }

    fn element_mut(&mut self, node: NodeId) -> DocumentResult<&mut ElementData> {
        match self.nodes.get_mut(node) {
            Some(NodeData {
                kind: NodeKind::Element(element),
                ..
            }) => Ok(element),
            Some(_) => Err(DocumentError::NotAnElement(node)),
            None => Err(DocumentError::InvalidNode(node)),
        }
    }

    /// The element's category, or `None` for text and missing nodes.
    pub fn category(&self, node: NodeId) -> Option<&Category> {
        self.element(node).ok().map(|element| &element.category)
    }

    /// An attribute of an element.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).ok()?.attribute(name)
    }

    /// The parent of a node.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    /// All children of a node, text nodes included, in document order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children of a node, in document order.
    pub fn element_children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(node)
            .iter()
            .copied()
            .filter(|&child| self.is_element(child))
    }

    /// `node` followed by its ancestors up to the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.contains_node(node).then_some(node);
        std::iter::successors(start, |&current| self.parent(current))
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    /// Every node under `node` (excluded) in pre-order, text nodes included.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Every element under the root, in pre-order.
    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.is_element(id))
            .collect()
    }

    /// Concatenation of every descendant text node, in document order.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = String::new();
        if let Some(NodeKind::Text(own)) = self.kind(node) {
            text.push_str(own);
        }
        for id in self.descendants(node) {
            if let Some(NodeKind::Text(part)) = self.kind(id) {
                text.push_str(part);
            }
        }
        text
    }

    /// Text content with leading and trailing whitespace removed.
    pub fn trimmed_text(&self, node: NodeId) -> String {
        self.text_content(node).trim().to_owned()
    }

    /// First element whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&node| self.attribute(node, "id") == Some(id))
    }

    /// Nearest inclusive ancestor carrying the attribute `name`.
    pub fn closest_with_attribute(&self, node: NodeId, name: &str) -> Option<NodeId> {
        self.ancestors(node)
            .find(|&id| self.attribute(id, name).is_some())
    }
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}
