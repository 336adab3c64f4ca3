//! Element tree
//!
//! A retained tree of element and text nodes stored in a slotmap arena.
//! Node ids stay valid until the node (or an ancestor's child list) is
//! removed; stale ids are reported as [`DomError::NodeNotFound`].
//!
//! # Example
//!
//! ```rust
//! use glint_core::{Document, Selector};
//!
//! let mut doc = Document::new();
//! let title = doc.create_element("h2");
//! doc.set_attribute(title, "data-animate-text", "").unwrap();
//! doc.set_text_content(title, "Hello world").unwrap();
//! doc.append_child(doc.root(), title).unwrap();
//!
//! let marked = doc.query_all(&Selector::attribute("data-animate-text"));
//! assert_eq!(marked, vec![title]);
//! assert_eq!(doc.text_content(title), "Hello world");
//! ```

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};
use smallvec::SmallVec;

use crate::error::DomError;
use crate::events::EventType;
use crate::geometry::Rect;
use crate::style::{Style, StyleProperty};

new_key_type! {
    pub struct NodeId;
}

impl NodeId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation
    ///
    /// The raw value must have been created by `to_raw()`.
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Element payload
#[derive(Clone, Debug)]
pub struct ElementData {
    pub tag: String,
    pub classes: SmallVec<[String; 2]>,
    pub attributes: IndexMap<String, String>,
    pub style: Style,
    /// Page-space bounds, supplied by whoever lays the page out
    pub bounds: Rect,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: SmallVec::new(),
            attributes: IndexMap::new(),
            style: Style::default(),
            bounds: Rect::ZERO,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub data: NodeData,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            data,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }
}

/// Simple element selector
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// `[name]`
    Attribute(String),
    /// `.name`
    Class(String),
    /// `tag`
    Tag(String),
    /// `a, b, c`
    Any(Vec<Selector>),
}

impl Selector {
    pub fn attribute(name: impl Into<String>) -> Self {
        Selector::Attribute(name.into())
    }

    pub fn class(name: impl Into<String>) -> Self {
        Selector::Class(name.into())
    }

    pub fn tag(name: impl Into<String>) -> Self {
        Selector::Tag(name.into().to_ascii_lowercase())
    }

    pub fn any(selectors: impl IntoIterator<Item = Selector>) -> Self {
        Selector::Any(selectors.into_iter().collect())
    }

    pub fn matches(&self, element: &ElementData) -> bool {
        match self {
            Selector::Attribute(name) => element.attributes.contains_key(name),
            Selector::Class(name) => element.has_class(name),
            Selector::Tag(tag) => element.tag == *tag,
            Selector::Any(selectors) => selectors.iter().any(|s| s.matches(element)),
        }
    }
}

/// The element tree
pub struct Document {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    listeners: FxHashMap<NodeId, SmallVec<[EventType; 2]>>,
}

impl Document {
    /// Create a document with an empty `body` root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(NodeData::Element(ElementData::new("body"))));
        Self {
            nodes,
            root,
            listeners: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes
            .insert(Node::new(NodeData::Element(ElementData::new(tag))))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.nodes.insert(Node::new(NodeData::Text(text.into())))
    }

    /// Append `child` as the last child of `parent`
    ///
    /// A child that already has a parent is moved.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        if !self.nodes.contains_key(child) {
            return Err(DomError::NodeNotFound(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        Ok(())
    }

    /// Remove and drop every descendant of `parent`
    pub fn remove_children(&mut self, parent: NodeId) -> Result<(), DomError> {
        let node = self
            .nodes
            .get_mut(parent)
            .ok_or(DomError::NodeNotFound(parent))?;
        let mut pending = std::mem::take(&mut node.children);

        while let Some(id) = pending.pop() {
            if let Some(removed) = self.nodes.remove(id) {
                self.listeners.remove(&id);
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Replace the children of `id` with a single text node
    ///
    /// Empty text leaves the element without children.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element(id)?;
        self.remove_children(id)?;
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child].parent.take() {
            if let Some(parent) = self.nodes.get_mut(old_parent) {
                parent.children.retain(|c| *c != child);
            }
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.nodes.get(node).and_then(|n| n.parent) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Check if `id` is reachable from the root
    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated text of all descendant text nodes, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element(_) => {
                for child in &node.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Descendants of `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Elements under the root matching `selector`, in document order
    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_all_within(self.root, selector)
    }

    /// Descendant elements of `scope` matching `selector`, in document order
    pub fn query_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| {
                self.nodes[*id]
                    .as_element()
                    .is_some_and(|element| selector.matches(element))
            })
            .collect()
    }

    /// Nearest inclusive ancestor of `id` matching `selector`
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            if node.as_element().is_some_and(|e| selector.matches(e)) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    // =========================================================================
    // Element access
    // =========================================================================

    pub fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match self.nodes.get(id) {
            Some(node) => node.as_element().ok_or(DomError::NotAnElement(id)),
            None => Err(DomError::NodeNotFound(id)),
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.nodes.get_mut(id) {
            Some(Node {
                data: NodeData::Element(element),
                ..
            }) => Ok(element),
            Some(_) => Err(DomError::NotAnElement(id)),
            None => Err(DomError::NodeNotFound(id)),
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|e| e.tag.as_str())
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .ok()
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.get_attribute(id, name).is_some()
    }

    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.into());
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self.element_mut(id)?.attributes.shift_remove(name))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_ok_and(|e| e.has_class(class))
    }

    /// Add a class; adding a class that is already present is a no-op
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_mut(id)?;
        if !element.has_class(class) {
            element.classes.push(class.to_string());
        }
        Ok(())
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(id)?.classes.retain(|c| c != class);
        Ok(())
    }

    pub fn style(&self, id: NodeId) -> Option<&Style> {
        self.element(id).ok().map(|e| &e.style)
    }

    pub fn style_mut(&mut self, id: NodeId) -> Result<&mut Style, DomError> {
        Ok(&mut self.element_mut(id)?.style)
    }

    pub fn style_value(&self, id: NodeId, property: StyleProperty) -> Option<f32> {
        self.style(id).map(|s| s.get(property))
    }

    pub fn set_style_value(
        &mut self,
        id: NodeId,
        property: StyleProperty,
        value: f32,
    ) -> Result<(), DomError> {
        self.style_mut(id)?.set(property, value);
        Ok(())
    }

    pub fn bounds(&self, id: NodeId) -> Option<Rect> {
        self.element(id).ok().map(|e| e.bounds)
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Rect) -> Result<(), DomError> {
        self.element_mut(id)?.bounds = bounds;
        Ok(())
    }

    // =========================================================================
    // Event listeners
    // =========================================================================

    /// Record that a listener for `event_type` is attached to `id`
    ///
    /// The handler itself lives with whichever effect registered it; the
    /// document only tracks attachment so dispatch can skip unlistened nodes.
    pub fn add_event_listener(&mut self, id: NodeId, event_type: EventType) -> Result<(), DomError> {
        self.element(id)?;
        let entry = self.listeners.entry(id).or_default();
        if !entry.contains(&event_type) {
            entry.push(event_type);
        }
        Ok(())
    }

    pub fn has_event_listener(&self, id: NodeId, event_type: EventType) -> bool {
        self.listeners
            .get(&id)
            .is_some_and(|types| types.contains(&event_type))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
