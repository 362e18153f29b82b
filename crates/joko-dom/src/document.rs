#![forbid(unsafe_code)]

//! Arena-backed node tree.
//!
//! Nodes live in a flat arena indexed by [`NodeId`]. Structural mutation
//! (append, replace, remove, clear) only rewires parent/child links; node
//! slots are never reused, so a stale `NodeId` can always be inspected even
//! after its node left the tree. Reachability from the root is what defines
//! "attached".
//!
//! The trade-off: every replaced subtree stays allocated for the life of
//! the document, so an app that updates indefinitely grows the arena
//! without bound. Long-running hosts should rebuild the document at a
//! natural boundary (for example, around unmount).

use tracing::trace;

/// Handle to a node in a [`Document`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Structural mutation errors.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DomError {
    /// The operation needs the node to be attached to a parent.
    #[error("node {id} has no parent")]
    DetachedNode { id: NodeId },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum NodeKind {
    Element {
        tag: String,
        /// Attribute source order is preserved.
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// An in-memory presentation tree.
///
/// Every document starts with a single root element (tag `root`) standing
/// in for the page body; host locations are elements beneath it carrying an
/// `id` attribute.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("root");
        doc
    }

    /// The document root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Allocate a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
        })
    }

    /// Allocate a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    /// Element tag name; `None` for text nodes.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Text node content; `None` for elements.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Attribute value on an element; `None` for text nodes or absent
    /// attributes.
    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Set (or replace, in place) an attribute on an element. No-op on text
    /// nodes.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            match attrs.iter_mut().find(|(n, _)| n == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    #[must_use]
    pub fn child_count(&self, id: NodeId) -> usize {
        self.nodes[id.0].children.len()
    }

    /// Whether the node is reachable from the document root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = id;
        loop {
            if cursor == self.root {
                return true;
            }
            match self.nodes[cursor.0].parent {
                Some(parent) => cursor = parent,
                None => return false,
            }
        }
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children = std::mem::take(&mut self.nodes[parent.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    /// Replace `old` with `new` at the same position in `old`'s parent.
    ///
    /// `new` is detached from any previous parent; `old` ends up detached.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.nodes[old.0]
            .parent
            .ok_or(DomError::DetachedNode { id: old })?;
        self.detach(new);
        let slot = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == old)
            .ok_or(DomError::DetachedNode { id: old })?;
        self.nodes[parent.0].children[slot] = new;
        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        trace!(old = %old, new = %new, "replaced node");
        Ok(())
    }

    /// Remove a node from its parent. No-op when already detached.
    pub fn remove_node(&mut self, id: NodeId) {
        self.detach(id);
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    /// Find the attached element carrying `id="value"`, in document order.
    #[must_use]
    pub fn element_by_id(&self, value: &str) -> Option<NodeId> {
        self.walk(self.root)
            .into_iter()
            .find(|&id| self.attr(id, "id") == Some(value))
    }

    /// All descendants of `subtree` (excluding `subtree` itself) carrying
    /// the attribute `name`, in document order.
    #[must_use]
    pub fn descendants_with_attr(&self, subtree: NodeId, name: &str) -> Vec<NodeId> {
        self.walk(subtree)
            .into_iter()
            .filter(|&id| id != subtree && self.attr(id, name).is_some())
            .collect()
    }

    /// First node in `subtree` (including `subtree`) where attribute `name`
    /// equals `value`. Test and demo convenience.
    #[must_use]
    pub fn find_descendant(&self, subtree: NodeId, name: &str, value: &str) -> Option<NodeId> {
        self.walk(subtree)
            .into_iter()
            .find(|&id| self.attr(id, name) == Some(value))
    }

    /// Concatenated text of all text nodes under (and including) `id`, in
    /// document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.walk(id) {
            if let NodeKind::Text(text) = &self.nodes[node.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// Preorder walk of the subtree rooted at `from` (inclusive).
    fn walk(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
