//! Arena-backed markup tree.
//!
//! Nodes live in a `Vec` and are addressed by `NodeId`. Detaching a node
//! never frees its slot, so a stale id always stays in bounds; it simply
//! stops being reachable from the root. `is_attached` is the liveness test.

// ─────────────────────────────────────────────────────────────────────────────
// Node Types
// ─────────────────────────────────────────────────────────────────────────────

/// Stable handle to a node inside one `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's tag and attributes. Names are ASCII-lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The surface itself; never serialized
    Root,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tag Classification
// ─────────────────────────────────────────────────────────────────────────────

/// Elements that never have children or an end tag.
pub fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Elements whose content is raw text (no markup, no entity decoding).
pub fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

/// Block-level elements the formatter reasons about.
pub fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "pre"
            | "blockquote"
            | "div"
            | "address"
            | "li"
            | "ul"
            | "ol"
            | "table"
            | "hr"
            | "figure"
            | "section"
            | "article"
    )
}

/// List containers.
pub fn is_list(tag: &str) -> bool {
    matches!(tag, "ul" | "ol")
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// A markup tree with a single root.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document (a bare root).
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Root,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.node(id).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Tag name, for element nodes.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Whether `id` is an element whose tag is one of `tags`.
    pub fn has_tag(&self, id: NodeId, tags: &[&str]) -> bool {
        self.tag(id).is_some_and(|t| tags.contains(&t))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.kind(id), Some(NodeKind::Text(_)))
    }

    /// Whether `id` is a block-level element.
    pub fn is_block_element(&self, id: NodeId) -> bool {
        self.tag(id).is_some_and(is_block)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Length of the node in boundary units: bytes for text, children otherwise.
    pub fn len(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(t)) => t.len(),
            Some(_) => self.children(id).len(),
            None => 0,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| {
            el.attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        })
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Ancestors of `id` from its parent up to and including the root.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.parent(id),
        }
    }

    /// Whether `id` is reachable from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        id == self.root() || self.ancestors(id).any(|a| a == self.root())
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// All descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    /// Descendant text nodes of `id` (or `id` itself, if it is text).
    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        if self.is_text(id) {
            return vec![id];
        }
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_text(n))
            .collect()
    }

    /// Concatenated text of `id` and its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_nodes(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Child-index path from the root to `id`.
    pub fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        path.reverse();
        path
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        NodeId(self.nodes.len() - 1)
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs,
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Create a detached, childless copy of `id`.
    pub fn shallow_clone(&mut self, id: NodeId) -> NodeId {
        let kind = match self.kind(id) {
            Some(NodeKind::Root) | None => NodeKind::Text(String::new()),
            Some(kind) => kind.clone(),
        };
        self.push(kind)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_text(&mut self, id: NodeId, text: String) {
        if let Some(Node {
            kind: NodeKind::Text(t),
            ..
        }) = self.node_mut(id)
        {
            *t = text;
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(Node {
            kind: NodeKind::Element(el),
            ..
        }) = self.node_mut(id)
        {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(Node {
            kind: NodeKind::Element(el),
            ..
        }) = self.node_mut(id)
        {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    /// Change an element's tag, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, tag: &str) {
        if let Some(Node {
            kind: NodeKind::Element(el),
            ..
        }) = self.node_mut(id)
        {
            el.tag = tag.to_ascii_lowercase();
        }
    }

    /// Remove `id` from its parent. The subtree stays intact but unreachable.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&c| c != id);
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    /// Insert `child` into `parent` at `index` (clamped), moving it if attached elsewhere.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if child == self.root() || self.contains(child, parent) {
            return;
        }
        let mut index = index;
        if self.parent(child) == Some(parent) {
            if let Some(current) = self.index_in_parent(child) {
                if current < index {
                    index -= 1;
                }
            }
        }
        self.detach(child);
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let end = self.children(parent).len();
        self.insert_child(parent, end, child);
    }

    /// Replace `id` with its children.
    pub fn unwrap(&mut self, id: NodeId) {
        let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) else {
            return;
        };
        let children = self.children(id).to_vec();
        for (offset, child) in children.into_iter().enumerate() {
            self.insert_child(parent, index + 1 + offset, child);
        }
        self.detach(id);
    }

    /// Wrap `id` in a new element, returning the wrapper.
    pub fn wrap(&mut self, id: NodeId, tag: &str, attrs: Vec<(String, String)>) -> NodeId {
        let wrapper = self.create_element(tag, attrs);
        if let (Some(parent), Some(index)) = (self.parent(id), self.index_in_parent(id)) {
            self.insert_child(parent, index, wrapper);
        }
        self.append_child(wrapper, id);
        wrapper
    }
}

/// Iterator over a node's ancestors.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let p = doc.create_element("P", Vec::new());
        let a = doc.create_text("hello ");
        let b = doc.create_text("world");
        doc.append_child(doc.root(), p);
        doc.append_child(p, a);
        doc.append_child(p, b);
        (doc, p, a, b)
    }

    #[test]
    fn test_tags_are_lowercased() {
        let (doc, p, _, _) = sample();
        assert_eq!(doc.tag(p), Some("p"));
        assert!(doc.is_block_element(p));
    }

    #[test]
    fn test_detach_keeps_slot_but_unreachable() {
        let (mut doc, p, a, b) = sample();
        doc.detach(a);
        assert!(!doc.is_attached(a));
        assert_eq!(doc.text(a), Some("hello "));
        assert_eq!(doc.children(p), &[b]);
    }

    #[test]
    fn test_insert_child_moves_within_parent() {
        let (mut doc, p, a, b) = sample();
        doc.insert_child(p, 2, a);
        assert_eq!(doc.children(p), &[b, a]);
    }

    #[test]
    fn test_insert_child_rejects_cycles() {
        let (mut doc, p, a, _) = sample();
        doc.insert_child(a, 0, p);
        assert_eq!(doc.parent(p), Some(doc.root()));
    }

    #[test]
    fn test_wrap_and_unwrap() {
        let (mut doc, p, a, b) = sample();
        let bold = doc.wrap(b, "b", Vec::new());
        assert_eq!(doc.children(p), &[a, bold]);
        assert_eq!(doc.parent(b), Some(bold));

        doc.unwrap(bold);
        assert_eq!(doc.children(p), &[a, b]);
        assert!(!doc.is_attached(bold));
    }

    #[test]
    fn test_path_and_ancestors() {
        let (doc, p, _, b) = sample();
        assert_eq!(doc.path(b), vec![0, 1]);
        let ancestors: Vec<NodeId> = doc.ancestors(b).collect();
        assert_eq!(ancestors, vec![p, doc.root()]);
    }

    #[test]
    fn test_attributes() {
        let mut doc = Document::new();
        let a = doc.create_element("a", Vec::new());
        doc.set_attr(a, "href", "x");
        doc.set_attr(a, "href", "y");
        assert_eq!(doc.attr(a, "href"), Some("y"));
        doc.remove_attr(a, "href");
        assert_eq!(doc.attr(a, "href"), None);
    }

    #[test]
    fn test_text_content() {
        let (doc, p, _, _) = sample();
        assert_eq!(doc.text_content(p), "hello world");
        assert_eq!(doc.len(p), 2);
    }
}
