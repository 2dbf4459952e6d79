mod parse;
mod serialize;

pub use parse::parse;
pub use serialize::escape_text;

use std::fmt;

// ===================================================================
// Handles and node kinds
// ===================================================================

/// Index of a node inside a [`Dom`] arena.
///
/// Handles stay valid for the lifetime of the arena. A node that has been
/// detached keeps its slot but is no longer reachable from any root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    /// Content between `<!` and `>`, e.g. `DOCTYPE html`.
    Doctype(String),
    Comment(String),
    /// Text exactly as it appeared in the source markup (entities intact).
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

// ===================================================================
// Attributes and class tokens
// ===================================================================

/// Attribute map that keeps source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace the value in place, or append when the attribute is new.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Append only when the attribute is not already present. Duplicate
    /// attributes in markup resolve to the first occurrence.
    pub fn insert_if_absent(&mut self, name: String, value: String) {
        if !self.contains(&name) {
            self.0.push((name, value));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The whitespace-separated tokens of a `class` attribute.
///
/// Ordered for serialization, set-like for membership: `add` appends a token
/// only when it is not present yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(Vec<String>);

impl ClassList {
    pub fn parse(value: &str) -> Self {
        let mut list = ClassList::default();
        for token in value.split_ascii_whitespace() {
            list.add(token);
        }
        list
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|t| t == token)
    }

    /// Returns `true` when the token was newly added.
    pub fn add(&mut self, token: &str) -> bool {
        if token.is_empty() || self.contains(token) {
            return false;
        }
        self.0.push(token.to_string());
        true
    }

}

impl fmt::Display for ClassList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

// ===================================================================
// Elements
// ===================================================================

#[derive(Debug, Clone)]
pub struct Element {
    /// Lower-cased tag name.
    pub name: String,
    pub attrs: Attributes,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_ascii_lowercase(),
            attrs: Attributes::new(),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    /// Raw value of the `class` attribute, or `""`.
    pub fn class_attr(&self) -> &str {
        self.attrs.get("class").unwrap_or("")
    }

    pub fn classes(&self) -> ClassList {
        ClassList::parse(self.class_attr())
    }

    pub fn has_class(&self, token: &str) -> bool {
        self.class_attr()
            .split_ascii_whitespace()
            .any(|t| t == token)
    }

    pub fn add_class(&mut self, token: &str) {
        let mut classes = self.classes();
        if classes.add(token) {
            self.attrs.set("class", classes.to_string());
        }
    }
}

// ===================================================================
// The arena
// ===================================================================

/// A mutable markup tree stored as an arena of nodes.
///
/// Children are owned top-down through each node's child list; the parent
/// link is a plain handle. Moving a node is list splicing: detach from the
/// old parent, insert into the new one.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        dom.root = dom.create(NodeKind::Document);
        dom
    }

    /// The document node created with the arena.
    pub fn root(&self) -> NodeId {
        self.root
    }

    // ---------------------------------------------------------------
    // Construction (all new nodes start detached)
    // ---------------------------------------------------------------

    fn create(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// A second, independent document root in the same arena.
    pub fn create_document(&mut self) -> NodeId {
        self.create(NodeKind::Document)
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(NodeKind::Element(Element::new(name)))
    }

    pub fn create_element_with(&mut self, element: Element) -> NodeId {
        self.create(NodeKind::Element(element))
    }

    /// `markup` is stored as-is; escape it first with [`escape_text`] when it
    /// comes from plain text.
    pub fn create_text(&mut self, markup: &str) -> NodeId {
        self.create(NodeKind::Text(markup.to_string()))
    }

    pub fn create_comment(&mut self, body: &str) -> NodeId {
        self.create(NodeKind::Comment(body.to_string()))
    }

    pub fn create_doctype(&mut self, body: &str) -> NodeId {
        self.create(NodeKind::Doctype(body.to_string()))
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn add_class(&mut self, id: NodeId, token: &str) {
        if let Some(element) = self.element_mut(id) {
            element.add_class(token);
        }
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attrs.set(name, value);
        }
    }

    // ---------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------

    /// Unlink `id` from its parent. The subtree stays intact but is no longer
    /// reachable from the parent's root.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Drop a node and its subtree from the tree.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Replace `id` with its children, in place.
    pub fn replace_with_children(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        let index = self
            .children(parent)
            .iter()
            .position(|c| *c == id)
            .unwrap_or_default();
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for (offset, child) in children.into_iter().enumerate() {
            self.nodes[child.0].parent = None;
            self.insert_child(parent, child, Some(index + offset));
        }
        self.detach(id);
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, None);
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, Some(0));
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        debug_assert!(
            !self.contains(child, parent),
            "inserting a node into its own subtree"
        );
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        match index {
            Some(i) => children.insert(i.min(children.len()), child),
            None => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
    }

    /// Replace every child of `id` with a single text node.
    pub fn set_text(&mut self, id: NodeId, markup: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !markup.is_empty() {
            let text = self.create_text(markup);
            self.append_child(id, text);
        }
    }

    // ---------------------------------------------------------------
    // Traversal
    // ---------------------------------------------------------------

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            dom: self,
            next: self.parent(id),
        }
    }

    /// Whether `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Descendants of `scope` in document order, excluding `scope` itself.
    ///
    /// Returns a snapshot so callers can mutate the tree while walking it.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Element descendants of `scope`, in document order, that satisfy `pred`.
    pub fn find_all(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(&pred))
            .collect()
    }

    pub fn find_first(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.find_all(scope, pred).into_iter().next()
    }

    /// Nearest strict ancestor element satisfying `pred`.
    pub fn closest_ancestor(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.ancestors(id)
            .find(|a| self.element(*a).is_some_and(&pred))
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let NodeKind::Text(text) = self.kind(id) {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match self.kind(node) {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub struct Ancestors<'a> {
    dom: &'a Dom,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.dom.parent(current);
        Some(current)
    }
}
