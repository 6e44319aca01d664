//! Arena-backed document tree.
//!
//! Nodes live in a flat `Vec` and refer to each other by [`NodeId`]. The
//! parent and sibling links are plain indices used for lookups; ownership is
//! the arena itself, so there are no reference cycles to manage.

use std::io;

use html5ever::{ParseOpts, QualName, parse_document, tendril::TendrilSink};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tracing::trace;

use crate::category;

/// Index of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root of the tree.
    Document,
    /// Doctype declaration text, e.g. `html`.
    Doctype(String),
    /// Element with its attributes in source order.
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    /// Character data.
    Text(String),
    /// Comment body.
    Comment(String),
}

/// A node record in the arena.
#[derive(Debug, Clone)]
pub struct Node {
    /// Payload.
    pub kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// A whole HTML document stored as an arena of nodes.
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
    /// Create an empty document holding only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    /// Parse a complete HTML document with html5ever.
    ///
    /// The parser recovers from tag soup on its own; the only failure is an
    /// error from the underlying reader.
    pub fn parse(html: &str) -> io::Result<Self> {
        let dom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let doc = Self::from_rcdom(&dom);
        trace!(nodes = doc.nodes.len(), "parsed document");
        Ok(doc)
    }

    /// Convert an html5ever `RcDom` into an arena document.
    #[must_use]
    pub fn from_rcdom(dom: &RcDom) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        for child in dom.document.children.borrow().iter() {
            doc.convert(root, child);
        }
        doc
    }

    fn convert(&mut self, parent: NodeId, handle: &Handle) {
        let kind = match &handle.data {
            NodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert(parent, child);
                }
                return;
            }
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => NodeKind::Doctype(doctype_text(name, public_id, system_id)),
            NodeData::Text { contents } => NodeKind::Text(contents.borrow().to_string()),
            NodeData::Comment { contents } => NodeKind::Comment(contents.to_string()),
            NodeData::Element { name, attrs, .. } => NodeKind::Element {
                name: name.local.to_string(),
                attrs: attrs
                    .borrow()
                    .iter()
                    .map(|attr| (attribute_name(&attr.name), attr.value.to_string()))
                    .collect(),
            },
            NodeData::ProcessingInstruction { .. } => return,
        };

        let id = self.append(parent, kind);

        // Template children live in a separate fragment; print them inline.
        let template = match &handle.data {
            NodeData::Element {
                template_contents, ..
            } => template_contents.borrow().clone(),
            _ => None,
        };
        let source = template.as_ref().unwrap_or(handle);
        for child in source.children.borrow().iter() {
            self.convert(id, child);
        }
    }

    /// The document root.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Total number of node records, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document has nothing but its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_is_leaf()
    }

    fn root_is_leaf(&self) -> bool {
        self.nodes[0].first_child.is_none()
    }

    /// Borrow a node record.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Borrow a node's payload.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    /// Iterate over the children of `id` in document order.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.nodes[id.0].first_child,
        }
    }

    /// Create a node and append it as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = Node::new(kind);
        node.parent = Some(parent);
        node.prev_sibling = self.nodes[parent.0].last_child;
        self.nodes.push(node);

        match self.nodes[parent.0].last_child {
            Some(last) => self.nodes[last.0].next_sibling = Some(id),
            None => self.nodes[parent.0].first_child = Some(id),
        }
        self.nodes[parent.0].last_child = Some(id);
        id
    }

    /// Append an element with the given attributes.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.append(
            parent,
            NodeKind::Element {
                name: name.to_string(),
                attrs,
            },
        )
    }

    /// Append a text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.append(parent, NodeKind::Text(text.to_string()))
    }

    /// Unlink a node from its parent and siblings. The record stays in the
    /// arena but is no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.0];
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].first_child = next;
                }
            }
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.0].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Text content of a text node.
    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Mutable text content of a text node.
    pub fn text_mut(&mut self, id: NodeId) -> Option<&mut String> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Tag name of an element node.
    #[must_use]
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Whether `id` is an inline element. Absent nodes are not inline.
    #[must_use]
    pub fn is_inline(&self, id: Option<NodeId>) -> bool {
        id.and_then(|id| self.element_name(id))
            .is_some_and(category::is_inline)
    }

    /// Whether `id` is a preserve-content element.
    #[must_use]
    pub fn is_preserve(&self, id: Option<NodeId>) -> bool {
        id.and_then(|id| self.element_name(id))
            .is_some_and(category::is_preserve)
    }

    /// Whether `id` is a text node.
    #[must_use]
    pub fn is_text(&self, id: Option<NodeId>) -> bool {
        id.is_some_and(|id| matches!(self.nodes[id.0].kind, NodeKind::Text(_)))
    }
}

/// Iterator over a node's children.
#[derive(Debug)]
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

fn attribute_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

fn doctype_text(name: &str, public_id: &str, system_id: &str) -> String {
    let mut text = name.to_string();
    if !public_id.is_empty() {
        text.push_str(&format!(" PUBLIC \"{public_id}\""));
        if !system_id.is_empty() {
            text.push_str(&format!(" \"{system_id}\""));
        }
    } else if !system_id.is_empty() {
        text.push_str(&format!(" SYSTEM \"{system_id}\""));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_links_siblings() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_text(root, "a");
        let b = doc.append_element(root, "b", &[]);
        let c = doc.append_text(root, "c");

        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(doc.prev_sibling(b), Some(a));
        assert_eq!(doc.next_sibling(b), Some(c));
        assert_eq!(doc.parent(c), Some(root));
        assert_eq!(doc.first_child(root), Some(a));
    }

    #[test]
    fn test_detach_middle_and_ends() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_text(root, "a");
        let b = doc.append_text(root, "b");
        let c = doc.append_text(root, "c");

        doc.detach(b);
        assert_eq!(doc.children(root).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(doc.next_sibling(a), Some(c));
        assert_eq!(doc.prev_sibling(c), Some(a));
        assert_eq!(doc.parent(b), None);

        doc.detach(a);
        doc.detach(c);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_builds_html_skeleton() {
        let doc = Document::parse("<!DOCTYPE html><p class=\"x\">hi</p>").unwrap();
        let root = doc.root();
        let top: Vec<_> = doc.children(root).collect();

        assert_eq!(top.len(), 2);
        assert_eq!(doc.kind(top[0]), &NodeKind::Doctype("html".to_string()));
        assert_eq!(doc.element_name(top[1]), Some("html"));

        let body = doc.children(top[1]).nth(1).unwrap();
        assert_eq!(doc.element_name(body), Some("body"));
        let p = doc.first_child(body).unwrap();
        match doc.kind(p) {
            NodeKind::Element { name, attrs } => {
                assert_eq!(name, "p");
                assert_eq!(attrs, &vec![("class".to_string(), "x".to_string())]);
            }
            other => panic!("expected element, got {other:?}"),
        }
        assert_eq!(doc.text(doc.first_child(p).unwrap()), Some("hi"));
    }

    #[test]
    fn test_parse_keeps_duplicate_attribute_order() {
        let doc = Document::parse("<div b=\"1\" a=\"2\"></div>").unwrap();
        let html = doc.first_child(doc.root()).unwrap();
        let body = doc.children(html).nth(1).unwrap();
        let div = doc.first_child(body).unwrap();
        match doc.kind(div) {
            NodeKind::Element { attrs, .. } => {
                let keys: Vec<_> = attrs.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["b", "a"]);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn test_template_contents_become_children() {
        let doc = Document::parse("<template><span>x</span></template>").unwrap();
        let html = doc.first_child(doc.root()).unwrap();
        let head = doc.first_child(html).unwrap();
        let template = doc.first_child(head).unwrap();
        assert_eq!(doc.element_name(template), Some("template"));
        let span = doc.first_child(template).unwrap();
        assert_eq!(doc.element_name(span), Some("span"));
    }

    #[test]
    fn test_doctype_text_with_identifiers() {
        assert_eq!(doctype_text("html", "", ""), "html");
        assert_eq!(
            doctype_text("html", "-//W3C//DTD HTML 4.01//EN", "http://www.w3.org/TR/html4/strict.dtd"),
            "html PUBLIC \"-//W3C//DTD HTML 4.01//EN\" \"http://www.w3.org/TR/html4/strict.dtd\""
        );
        assert_eq!(doctype_text("html", "", "about:legacy-compat"), "html SYSTEM \"about:legacy-compat\"");
    }

    #[test]
    fn test_node_predicates() {
        let mut doc = Document::new();
        let root = doc.root();
        let em = doc.append_element(root, "em", &[]);
        let pre = doc.append_element(root, "pre", &[]);
        let text = doc.append_text(root, "t");

        assert!(doc.is_inline(Some(em)));
        assert!(!doc.is_inline(Some(pre)));
        assert!(!doc.is_inline(Some(text)));
        assert!(!doc.is_inline(None));
        assert!(doc.is_preserve(Some(pre)));
        assert!(doc.is_text(Some(text)));
        assert!(!doc.is_text(None));
    }
}
