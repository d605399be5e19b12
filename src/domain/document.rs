//! Arena-backed XML document tree.
//!
//! Nodes live in a generational arena and refer to each other by index, so a
//! caller can hold handles to a parent and child across a full traversal and
//! detach the child afterwards without fighting the borrow checker.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle to a node position inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(Index);

/// One attribute as it appeared in the source.
///
/// `value` is kept in escaped form so it can be written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element payload: qualified name plus attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name exactly as written (`itunes:author`, `item`)
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// Written as `<name/>` when it still has no children
    pub self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            self_closing: false,
        }
    }

    /// Name with any namespace prefix stripped.
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }
}

/// Strip a `prefix:` from a qualified XML name.
pub fn local_name(qualified: &str) -> &str {
    qualified
        .rsplit_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

/// Content of a tree node. Text-like variants hold raw (escaped) source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Element(e) => write!(f, "<{}>", e.name),
            NodeKind::Text(_) => write!(f, "#text"),
            NodeKind::CData(_) => write!(f, "#cdata"),
            NodeKind::Comment(_) => write!(f, "#comment"),
            NodeKind::ProcessingInstruction(_) => write!(f, "#pi"),
        }
    }
}

/// Tree node in the arena.
#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    /// None for top-level nodes (root element, prolog comments)
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// The `<?xml ...?>` declaration values worth carrying to the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub standalone: Option<String>,
}

impl Default for Declaration {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            standalone: None,
        }
    }
}

/// A namespace binding found on some element while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Empty for the default namespace
    pub prefix: String,
    pub uri: String,
}

/// In-memory XML document.
#[derive(Debug, Default)]
pub struct Document {
    arena: Arena<Node>,
    /// Top-level nodes in order: prolog comments/PIs, root element, epilog
    top_level: Vec<NodeId>,
    root: Option<NodeId>,
    pub declaration: Declaration,
    pub doctype: Option<String>,
    namespaces: Vec<Namespace>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node under `parent`, or at top level when `parent` is None.
    ///
    /// The first top-level element becomes the document root.
    #[instrument(level = "trace", skip(self, kind))]
    pub fn append(&mut self, parent: Option<NodeId>, kind: NodeKind) -> DomainResult<NodeId> {
        let is_element = matches!(kind, NodeKind::Element(_));
        let id = NodeId(self.arena.insert(Node {
            kind,
            parent,
            children: Vec::new(),
        }));

        match parent {
            Some(parent_id) => {
                let parent_node = self
                    .arena
                    .get_mut(parent_id.0)
                    .ok_or(DomainError::DanglingNode)?;
                if let NodeKind::Element(e) = &mut parent_node.kind {
                    e.self_closing = false;
                }
                parent_node.children.push(id);
            }
            None => {
                if is_element {
                    if self.root.is_some() {
                        self.arena.remove(id.0);
                        return Err(DomainError::MultipleRoots);
                    }
                    self.root = Some(id);
                }
                self.top_level.push(id);
            }
        }
        Ok(id)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn top_level(&self) -> &[NodeId] {
        &self.top_level
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id.0)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Child element ids of `id`, skipping text and comments.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&c| self.element(c).is_some())
    }

    /// First child element whose local name equals `name`.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.child_elements(id)
            .find(|&c| self.element(c).is_some_and(|e| e.local_name() == name))
    }

    /// Append raw text under `parent`, merging with a preceding text node.
    ///
    /// The reader reports entity references separately from the text around
    /// them; merging keeps one text node per run of character data.
    pub fn push_text(&mut self, parent: NodeId, raw: &str) -> DomainResult<()> {
        if let Some(&last) = self.children(parent).last() {
            if let Some(Node {
                kind: NodeKind::Text(existing),
                ..
            }) = self.arena.get_mut(last.0)
            {
                existing.push_str(raw);
                return Ok(());
            }
        }
        self.append(Some(parent), NodeKind::Text(raw.to_string()))
            .map(|_| ())
    }

    pub fn record_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let ns = Namespace {
            prefix: prefix.into(),
            uri: uri.into(),
        };
        if !self.namespaces.contains(&ns) {
            self.namespaces.push(ns);
        }
    }

    /// Namespace declarations in order of discovery.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Detach `child` from `parent` and drop its subtree.
    ///
    /// The whitespace-only text node directly after the child goes with it.
    /// When that text is the indentation of the parent's closing tag, the
    /// whitespace before the child goes instead. Fails if `child` is no longer
    /// attached to `parent`, so the same item can never be removed twice.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        let siblings = &self
            .arena
            .get(parent.0)
            .ok_or(DomainError::DanglingNode)?
            .children;
        let pos = siblings
            .iter()
            .position(|&c| c == child)
            .ok_or(DomainError::NotAChild)?;

        let blank_at = |i: usize| siblings.get(i).is_some_and(|&id| self.is_blank_text(id));
        let after = blank_at(pos + 1);
        let before = pos > 0 && blank_at(pos - 1);
        let closes_parent = pos + 2 == siblings.len();

        let range = match (before, after) {
            (true, true) if closes_parent => pos - 1..pos + 1,
            (_, true) => pos..pos + 2,
            _ => pos..pos + 1,
        };

        let detached: Vec<NodeId> = match self.arena.get_mut(parent.0) {
            Some(parent_node) => parent_node.children.drain(range).collect(),
            None => Vec::new(),
        };
        for id in detached {
            self.drop_subtree(id);
        }
        Ok(())
    }

    fn is_blank_text(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|n| &n.kind),
            Some(NodeKind::Text(t)) if t.trim().is_empty()
        )
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.arena.remove(current.0) {
                stack.extend(node.children);
            }
        }
    }

    /// Number of live nodes in the arena.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }
}
