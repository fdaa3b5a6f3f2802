use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Progress state of an item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
    Deferred,
}

impl Status {
    /// The character shown inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            Status::Todo => ' ',
            Status::InProgress => '>',
            Status::Done => 'x',
            Status::Deferred => '~',
        }
    }
}

/// Default item content. The engine never looks inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Status,
}

impl Payload {
    pub fn titled(title: impl Into<String>) -> Self {
        Payload {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A tree node. Children are shared between snapshots, so a node is never
/// mutated once it is part of a tree; edits go through `ops::tree_ops` and
/// produce new nodes along the path to the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de>"))]
pub struct Node<P = Payload> {
    pub id: String,
    pub payload: P,
    /// Hide descendants from the flattened view. Not structural.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    #[serde(default)]
    pub children: Vec<Arc<Node<P>>>,
}

impl<P> Node<P> {
    pub fn new(id: impl Into<String>, payload: P) -> Self {
        Node {
            id: id.into(),
            payload,
            collapsed: false,
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: Node<P>) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node<P>>) -> Self {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

impl Node<Payload> {
    /// Node whose title is its id. Handy for fixtures.
    pub fn leaf(id: impl Into<String>) -> Self {
        let id = id.into();
        Node::new(id.clone(), Payload::titled(id))
    }
}

/// An immutable snapshot of a forest of nodes.
///
/// Cloning is cheap: only the top-level `Arc`s are copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tree<P = Payload> {
    pub roots: Vec<Arc<Node<P>>>,
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Tree { roots: Vec::new() }
    }
}

impl<P> Tree<P> {
    pub fn new(roots: impl IntoIterator<Item = Node<P>>) -> Self {
        Tree {
            roots: roots.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes at every depth
    pub fn len(&self) -> usize {
        fn count<P>(nodes: &[Arc<Node<P>>]) -> usize {
            nodes.iter().map(|n| 1 + count(&n.children)).sum()
        }
        count(&self.roots)
    }
}

impl<P> FromIterator<Node<P>> for Tree<P> {
    fn from_iter<I: IntoIterator<Item = Node<P>>>(iter: I) -> Self {
        Tree::new(iter)
    }
}
