use std::sync::Arc;

use crate::model::node::{Node, Tree};

/// Error type for structural moves
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("cannot move {id} into its own subtree (target {target})")]
    IntoOwnSubtree { id: String, target: String },
}

/// Where a node goes relative to an existing node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveTarget {
    /// Sibling immediately before the target
    Before(String),
    /// Sibling immediately after the target
    After(String),
    /// Last child of the target
    Inside(String),
}

impl MoveTarget {
    pub fn target_id(&self) -> &str {
        match self {
            MoveTarget::Before(id) | MoveTarget::After(id) | MoveTarget::Inside(id) => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a node by ID at any depth (depth-first, first match).
pub fn find_node<'a, P>(tree: &'a Tree<P>, id: &str) -> Option<&'a Arc<Node<P>>> {
    find_in_list(&tree.roots, id)
}

fn find_in_list<'a, P>(nodes: &'a [Arc<Node<P>>], id: &str) -> Option<&'a Arc<Node<P>>> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_in_list(&node.children, id) {
            return Some(found);
        }
    }
    None
}

/// True if `candidate_id` lives somewhere below `ancestor_id`.
/// A node is never its own ancestor.
pub fn is_ancestor<P>(tree: &Tree<P>, ancestor_id: &str, candidate_id: &str) -> bool {
    find_node(tree, ancestor_id)
        .is_some_and(|ancestor| find_in_list(&ancestor.children, candidate_id).is_some())
}

/// Number of nodes below `id` at every depth. 0 if `id` is unknown.
pub fn descendant_count<P>(tree: &Tree<P>, id: &str) -> usize {
    fn count<P>(nodes: &[Arc<Node<P>>]) -> usize {
        nodes.iter().map(|n| 1 + count(&n.children)).sum()
    }
    find_node(tree, id).map_or(0, |node| count(&node.children))
}

// ---------------------------------------------------------------------------
// Structural edits
// ---------------------------------------------------------------------------

/// Detach a node (with its subtree). Returns the detached node and the
/// remaining tree; an unknown ID yields `(None, tree)`.
pub fn remove_node<P: Clone>(tree: &Tree<P>, id: &str) -> (Option<Arc<Node<P>>>, Tree<P>) {
    let Some(path) = locate(&tree.roots, id) else {
        return (None, tree.clone());
    };
    let mut removed = None;
    let roots = edit_along_path(&tree.roots, &path, |siblings, ix| {
        removed = Some(siblings.remove(ix));
    });
    (removed, Tree { roots })
}

/// Insert `node` as the sibling right before `target_id`. No-op if the target is missing.
pub fn insert_before<P: Clone>(
    tree: &Tree<P>,
    target_id: &str,
    node: impl Into<Arc<Node<P>>>,
) -> Tree<P> {
    let Some(path) = locate(&tree.roots, target_id) else {
        return tree.clone();
    };
    let node = node.into();
    let roots = edit_along_path(&tree.roots, &path, |siblings, ix| siblings.insert(ix, node));
    Tree { roots }
}

/// Insert `node` as the sibling right after `target_id`. No-op if the target is missing.
pub fn insert_after<P: Clone>(
    tree: &Tree<P>,
    target_id: &str,
    node: impl Into<Arc<Node<P>>>,
) -> Tree<P> {
    let Some(path) = locate(&tree.roots, target_id) else {
        return tree.clone();
    };
    let node = node.into();
    let roots = edit_along_path(&tree.roots, &path, |siblings, ix| {
        siblings.insert(ix + 1, node)
    });
    Tree { roots }
}

/// Append `node` as the last child of `parent_id`. No-op if the parent is missing.
pub fn insert_inside<P: Clone>(
    tree: &Tree<P>,
    parent_id: &str,
    node: impl Into<Arc<Node<P>>>,
) -> Tree<P> {
    let node = node.into();
    update_node(tree, parent_id, |parent| parent.children.push(node))
}

/// Move a node (with its subtree) next to or into another node.
///
/// Rejected without touching the tree when the target is the node itself or
/// one of its descendants, or when either ID is unknown.
pub fn move_node<P: Clone>(
    tree: &Tree<P>,
    id: &str,
    target: &MoveTarget,
) -> Result<Tree<P>, MoveError> {
    let target_id = target.target_id();
    if id == target_id || is_ancestor(tree, id, target_id) {
        return Err(MoveError::IntoOwnSubtree {
            id: id.to_string(),
            target: target_id.to_string(),
        });
    }
    if find_node(tree, target_id).is_none() {
        return Err(MoveError::NotFound(target_id.to_string()));
    }

    let (removed, rest) = remove_node(tree, id);
    let node = removed.ok_or_else(|| MoveError::NotFound(id.to_string()))?;
    Ok(match target {
        MoveTarget::Before(t) => insert_before(&rest, t, node),
        MoveTarget::After(t) => insert_after(&rest, t, node),
        MoveTarget::Inside(t) => insert_inside(&rest, t, node),
    })
}

// ---------------------------------------------------------------------------
// Property updates
// ---------------------------------------------------------------------------

/// Replace one property of a node with `updater(old)`.
///
/// `field` picks the property, e.g. `|n| &mut n.collapsed`. Only the path
/// from the root to the node is copied. No-op if `id` is unknown.
pub fn set_property<P: Clone, V>(
    tree: &Tree<P>,
    id: &str,
    field: fn(&mut Node<P>) -> &mut V,
    updater: impl FnOnce(&V) -> V,
) -> Tree<P> {
    update_node(tree, id, |node| {
        let slot = field(node);
        *slot = updater(slot);
    })
}

/// Flip the `collapsed` flag of a node.
pub fn toggle_collapsed<P: Clone>(tree: &Tree<P>, id: &str) -> Tree<P> {
    set_property(tree, id, |n| &mut n.collapsed, |collapsed| !collapsed)
}

/// Edit a node's payload in place (on a fresh copy of the node).
pub fn update_payload<P: Clone>(tree: &Tree<P>, id: &str, edit: impl FnOnce(&mut P)) -> Tree<P> {
    update_node(tree, id, |node| edit(&mut node.payload))
}

/// Apply `edit` to a shallow copy of the node and path-copy it back in.
fn update_node<P: Clone>(tree: &Tree<P>, id: &str, edit: impl FnOnce(&mut Node<P>)) -> Tree<P> {
    let Some(path) = locate(&tree.roots, id) else {
        return tree.clone();
    };
    let roots = edit_along_path(&tree.roots, &path, |siblings, ix| {
        let mut copy = Node::clone(&siblings[ix]);
        edit(&mut copy);
        siblings[ix] = Arc::new(copy);
    });
    Tree { roots }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Child-index path from the roots to the node with `id`.
fn locate<P>(nodes: &[Arc<Node<P>>], id: &str) -> Option<Vec<usize>> {
    for (ix, node) in nodes.iter().enumerate() {
        if node.id == id {
            return Some(vec![ix]);
        }
        if let Some(mut path) = locate(&node.children, id) {
            path.insert(0, ix);
            return Some(path);
        }
    }
    None
}

/// Copy the sibling lists along `path` and hand the innermost list to `edit`
/// together with the index of the path's last node. Everything off the path
/// stays shared with `nodes`.
fn edit_along_path<P: Clone>(
    nodes: &[Arc<Node<P>>],
    path: &[usize],
    edit: impl FnOnce(&mut Vec<Arc<Node<P>>>, usize),
) -> Vec<Arc<Node<P>>> {
    let mut siblings = nodes.to_vec();
    match path {
        [] => {}
        [ix] => edit(&mut siblings, *ix),
        [ix, rest @ ..] => {
            let node = &nodes[*ix];
            let children = edit_along_path(&node.children, rest, edit);
            siblings[*ix] = Arc::new(Node {
                id: node.id.clone(),
                payload: node.payload.clone(),
                collapsed: node.collapsed,
                children,
            });
        }
    }
    siblings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
