use std::collections::HashSet;
use std::sync::Arc;

use crate::model::flat::FlatRecord;
use crate::model::node::{Node, Tree};

/// Flatten a tree in pre-order: every node is emitted before its children,
/// annotated with its parent, depth and emission index.
pub fn flatten_tree<P: Clone>(tree: &Tree<P>) -> Vec<FlatRecord<P>> {
    let mut out = Vec::with_capacity(tree.len());
    flatten_into(&tree.roots, None, 0, &mut out);
    out
}

fn flatten_into<P: Clone>(
    nodes: &[Arc<Node<P>>],
    parent_id: Option<&str>,
    depth: usize,
    out: &mut Vec<FlatRecord<P>>,
) {
    for node in nodes {
        out.push(FlatRecord {
            id: node.id.clone(),
            payload: node.payload.clone(),
            collapsed: node.collapsed,
            parent_id: parent_id.map(str::to_string),
            depth,
            index: out.len(),
            child_count: node.children.len(),
        });
        flatten_into(&node.children, Some(&node.id), depth + 1, out);
    }
}

/// Drop every descendant of the given IDs. The IDs themselves stay.
///
/// Exclusion is transitive: once a record is dropped its own ID joins the
/// excluded set, so grandchildren go too.
pub fn remove_children_of<P: Clone, S: AsRef<str>>(
    flat: &[FlatRecord<P>],
    ids: &[S],
) -> Vec<FlatRecord<P>> {
    let mut excluded: HashSet<&str> = ids.iter().map(AsRef::as_ref).collect();
    let mut visible = Vec::with_capacity(flat.len());
    for record in flat {
        match record.parent_id.as_deref() {
            Some(parent) if excluded.contains(parent) => {
                excluded.insert(record.id.as_str());
            }
            _ => visible.push(record.clone()),
        }
    }
    visible
}

/// IDs of records that are collapsed and actually have children to hide.
pub fn collapsed_ids<P>(flat: &[FlatRecord<P>]) -> Vec<String> {
    flat.iter()
        .filter(|r| r.collapsed && r.child_count > 0)
        .map(|r| r.id.clone())
        .collect()
}

/// The rows a host should display: collapsed subtrees hidden, and during a
/// drag the active item's subtree hidden as well (it travels with the item).
pub fn visible_items<P: Clone>(
    flat: &[FlatRecord<P>],
    active_id: Option<&str>,
    honor_collapsed: bool,
) -> Vec<FlatRecord<P>> {
    let mut hidden = if honor_collapsed {
        collapsed_ids(flat)
    } else {
        Vec::new()
    };
    if let Some(active) = active_id {
        hidden.push(active.to_string());
    }
    remove_children_of(flat, &hidden)
}
