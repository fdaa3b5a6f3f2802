use std::sync::Arc;

use indexmap::IndexMap;

use crate::model::flat::FlatRecord;
use crate::model::node::{Node, Tree};

/// Error type for rebuilding a tree from flat records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("duplicate id in flattened sequence: {0}")]
    DuplicateId(String),
    #[error("{id} refers to parent {parent_id}, which does not appear before it")]
    MissingParent { id: String, parent_id: String },
}

/// Rebuild a nested tree from flat records.
///
/// Nesting comes from `parent_id` alone; `depth` and `index` are ignored.
/// Siblings keep their relative order in `flat`. Every parent must appear
/// before its children.
pub fn build_tree<P: Clone>(flat: &[FlatRecord<P>]) -> Result<Tree<P>, BuildError> {
    // Slot i holds the child positions of flat[i]; ids are inserted in
    // sequence order so a slot's index is its record's position.
    let mut slots: IndexMap<&str, Vec<usize>> = IndexMap::with_capacity(flat.len());
    let mut roots = Vec::new();

    for (ix, record) in flat.iter().enumerate() {
        match record.parent_id.as_deref() {
            None => roots.push(ix),
            Some(parent_id) => match slots.get_mut(parent_id) {
                Some(children) => children.push(ix),
                None => {
                    return Err(BuildError::MissingParent {
                        id: record.id.clone(),
                        parent_id: parent_id.to_string(),
                    });
                }
            },
        }
        if slots.insert(record.id.as_str(), Vec::new()).is_some() {
            return Err(BuildError::DuplicateId(record.id.clone()));
        }
    }

    Ok(Tree {
        roots: roots.into_iter().map(|ix| assemble(ix, flat, &slots)).collect(),
    })
}

fn assemble<P: Clone>(
    ix: usize,
    flat: &[FlatRecord<P>],
    slots: &IndexMap<&str, Vec<usize>>,
) -> Arc<Node<P>> {
    let record = &flat[ix];
    Arc::new(Node {
        id: record.id.clone(),
        payload: record.payload.clone(),
        collapsed: record.collapsed,
        children: slots[ix]
            .iter()
            .map(|&child| assemble(child, flat, slots))
            .collect(),
    })
}
