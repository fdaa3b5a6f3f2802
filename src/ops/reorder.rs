use crate::model::flat::{FlatRecord, Projection};
use crate::model::node::Tree;
use crate::ops::build::{BuildError, build_tree};

/// Error type for committing a projected move
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReorderError {
    #[error("item not found in snapshot: {0}")]
    NotFound(String),
    #[error("cannot drop {id} onto its own descendant {target}")]
    IntoOwnSubtree { id: String, target: String },
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Move one element of `items` from `from` to `to`, shifting the rest.
pub fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

/// Apply a projection to the full flattened snapshot it was computed from.
///
/// `full` is the whole tree flattened (collapsed rows included), `visible` the
/// view the projection was computed on. The active record and its descendants
/// move as one block to sit right before the row that follows the drop point
/// in `visible` (or at the end when nothing follows). Every parent therefore
/// still precedes its children, which `build_tree` relies on.
///
/// Dropping onto the active item itself returns `full` unchanged.
pub fn reorder_records<P: Clone>(
    full: &[FlatRecord<P>],
    visible: &[FlatRecord<P>],
    active_id: &str,
    over_id: &str,
    projection: &Projection,
) -> Result<Vec<FlatRecord<P>>, ReorderError> {
    let start = full
        .iter()
        .position(|r| r.id == active_id)
        .ok_or_else(|| ReorderError::NotFound(active_id.to_string()))?;
    let end = subtree_end(full, start);

    if full[start + 1..end].iter().any(|r| r.id == over_id) {
        return Err(ReorderError::IntoOwnSubtree {
            id: active_id.to_string(),
            target: over_id.to_string(),
        });
    }
    if active_id == over_id {
        return Ok(full.to_vec());
    }

    let next_id = following_row(visible, active_id, over_id)?;

    let mut remaining: Vec<FlatRecord<P>> = full[..start].to_vec();
    remaining.extend_from_slice(&full[end..]);
    let mut block: Vec<FlatRecord<P>> = full[start..end].to_vec();

    let shift = projection.depth as i64 - block[0].depth as i64;
    block[0].parent_id = projection.parent_id.clone();
    for record in &mut block {
        record.depth = (record.depth as i64 + shift).max(0) as usize;
    }

    let at = match next_id {
        Some(id) => remaining
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ReorderError::NotFound(id.to_string()))?,
        None => remaining.len(),
    };
    let tail = remaining.split_off(at);
    remaining.extend(block);
    remaining.extend(tail);

    for (index, record) in remaining.iter_mut().enumerate() {
        record.index = index;
    }
    Ok(remaining)
}

/// Reorder the snapshot and rebuild the nested tree from it.
pub fn commit_move<P: Clone>(
    full: &[FlatRecord<P>],
    visible: &[FlatRecord<P>],
    active_id: &str,
    over_id: &str,
    projection: &Projection,
) -> Result<Tree<P>, ReorderError> {
    let records = reorder_records(full, visible, active_id, over_id, projection)?;
    Ok(build_tree(&records)?)
}

/// One past the last descendant of the record at `start`.
fn subtree_end<P>(flat: &[FlatRecord<P>], start: usize) -> usize {
    let depth = flat[start].depth;
    flat[start + 1..]
        .iter()
        .position(|r| r.depth <= depth)
        .map_or(flat.len(), |offset| start + 1 + offset)
}

/// ID of the visible row that will directly follow the dropped item.
fn following_row<'a, P>(
    visible: &'a [FlatRecord<P>],
    active_id: &str,
    over_id: &str,
) -> Result<Option<&'a str>, ReorderError> {
    let active_ix = visible
        .iter()
        .position(|r| r.id == active_id)
        .ok_or_else(|| ReorderError::NotFound(active_id.to_string()))?;
    let over_ix = visible
        .iter()
        .position(|r| r.id == over_id)
        .ok_or_else(|| ReorderError::NotFound(over_id.to_string()))?;
    // With the active row taken out, the row at over_ix follows the drop point
    let source = if over_ix >= active_ix { over_ix + 1 } else { over_ix };
    Ok(visible.get(source).map(|r| r.id.as_str()))
}
