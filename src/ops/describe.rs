use std::fmt;

use serde::Serialize;

use crate::model::flat::{FlatRecord, Projection};
use crate::ops::reorder::array_move;

/// Where a projected move puts the item, relative to a neighbor.
/// Hosts turn this into announcement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "position", content = "id", rename_all = "snake_case")]
pub enum MoveDescription {
    /// First in the list, ahead of this item
    Before(String),
    /// Child of this item
    NestedUnder(String),
    /// Sibling right after this item
    After(String),
}

impl fmt::Display for MoveDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDescription::Before(id) => write!(f, "before {id}"),
            MoveDescription::NestedUnder(id) => write!(f, "nested under {id}"),
            MoveDescription::After(id) => write!(f, "after {id}"),
        }
    }
}

/// Describe the landing spot of `projection` in the visible view `flat`.
///
/// Returns `None` when either ID is missing or the list has no other item
/// to relate to.
pub fn describe_move<P>(
    flat: &[FlatRecord<P>],
    active_id: &str,
    over_id: &str,
    projection: &Projection,
) -> Option<MoveDescription> {
    let active_ix = flat.iter().position(|r| r.id == active_id)?;
    let over_ix = flat.iter().position(|r| r.id == over_id)?;

    let mut sorted: Vec<&FlatRecord<P>> = flat.iter().collect();
    array_move(&mut sorted, active_ix, over_ix);

    let Some(previous) = over_ix.checked_sub(1).map(|ix| sorted[ix]) else {
        return sorted
            .get(over_ix + 1)
            .map(|next| MoveDescription::Before(next.id.clone()));
    };

    if projection.depth > previous.depth {
        return Some(MoveDescription::NestedUnder(previous.id.clone()));
    }

    // Climb from the previous row to the ancestor that shares our depth
    let mut sibling = Some(previous);
    while let Some(current) = sibling {
        if projection.depth >= current.depth {
            break;
        }
        sibling = current
            .parent_id
            .as_deref()
            .and_then(|parent| sorted.iter().copied().find(|r| r.id == parent));
    }
    sibling.map(|s| MoveDescription::After(s.id.clone()))
}
