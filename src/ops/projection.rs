//! Depth projection: where a dragged row would land.
//!
//! The projection only looks at the rows immediately around the drop point.
//! The row above caps the depth (at most one level deeper than it), the row
//! below floors it (a row can never end up shallower than its successor's
//! depth without orphaning the successor), and the horizontal drag offset
//! picks a depth inside that band.

use crate::model::flat::{FlatRecord, Projection};

/// Error type for projection requests the caller should never make
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("active item not in the flattened view: {0}")]
    ActiveNotFound(String),
    #[error("drop target not in the flattened view: {0}")]
    OverNotFound(String),
    #[error("indent width must be a positive number, got {0}")]
    InvalidIndentWidth(f64),
}

/// Number of indent levels covered by a horizontal drag.
///
/// Rounds to the nearest level, halves rounding up (`-0.5` levels is 0,
/// `0.5` is 1).
pub fn drag_depth(offset_x: f64, indent_width: f64) -> i64 {
    (offset_x / indent_width + 0.5).floor() as i64
}

/// Project the depth and parent `active_id` would get if dropped on `over_id`.
///
/// `flat` must be the visible view with the active item's descendants already
/// removed (see [`visible_items`](crate::ops::flatten::visible_items)).
/// Dropping on itself keeps the active item's depth and parent.
pub fn get_projection<P>(
    flat: &[FlatRecord<P>],
    active_id: &str,
    over_id: &str,
    drag_offset_x: f64,
    indent_width: f64,
) -> Result<Projection, ProjectionError> {
    if !(indent_width.is_finite() && indent_width > 0.0) {
        return Err(ProjectionError::InvalidIndentWidth(indent_width));
    }
    let active_ix = position_of(flat, active_id)
        .ok_or_else(|| ProjectionError::ActiveNotFound(active_id.to_string()))?;
    let over_ix = position_of(flat, over_id)
        .ok_or_else(|| ProjectionError::OverNotFound(over_id.to_string()))?;
    let active = &flat[active_ix];

    // The candidate order is `flat` with the active row moved to over_ix.
    // `neighbor(i)` is row `i` of `flat` once the active row is taken out,
    // so the rows around the drop point are `neighbor(over_ix - 1)` and
    // `neighbor(over_ix)`.
    let neighbor = |ix: Option<usize>| -> Option<&FlatRecord<P>> {
        let ix = ix?;
        let source = if ix >= active_ix { ix + 1 } else { ix };
        flat.get(source)
    };
    let previous = neighbor(over_ix.checked_sub(1));
    let next = neighbor(Some(over_ix));

    let max_depth = previous.map_or(0, |p| p.depth + 1);
    let min_depth = next.map_or(0, |n| n.depth);

    if active_ix == over_ix {
        return Ok(Projection {
            depth: active.depth,
            parent_id: active.parent_id.clone(),
            min_depth,
            max_depth,
        });
    }

    let projected = (active.depth as i64).saturating_add(drag_depth(drag_offset_x, indent_width));
    let depth = if projected >= max_depth as i64 {
        max_depth
    } else if projected < min_depth as i64 {
        min_depth
    } else {
        projected as usize
    };

    let parent_id = match previous {
        None => None,
        Some(_) if depth == 0 => None,
        Some(prev) if depth == prev.depth => prev.parent_id.clone(),
        Some(prev) if depth > prev.depth => Some(prev.id.clone()),
        Some(_) => {
            // Un-indenting past the previous row: the nearest earlier row at
            // the target depth is the ancestor we become a sibling of.
            (0..over_ix)
                .rev()
                .filter_map(|ix| neighbor(Some(ix)))
                .find(|r| r.depth == depth)
                .and_then(|r| r.parent_id.clone())
        }
    };

    Ok(Projection {
        depth,
        parent_id,
        min_depth,
        max_depth,
    })
}

fn position_of<P>(flat: &[FlatRecord<P>], id: &str) -> Option<usize> {
    flat.iter().position(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::{Node, Payload, Tree};
    use crate::ops::flatten::{flatten_tree, visible_items};
    use pretty_assertions::assert_eq;

    const INDENT: f64 = 20.0;

    fn view(tree: &Tree, active: &str) -> Vec<FlatRecord<Payload>> {
        visible_items(&flatten_tree(tree), Some(active), true)
    }

    /// `[A, B[B1, B2], C]`
    fn sample_tree() -> Tree {
        Tree::new([
            Node::leaf("A"),
            Node::leaf("B").children([Node::leaf("B1"), Node::leaf("B2")]),
            Node::leaf("C"),
        ])
    }

    fn project(tree: &Tree, active: &str, over: &str, offset: f64) -> Projection {
        get_projection(&view(tree, active), active, over, offset, INDENT).unwrap()
    }

    #[test]
    fn test_drag_depth_rounds_to_nearest_level() {
        assert_eq!(drag_depth(0.0, INDENT), 0);
        assert_eq!(drag_depth(9.0, INDENT), 0);
        assert_eq!(drag_depth(10.0, INDENT), 1);
        assert_eq!(drag_depth(25.0, INDENT), 1);
        assert_eq!(drag_depth(31.0, INDENT), 2);
        assert_eq!(drag_depth(-10.0, INDENT), 0);
        assert_eq!(drag_depth(-11.0, INDENT), -1);
        assert_eq!(drag_depth(-45.0, INDENT), -2);
    }

    #[test]
    fn test_swap_siblings_without_offset_keeps_depth() {
        let p = project(&sample_tree(), "B2", "B1", 0.0);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("B"));
        assert_eq!((p.min_depth, p.max_depth), (1, 1));
    }

    #[test]
    fn test_first_position_clamps_to_top_level() {
        let p = project(&sample_tree(), "C", "A", 25.0);
        assert_eq!(
            p,
            Projection {
                depth: 0,
                parent_id: None,
                min_depth: 0,
                max_depth: 0,
            }
        );
    }

    #[test]
    fn test_indent_under_previous_item() {
        // C dropped on itself would be a no-op; drop it over B2 instead:
        // candidate order A B B1 C B2 -> previous B1, next B2
        let p = project(&sample_tree(), "C", "B2", 40.0);
        assert_eq!(p.max_depth, 2);
        assert_eq!(p.min_depth, 1);
        assert_eq!(p.depth, 2);
        assert_eq!(p.parent_id.as_deref(), Some("B1"));
    }

    #[test]
    fn test_sibling_of_previous_item() {
        // A moved below B1 at B1's depth becomes B's child
        let p = project(&sample_tree(), "A", "B1", 20.0);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_min_depth_from_next_item() {
        // A over B: candidate order B A B1 B2 C -> previous B, next B1
        let p = project(&sample_tree(), "A", "B", 0.0);
        assert_eq!(p.min_depth, 1);
        assert_eq!(p.max_depth, 1);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_outdent_walks_back_to_ancestor() {
        // [A[A1[A1a]], B, X]; X dragged up over B: candidate A A1 A1a X B
        let tree = Tree::new([
            Node::leaf("A").child(Node::leaf("A1").child(Node::leaf("A1a"))),
            Node::leaf("B"),
            Node::leaf("X"),
        ]);
        // X at depth 0 dragged right by one level -> depth 1, previous A1a at depth 2
        let p = project(&tree, "X", "B", 20.0);
        assert_eq!((p.min_depth, p.max_depth), (0, 3));
        assert_eq!(p.depth, 1);
        // Nearest earlier row at depth 1 is A1, whose parent is A
        assert_eq!(p.parent_id.as_deref(), Some("A"));

        let p = project(&tree, "X", "B", 0.0);
        assert_eq!(p.depth, 0);
        assert_eq!(p.parent_id, None);
    }

    #[test]
    fn test_drag_far_left_clamps_to_min() {
        let p = project(&sample_tree(), "B2", "B1", -200.0);
        assert_eq!(p.depth, 1);
    }

    #[test]
    fn test_drag_far_right_clamps_to_max() {
        let p = project(&sample_tree(), "C", "B2", 1000.0);
        assert_eq!(p.depth, p.max_depth);
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let p = project(&sample_tree(), "B2", "B2", 100.0);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("B"));
        // Bounds are still reported for indicator rendering
        assert_eq!((p.min_depth, p.max_depth), (0, 2));
    }

    #[test]
    fn test_moving_down_uses_rows_after_removal() {
        // A dragged down over C: candidate B B1 B2 C A -> previous C, no next
        let p = project(&sample_tree(), "A", "C", 0.0);
        assert_eq!((p.min_depth, p.max_depth), (0, 1));
        assert_eq!(p.depth, 0);
        let p = project(&sample_tree(), "A", "C", 20.0);
        assert_eq!(p.depth, 1);
        assert_eq!(p.parent_id.as_deref(), Some("C"));
    }

    #[test]
    fn test_errors_for_unknown_ids_and_bad_indent() {
        let flat = view(&sample_tree(), "A");
        assert_eq!(
            get_projection(&flat, "Z", "A", 0.0, INDENT),
            Err(ProjectionError::ActiveNotFound("Z".into()))
        );
        assert_eq!(
            get_projection(&flat, "A", "Z", 0.0, INDENT),
            Err(ProjectionError::OverNotFound("Z".into()))
        );
        assert!(matches!(
            get_projection(&flat, "A", "B", 0.0, 0.0),
            Err(ProjectionError::InvalidIndentWidth(_))
        ));
        assert!(get_projection(&flat, "A", "B", 0.0, f64::NAN).is_err());
    }
}
