use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dnd::keyboard::{KeyMove, key_step};
use crate::model::config::Config;
use crate::model::flat::{FlatRecord, Projection};
use crate::model::node::{Node, Payload, Tree};
use crate::ops::describe::{MoveDescription, describe_move};
use crate::ops::flatten::{flatten_tree, visible_items};
use crate::ops::projection::{ProjectionError, get_projection};
use crate::ops::reorder::{ReorderError, commit_move};
use crate::ops::tree_ops::{self, MoveError, MoveTarget};

/// Error type for drag events that cannot be honored
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DragError {
    #[error("no drag in progress")]
    NotDragging,
    #[error("item not in the visible view: {0}")]
    UnknownItem(String),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error(transparent)]
    Reorder(#[from] ReorderError),
}

/// What a drop did to the session's tree
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome<P = Payload> {
    /// The tree was rebuilt; this is the new snapshot
    Moved(Tree<P>),
    /// Dropped back onto itself
    Unchanged,
    /// Released outside any drop target
    Cancelled,
    /// The drop could not be applied; the tree is untouched
    Rejected(DragError),
}

/// One row of the visible view, as a host should render it
#[derive(Debug)]
pub struct Row<'a, P = Payload> {
    pub record: &'a FlatRecord<P>,
    /// Depth to indent by: the projected depth for the dragged row
    pub depth: usize,
    pub active: bool,
    pub over: bool,
}

/// State of a gesture in progress. The snapshots are taken once at drag
/// start and every tick projects against the same `visible` view.
#[derive(Debug, Clone)]
struct ActiveDrag<P> {
    active_id: String,
    over_id: Option<String>,
    offset_x: f64,
    full: Vec<FlatRecord<P>>,
    visible: Vec<FlatRecord<P>>,
    projection: Option<Projection>,
}

impl<P> ActiveDrag<P> {
    fn reproject(&mut self, indent_width: f64) -> Result<(), ProjectionError> {
        self.projection = None;
        if let Some(over) = &self.over_id {
            let projection = get_projection(
                &self.visible,
                &self.active_id,
                over,
                self.offset_x,
                indent_width,
            )?;
            self.projection = Some(projection);
        }
        Ok(())
    }
}

/// Event-driven owner of a tree being reordered by drag and drop.
///
/// The host forwards pointer and keyboard events; the session keeps the
/// projection current and rebuilds the tree on drop. Every change to the
/// tree bumps [`version`](DragSession::version).
#[derive(Debug, Clone)]
pub struct DragSession<P = Payload> {
    tree: Tree<P>,
    version: u64,
    indent_width: f64,
    collapsible: bool,
    /// Visible rows of `tree` while no drag is active
    view: Vec<FlatRecord<P>>,
    drag: Option<ActiveDrag<P>>,
}

impl<P: Clone> DragSession<P> {
    pub fn new(tree: Tree<P>, config: &Config) -> Self {
        let mut session = DragSession {
            tree,
            version: 0,
            indent_width: config.drag.indent_width,
            collapsible: config.view.collapsible,
            view: Vec::new(),
            drag: None,
        };
        session.refresh_view();
        session
    }

    pub fn tree(&self) -> &Tree<P> {
        &self.tree
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn indent_width(&self) -> f64 {
        self.indent_width
    }

    /// Replace the tree wholesale. A drag in progress is cancelled since its
    /// snapshots no longer describe the tree.
    pub fn set_tree(&mut self, tree: Tree<P>) {
        self.abandon_drag();
        self.replace_tree(tree);
    }

    // -----------------------------------------------------------------------
    // Drag events
    // -----------------------------------------------------------------------

    /// Begin dragging `active_id`. The item starts out over itself.
    pub fn drag_start(&mut self, active_id: &str) -> Result<(), DragError> {
        if let Some(previous) = self.drag.take() {
            warn!(
                previous = %previous.active_id,
                active = active_id,
                "drag started while another was active, cancelling the earlier one"
            );
        }

        let full = flatten_tree(&self.tree);
        let visible = visible_items(&full, Some(active_id), self.collapsible);
        if !visible.iter().any(|r| r.id == active_id) {
            warn!(active = active_id, "drag start on an item that is not visible");
            return Err(DragError::UnknownItem(active_id.to_string()));
        }

        let mut drag = ActiveDrag {
            active_id: active_id.to_string(),
            over_id: Some(active_id.to_string()),
            offset_x: 0.0,
            full,
            visible,
            projection: None,
        };
        drag.reproject(self.indent_width)?;
        debug!(active = active_id, rows = drag.visible.len(), "drag started");
        self.drag = Some(drag);
        Ok(())
    }

    /// Horizontal pointer offset since drag start changed.
    pub fn drag_move(&mut self, offset_x: f64) -> Result<(), DragError> {
        let drag = self.drag.as_mut().ok_or(DragError::NotDragging)?;
        drag.offset_x = offset_x;
        drag.reproject(self.indent_width)?;
        debug!(
            offset_x,
            depth = ?drag.projection.as_ref().map(|p| p.depth),
            "drag moved"
        );
        Ok(())
    }

    /// The row under the pointer changed. `None` means no drop target.
    pub fn drag_over(&mut self, over_id: Option<&str>) -> Result<(), DragError> {
        let drag = self.drag.as_mut().ok_or(DragError::NotDragging)?;
        drag.over_id = over_id.map(str::to_string);
        if let Err(err) = drag.reproject(self.indent_width) {
            warn!(over = ?over_id, error = %err, "drag over an unknown row");
            return Err(err.into());
        }
        debug!(over = ?over_id, "drag over");
        Ok(())
    }

    /// Release the dragged item over `over_id` and commit the last
    /// projection. The drag ends whatever the outcome.
    pub fn drag_end(&mut self, over_id: Option<&str>) -> DropOutcome<P> {
        let Some(drag) = self.drag.take() else {
            return rejected(DragError::NotDragging);
        };
        let Some(over) = over_id else {
            debug!(active = %drag.active_id, "dropped outside any target");
            return DropOutcome::Cancelled;
        };

        let projection = match get_projection(
            &drag.visible,
            &drag.active_id,
            over,
            drag.offset_x,
            self.indent_width,
        ) {
            Ok(projection) => projection,
            Err(err) => return rejected(err.into()),
        };
        if over == drag.active_id {
            debug!(active = %drag.active_id, "dropped onto itself");
            return DropOutcome::Unchanged;
        }

        match commit_move(&drag.full, &drag.visible, &drag.active_id, over, &projection) {
            Ok(tree) => {
                info!(
                    active = %drag.active_id,
                    over,
                    depth = projection.depth,
                    parent = ?projection.parent_id,
                    "drop committed"
                );
                self.replace_tree(tree.clone());
                DropOutcome::Moved(tree)
            }
            Err(err) => rejected(err.into()),
        }
    }

    /// Abort the drag, leaving the tree untouched. Returns whether a drag
    /// was in progress.
    pub fn drag_cancel(&mut self) -> bool {
        match self.drag.take() {
            Some(drag) => {
                debug!(active = %drag.active_id, "drag cancelled");
                true
            }
            None => false,
        }
    }

    /// Keyboard equivalent of pointer movement. Returns whether the drop
    /// target or offset changed.
    pub fn key_move(&mut self, key: KeyMove) -> bool {
        let Some(drag) = self.drag.as_mut() else {
            return false;
        };
        let Some(over) = drag.over_id.as_deref() else {
            return false;
        };
        let Some(step) = key_step(
            &drag.visible,
            &drag.active_id,
            over,
            drag.offset_x,
            self.indent_width,
            key,
        ) else {
            return false;
        };

        drag.over_id = Some(step.over_id);
        drag.offset_x = step.offset_x;
        if let Err(err) = drag.reproject(self.indent_width) {
            warn!(error = %err, "keyboard move produced no projection");
        }
        debug!(?key, over = ?drag.over_id, offset_x = drag.offset_x, "keyboard move");
        true
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Rows to render, in display order.
    pub fn rows(&self) -> Vec<Row<'_, P>> {
        let Some(drag) = &self.drag else {
            return self
                .view
                .iter()
                .map(|record| Row {
                    record,
                    depth: record.depth,
                    active: false,
                    over: false,
                })
                .collect();
        };
        drag.visible
            .iter()
            .map(|record| {
                let active = record.id == drag.active_id;
                let depth = match &drag.projection {
                    Some(projection) if active => projection.depth,
                    _ => record.depth,
                };
                Row {
                    record,
                    depth,
                    active,
                    over: drag.over_id.as_deref() == Some(record.id.as_str()),
                }
            })
            .collect()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.drag.as_ref()?.projection.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.drag.as_ref().map(|d| d.active_id.as_str())
    }

    pub fn over_id(&self) -> Option<&str> {
        self.drag.as_ref()?.over_id.as_deref()
    }

    pub fn offset_x(&self) -> Option<f64> {
        self.drag.as_ref().map(|d| d.offset_x)
    }

    /// Where the current projection would put the dragged item
    pub fn move_description(&self) -> Option<MoveDescription> {
        let drag = self.drag.as_ref()?;
        let over = drag.over_id.as_deref()?;
        let projection = drag.projection.as_ref()?;
        describe_move(&drag.visible, &drag.active_id, over, projection)
    }

    // -----------------------------------------------------------------------
    // Non-drag mutations
    // -----------------------------------------------------------------------

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: &str) -> Option<Arc<Node<P>>> {
        let descendants = tree_ops::descendant_count(&self.tree, id);
        let (removed, tree) = tree_ops::remove_node(&self.tree, id);
        match removed {
            Some(node) => {
                self.abandon_drag();
                info!(id, descendants, "removed");
                self.replace_tree(tree);
                Some(node)
            }
            None => {
                debug!(id, "remove: not found");
                None
            }
        }
    }

    /// Flip a node's collapsed flag. Returns false for unknown IDs.
    pub fn toggle_collapsed(&mut self, id: &str) -> bool {
        if tree_ops::find_node(&self.tree, id).is_none() {
            debug!(id, "toggle collapsed: not found");
            return false;
        }
        self.abandon_drag();
        let tree = tree_ops::toggle_collapsed(&self.tree, id);
        self.replace_tree(tree);
        true
    }

    /// Edit a node's payload in place. Returns false for unknown IDs.
    pub fn update_payload(&mut self, id: &str, edit: impl FnOnce(&mut P)) -> bool {
        if tree_ops::find_node(&self.tree, id).is_none() {
            debug!(id, "update payload: not found");
            return false;
        }
        self.abandon_drag();
        let tree = tree_ops::update_payload(&self.tree, id, edit);
        self.replace_tree(tree);
        true
    }

    /// Move a node next to or into another one without a drag gesture.
    pub fn move_to(&mut self, id: &str, target: MoveTarget) -> Result<(), MoveError> {
        let tree = tree_ops::move_node(&self.tree, id, &target)?;
        self.abandon_drag();
        self.replace_tree(tree);
        Ok(())
    }

    fn replace_tree(&mut self, tree: Tree<P>) {
        self.tree = tree;
        self.version += 1;
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.view = visible_items(&flatten_tree(&self.tree), None, self.collapsible);
    }

    fn abandon_drag(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!(active = %drag.active_id, "tree changed mid-drag, drag cancelled");
        }
    }
}

fn rejected<P>(err: DragError) -> DropOutcome<P> {
    warn!(error = %err, "drop rejected");
    DropOutcome::Rejected(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(tree: &Tree) -> String {
        fn walk(nodes: &[Arc<Node>], out: &mut Vec<String>) {
            for n in nodes {
                if n.children.is_empty() {
                    out.push(n.id.clone());
                } else {
                    let mut inner = Vec::new();
                    walk(&n.children, &mut inner);
                    out.push(format!("{}({})", n.id, inner.join(" ")));
                }
            }
        }
        let mut out = Vec::new();
        walk(&tree.roots, &mut out);
        out.join(" ")
    }

    fn session() -> DragSession {
        let tree = Tree::new([
            Node::leaf("A"),
            Node::leaf("B").children([Node::leaf("B1"), Node::leaf("B2")]),
            Node::leaf("C"),
        ]);
        DragSession::new(tree, &Config::default())
    }

    fn row_ids(session: &DragSession) -> Vec<String> {
        session.rows().iter().map(|r| r.record.id.clone()).collect()
    }

    #[test]
    fn test_full_gesture_nests_item() {
        let mut s = session();
        s.drag_start("C").unwrap();
        s.drag_over(Some("B2")).unwrap();
        s.drag_move(40.0).unwrap();

        let projection = s.projection().unwrap();
        assert_eq!(projection.depth, 2);
        assert_eq!(projection.parent_id.as_deref(), Some("B1"));

        let outcome = s.drag_end(Some("B2"));
        assert!(matches!(outcome, DropOutcome::Moved(_)));
        assert_eq!(shape(s.tree()), "A B(B1(C) B2)");
        assert_eq!(s.version(), 1);
        assert!(!s.is_dragging());
    }

    #[test]
    fn test_start_projects_onto_itself() {
        let mut s = session();
        s.drag_start("B1").unwrap();
        assert_eq!(s.over_id(), Some("B1"));
        let projection = s.projection().unwrap();
        assert_eq!(projection.depth, 1);
        assert_eq!(projection.parent_id.as_deref(), Some("B"));
    }

    #[test]
    fn test_cancel_leaves_tree_alone() {
        let mut s = session();
        let before = s.tree().clone();
        s.drag_start("A").unwrap();
        s.drag_over(Some("C")).unwrap();
        s.drag_move(20.0).unwrap();
        assert!(s.drag_cancel());
        assert!(!s.drag_cancel());
        assert_eq!(s.tree(), &before);
        assert_eq!(s.version(), 0);
        assert_eq!(s.projection(), None);
    }

    #[test]
    fn test_drop_outside_is_cancelled() {
        let mut s = session();
        s.drag_start("A").unwrap();
        s.drag_over(Some("C")).unwrap();
        assert_eq!(s.drag_end(None), DropOutcome::Cancelled);
        assert_eq!(shape(s.tree()), "A B(B1 B2) C");
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn test_over_none_clears_projection() {
        let mut s = session();
        s.drag_start("A").unwrap();
        s.drag_over(None).unwrap();
        assert_eq!(s.projection(), None);
        assert_eq!(s.move_description(), None);
    }

    #[test]
    fn test_drop_on_self_is_unchanged() {
        let mut s = session();
        s.drag_start("B2").unwrap();
        s.drag_move(-40.0).unwrap();
        assert_eq!(s.drag_end(Some("B2")), DropOutcome::Unchanged);
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn test_second_start_replaces_first() {
        let mut s = session();
        s.drag_start("A").unwrap();
        s.drag_start("C").unwrap();
        assert_eq!(s.active_id(), Some("C"));
        assert_eq!(s.over_id(), Some("C"));
    }

    #[test]
    fn test_events_without_drag() {
        let mut s = session();
        assert_eq!(s.drag_move(10.0), Err(DragError::NotDragging));
        assert_eq!(s.drag_over(Some("A")), Err(DragError::NotDragging));
        assert_eq!(
            s.drag_end(Some("A")),
            DropOutcome::Rejected(DragError::NotDragging)
        );
        assert!(!s.key_move(KeyMove::Up));
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut s = session();
        assert_eq!(
            s.drag_start("Z"),
            Err(DragError::UnknownItem("Z".into()))
        );
        s.drag_start("A").unwrap();
        assert_eq!(
            s.drag_over(Some("Z")),
            Err(DragError::Projection(ProjectionError::OverNotFound("Z".into())))
        );
        assert_eq!(
            s.drag_end(Some("Z")),
            DropOutcome::Rejected(DragError::Projection(ProjectionError::OverNotFound(
                "Z".into()
            )))
        );
        assert_eq!(s.version(), 0);
    }

    #[test]
    fn test_rows_show_projected_depth() {
        let mut s = session();
        s.drag_start("C").unwrap();
        s.drag_over(Some("B2")).unwrap();
        s.drag_move(40.0).unwrap();

        let rows = s.rows();
        let c = rows.iter().find(|r| r.record.id == "C").unwrap();
        assert!(c.active);
        assert_eq!(c.depth, 2);
        assert_eq!(c.record.depth, 0);
        let b2 = rows.iter().find(|r| r.record.id == "B2").unwrap();
        assert!(b2.over);
        assert!(!b2.active);
    }

    #[test]
    fn test_dragged_subtree_is_hidden() {
        let mut s = session();
        s.drag_start("B").unwrap();
        assert_eq!(row_ids(&s), vec!["A", "B", "C"]);
        s.drag_cancel();
        assert_eq!(row_ids(&s), vec!["A", "B", "B1", "B2", "C"]);
    }

    #[test]
    fn test_collapse_hides_children() {
        let mut s = session();
        assert!(s.toggle_collapsed("B"));
        assert_eq!(s.version(), 1);
        assert_eq!(row_ids(&s), vec!["A", "B", "C"]);
        // Hidden rows cannot be picked up
        assert_eq!(
            s.drag_start("B1"),
            Err(DragError::UnknownItem("B1".into()))
        );
        assert!(!s.toggle_collapsed("Z"));
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn test_collapse_ignored_when_not_collapsible() {
        let mut config = Config::default();
        config.view.collapsible = false;
        let tree = Tree::new([Node::leaf("A")
            .collapsed(true)
            .child(Node::leaf("A1"))]);
        let s = DragSession::new(tree, &config);
        assert_eq!(row_ids(&s), vec!["A", "A1"]);
    }

    #[test]
    fn test_drop_next_to_collapsed_branch() {
        let mut s = session();
        s.toggle_collapsed("B");
        s.drag_start("A").unwrap();
        s.drag_over(Some("C")).unwrap();
        assert!(matches!(s.drag_end(Some("C")), DropOutcome::Moved(_)));
        assert_eq!(shape(s.tree()), "B(B1 B2) C A");
        assert!(s.tree().roots[0].collapsed);
    }

    #[test]
    fn test_keyboard_gesture() {
        let mut s = session();
        s.drag_start("C").unwrap();
        assert!(s.key_move(KeyMove::Up));
        assert_eq!(s.over_id(), Some("B2"));
        assert_eq!(s.projection().unwrap().depth, 1);
        assert!(s.key_move(KeyMove::Right));
        assert_eq!(s.projection().unwrap().depth, 2);
        // Band is [1, 2]
        assert!(!s.key_move(KeyMove::Right));
        assert!(s.key_move(KeyMove::Left));
        let over = s.over_id().map(str::to_string);
        assert!(matches!(s.drag_end(over.as_deref()), DropOutcome::Moved(_)));
        assert_eq!(shape(s.tree()), "A B(B1 C B2)");
    }

    #[test]
    fn test_key_left_after_pointer_overshoot() {
        let mut s = session();
        s.drag_start("C").unwrap();
        s.drag_over(Some("B2")).unwrap();
        s.drag_move(1000.0).unwrap();
        assert_eq!(s.projection().unwrap().depth, 2);
        assert!(s.key_move(KeyMove::Left));
        assert_eq!(s.projection().unwrap().depth, 1);
        assert_eq!(s.offset_x(), Some(20.0));
    }

    #[test]
    fn test_move_description_follows_projection() {
        let mut s = session();
        s.drag_start("C").unwrap();
        s.drag_over(Some("B2")).unwrap();
        s.drag_move(40.0).unwrap();
        assert_eq!(
            s.move_description(),
            Some(MoveDescription::NestedUnder("B1".into()))
        );
        s.drag_move(0.0).unwrap();
        assert_eq!(
            s.move_description(),
            Some(MoveDescription::After("B1".into()))
        );
    }

    #[test]
    fn test_remove_bumps_version() {
        let mut s = session();
        let removed = s.remove("B").unwrap();
        assert_eq!(removed.children.len(), 2);
        assert_eq!(shape(s.tree()), "A C");
        assert_eq!(s.version(), 1);
        assert!(s.remove("B").is_none());
        assert_eq!(s.version(), 1);
    }

    #[test]
    fn test_mutation_cancels_drag() {
        let mut s = session();
        s.drag_start("A").unwrap();
        assert!(s.update_payload("C", |p| p.title = "renamed".into()));
        assert!(!s.is_dragging());
        assert_eq!(
            tree_ops::find_node(s.tree(), "C").unwrap().payload.title,
            "renamed"
        );
    }

    #[test]
    fn test_move_to_guards_own_subtree() {
        let mut s = session();
        let err = s
            .move_to("B", MoveTarget::Inside("B1".into()))
            .unwrap_err();
        assert!(matches!(err, MoveError::IntoOwnSubtree { .. }));
        assert_eq!(s.version(), 0);
        s.move_to("A", MoveTarget::After("B2".into())).unwrap();
        assert_eq!(shape(s.tree()), "B(B1 B2 A) C");
    }

    #[test]
    fn test_set_tree_resets_drag() {
        let mut s = session();
        s.drag_start("A").unwrap();
        s.set_tree(Tree::new([Node::leaf("X")]));
        assert!(!s.is_dragging());
        assert_eq!(row_ids(&s), vec!["X"]);
        assert_eq!(s.version(), 1);
    }
}
