use crate::model::flat::FlatRecord;
use crate::ops::projection::get_projection;

/// Arrow-key movement of the dragged item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMove {
    Up,
    Down,
    Left,
    Right,
}

/// Pointer state after a keyboard step
#[derive(Debug, Clone, PartialEq)]
pub struct KeyStep {
    pub over_id: String,
    pub offset_x: f64,
}

/// Translate one key press into a new drop target and drag offset.
///
/// Up/Down hop to the neighboring visible row and reset the offset so the
/// projection lands on that row's depth. Left/Right shift the offset by one
/// indent from the projected depth, but only while that depth can still
/// move in that direction. Returns `None` when the key has no effect.
pub fn key_step<P>(
    visible: &[FlatRecord<P>],
    active_id: &str,
    over_id: &str,
    offset_x: f64,
    indent_width: f64,
    key: KeyMove,
) -> Option<KeyStep> {
    let active = visible.iter().find(|r| r.id == active_id)?;
    let over_ix = visible.iter().position(|r| r.id == over_id)?;

    match key {
        KeyMove::Up | KeyMove::Down => {
            let target_ix = match key {
                KeyMove::Up => over_ix.checked_sub(1)?,
                _ => over_ix + 1,
            };
            let target = visible.get(target_ix)?;
            let levels = target.depth as f64 - active.depth as f64;
            Some(KeyStep {
                over_id: target.id.clone(),
                offset_x: levels * indent_width,
            })
        }
        KeyMove::Left | KeyMove::Right => {
            // Over itself the drop is a no-op, so depth cannot change there
            if active_id == over_id {
                return None;
            }
            let projection =
                get_projection(visible, active_id, over_id, offset_x, indent_width).ok()?;
            // Step from the clamped depth, not the raw offset
            let base = (projection.depth as f64 - active.depth as f64) * indent_width;
            let offset_x = match key {
                KeyMove::Left if projection.depth > projection.min_depth => base - indent_width,
                KeyMove::Right if projection.depth < projection.max_depth => base + indent_width,
                _ => return None,
            };
            Some(KeyStep {
                over_id: over_id.to_string(),
                offset_x,
            })
        }
    }
}
