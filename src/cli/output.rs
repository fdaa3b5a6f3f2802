use serde::Serialize;

use crate::dnd::Row;
use crate::model::flat::{FlatRecord, Projection};
use crate::model::node::{Payload, Status};
use crate::ops::describe::MoveDescription;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct RowJson {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub depth: usize,
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    pub child_count: usize,
}

#[derive(Serialize)]
pub struct ProjectionJson {
    pub active: String,
    pub over: String,
    #[serde(flatten)]
    pub projection: Projection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<MoveDescription>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn row_to_json(row: &Row<'_, Payload>) -> RowJson {
    RowJson {
        id: row.record.id.clone(),
        title: row.record.payload.title.clone(),
        status: row.record.payload.status,
        depth: row.depth,
        parent_id: row.record.parent_id.clone(),
        collapsed: row.record.collapsed,
        child_count: row.record.child_count,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Format one row: status box, id, title, and `[+]` for hidden children
pub fn format_row_line(record: &FlatRecord<Payload>, depth: usize) -> String {
    let prefix = "  ".repeat(depth);
    let marker = if record.collapsed && record.child_count > 0 {
        " [+]"
    } else {
        ""
    };
    let title = if record.payload.title == record.id {
        String::new()
    } else {
        format!(" {}", record.payload.title)
    };
    format!(
        "{}[{}] {}{}{}",
        prefix,
        record.payload.status.checkbox_char(),
        record.id,
        title,
        marker
    )
}

/// Format the visible rows as an indented outline
pub fn format_outline(rows: &[Row<'_, Payload>]) -> Vec<String> {
    rows.iter()
        .map(|row| format_row_line(row.record, row.depth))
        .collect()
}

/// Format flattened records, one per line with their position fields
pub fn format_flat(records: &[FlatRecord<Payload>]) -> Vec<String> {
    records
        .iter()
        .map(|r| {
            format!(
                "{}: {}{} depth={} parent={} children={}",
                r.index,
                "  ".repeat(r.depth),
                r.id,
                r.depth,
                r.parent_id.as_deref().unwrap_or("-"),
                r.child_count
            )
        })
        .collect()
}

/// Format a projection and the description of where it lands
pub fn format_projection(
    projection: &Projection,
    description: Option<&MoveDescription>,
) -> Vec<String> {
    let mut lines = vec![
        format!("depth: {}", projection.depth),
        format!(
            "parent: {}",
            projection.parent_id.as_deref().unwrap_or("(top level)")
        ),
        format!("range: {}..={}", projection.min_depth, projection.max_depth),
    ];
    if let Some(description) = description {
        lines.push(format!("lands: {}", description));
    }
    lines
}
