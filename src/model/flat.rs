use serde::{Deserialize, Serialize};

/// One node of a flattened tree: the node's own fields (minus children)
/// plus where it sat in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRecord<P> {
    pub id: String,
    pub payload: P,
    #[serde(default)]
    pub collapsed: bool,
    /// Owning node, `None` for top-level items
    pub parent_id: Option<String>,
    /// Nesting depth (0 = top-level)
    pub depth: usize,
    /// Position in emission order
    pub index: usize,
    /// Number of direct children at flatten time
    #[serde(default)]
    pub child_count: usize,
}

impl<P> FlatRecord<P> {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Where the dragged item would land if dropped now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub depth: usize,
    pub parent_id: Option<String>,
    pub min_depth: usize,
    pub max_depth: usize,
}
