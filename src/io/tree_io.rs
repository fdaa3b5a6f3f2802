use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use crate::model::node::Tree;

/// Default tree file name
pub const TREE_FILE: &str = "tree.json";

/// Error type for tree file I/O
#[derive(Debug, thiserror::Error)]
pub enum TreeIoError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("invalid tree JSON in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("duplicate id in tree: {0}")]
    DuplicateId(String),
    #[error("could not serialize tree: {0}")]
    SerializeError(#[from] serde_json::Error),
}

/// Read a tree from a JSON array of nodes.
pub fn read_tree<P: DeserializeOwned>(path: &Path) -> Result<Tree<P>, TreeIoError> {
    let text = fs::read_to_string(path).map_err(|e| TreeIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let tree: Tree<P> = serde_json::from_str(&text).map_err(|e| TreeIoError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    check_unique_ids(&tree)?;
    Ok(tree)
}

/// Serialize a tree as pretty-printed JSON with a trailing newline.
pub fn tree_to_json<P: Serialize>(tree: &Tree<P>) -> Result<String, TreeIoError> {
    let mut json = serde_json::to_string_pretty(tree)?;
    json.push('\n');
    Ok(json)
}

/// Write a tree to `path`, replacing it atomically.
pub fn write_tree<P: Serialize>(path: &Path, tree: &Tree<P>) -> Result<(), TreeIoError> {
    let json = tree_to_json(tree)?;
    atomic_write(path, json.as_bytes()).map_err(|e| TreeIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// The tree operations assume unique ids, so reject files that break that.
fn check_unique_ids<P>(tree: &Tree<P>) -> Result<(), TreeIoError> {
    let mut seen = std::collections::HashSet::new();
    let mut stack: Vec<_> = tree.roots.iter().collect();
    while let Some(node) = stack.pop() {
        if !seen.insert(node.id.as_str()) {
            return Err(TreeIoError::DuplicateId(node.id.clone()));
        }
        stack.extend(node.children.iter());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::{Node, Payload, Status};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TREE_FILE);
        let tree: Tree = Tree::new([
            Node::leaf("A"),
            Node::leaf("B").collapsed(true).child(Node::leaf("B1")),
        ]);
        write_tree(&path, &tree).unwrap();
        let back: Tree = read_tree(&path).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_read_minimal_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TREE_FILE);
        fs::write(
            &path,
            r#"[{"id": "A", "payload": {"title": "Alpha", "status": "done"},
                "children": [{"id": "A1", "payload": {"title": "One"}}]}]"#,
        )
        .unwrap();
        let tree: Tree<Payload> = read_tree(&path).unwrap();
        assert_eq!(tree.roots[0].payload.status, Status::Done);
        assert_eq!(tree.roots[0].children[0].id, "A1");
        assert!(!tree.roots[0].collapsed);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = read_tree::<Payload>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TreeIoError::ReadError { .. }));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TREE_FILE);
        fs::write(&path, "{not json").unwrap();
        let err = read_tree::<Payload>(&path).unwrap_err();
        assert!(matches!(err, TreeIoError::ParseError { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(TREE_FILE);
        let tree: Tree = Tree::new([Node::leaf("A").child(Node::leaf("A"))]);
        write_tree(&path, &tree).unwrap();
        let err = read_tree::<Payload>(&path).unwrap_err();
        assert!(matches!(err, TreeIoError::DuplicateId(id) if id == "A"));
    }
}
