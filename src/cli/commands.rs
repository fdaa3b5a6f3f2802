use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dnd::KeyMove;
use crate::io::tree_io::TREE_FILE;

#[derive(Parser)]
#[command(name = "restack", about = concat!("restack v", env!("CARGO_PKG_VERSION"), " - drag-to-reorder for nested outlines"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Tree file to read (a JSON array of nodes)
    #[arg(short = 'f', long = "file", global = true, default_value = TREE_FILE)]
    pub file: PathBuf,

    /// Config file (default: restack.toml next to the tree file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the tree as an indented outline
    Show,
    /// Print the flattened records
    Flatten(FlattenArgs),
    /// Show where a drag would drop an item, without moving it
    Project(DragArgs),
    /// Drag an item onto another row and drop it
    Move(MoveArgs),
    /// Remove an item and its subtree
    Remove(IdArgs),
    /// Toggle an item's collapsed flag
    Collapse(IdArgs),
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FlattenArgs {
    /// Only rows that are visible (collapsed subtrees hidden)
    #[arg(long)]
    pub visible: bool,
}

/// One simulated drag gesture
#[derive(Args)]
pub struct DragArgs {
    /// Item being dragged
    #[arg(long)]
    pub active: String,
    /// Row the pointer is over
    #[arg(long)]
    pub over: String,
    /// Horizontal drag offset, in the same units as drag.indent_width
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset: f64,
    /// Arrow keys pressed after reaching the row (repeatable)
    #[arg(long = "key", value_enum)]
    pub keys: Vec<KeyArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KeyArg {
    Up,
    Down,
    Left,
    Right,
}

impl From<KeyArg> for KeyMove {
    fn from(key: KeyArg) -> Self {
        match key {
            KeyArg::Up => KeyMove::Up,
            KeyArg::Down => KeyMove::Down,
            KeyArg::Left => KeyMove::Left,
            KeyArg::Right => KeyMove::Right,
        }
    }
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct MoveArgs {
    #[command(flatten)]
    pub drag: DragArgs,
    /// Save the result back to the tree file instead of printing it
    #[arg(long)]
    pub write: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Item ID
    pub id: String,
    /// Save the result back to the tree file instead of printing it
    #[arg(long)]
    pub write: bool,
}
