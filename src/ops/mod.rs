pub mod build;
pub mod describe;
pub mod flatten;
pub mod projection;
pub mod reorder;
pub mod tree_ops;
