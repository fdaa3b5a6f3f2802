pub mod config;
pub mod flat;
pub mod node;

pub use config::*;
pub use flat::*;
pub use node::*;
