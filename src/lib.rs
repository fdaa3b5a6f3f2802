pub mod cli;
pub mod dnd;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
