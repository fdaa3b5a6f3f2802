pub mod keyboard;
pub mod session;

pub use keyboard::KeyMove;
pub use session::{DragError, DragSession, DropOutcome, Row};
