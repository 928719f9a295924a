mod jump;
mod movement;

pub use jump::{JumpArc, JumpTracker, INCREMENT_COUNT, JUMP_TRIES};
pub use movement::{try_move, EXTENT, WALK_INCREMENT};
