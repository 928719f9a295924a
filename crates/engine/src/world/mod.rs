mod level;
mod sprite;

pub use level::{LevelError, LevelState};
pub use sprite::{Sprite, SpriteId, SpriteKind, MAX_OCCUPY};
