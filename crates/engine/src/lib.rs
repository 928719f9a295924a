pub mod geometry;
pub mod map;
pub mod motion;
pub mod path;
pub mod world;

pub use geometry::{Cardinal, Direction, PixelPos, TileCoord};
pub use map::{
    BlockMask, CollisionRules, MapAction, MapDefinition, MapHeader, MapKind, MapLoadError,
    MapTrigger, MoveResult, NpcSpawn, SparseLayer, SparseTile, TileLayer, TileLayerError,
    TilesetDescriptor, EMPTY_TILE, MAX_OVERLAY_LAYERS,
};
pub use motion::{
    try_move, JumpArc, JumpTracker, EXTENT, INCREMENT_COUNT, JUMP_TRIES, WALK_INCREMENT,
};
pub use path::{find_path, Viewport, CARDINAL_STEP_COST, DIAGONAL_STEP_COST};
pub use world::{LevelError, LevelState, Sprite, SpriteId, SpriteKind, MAX_OCCUPY};
