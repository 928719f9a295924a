mod actions;
mod definition;
mod tilemap;
mod tileset;

pub use actions::{MapAction, MapTrigger};
pub use definition::{
    MapDefinition, MapHeader, MapKind, MapLoadError, NpcSpawn, SparseLayer, SparseTile,
    MAX_OVERLAY_LAYERS,
};
pub use tilemap::{MoveResult, TileLayer, TileLayerError, EMPTY_TILE};
pub use tileset::{BlockMask, CollisionRules, TilesetDescriptor};
