use std::collections::VecDeque;

#[cfg(test)]
use engine::{BlockMask, MapHeader, MapKind, MapTrigger, NpcSpawn, SparseLayer, TileLayer};
use engine::{
    find_path, try_move, Cardinal, CollisionRules, Direction, JumpTracker, LevelError, LevelState,
    MapAction, MapDefinition, PixelPos, SpriteId, SpriteKind, TileCoord, TilesetDescriptor,
    Viewport, EXTENT, WALK_INCREMENT,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info};

/// Pixels an NPC covers per walking tick. NPCs amble at half hero speed.
const NPC_WALK_INCREMENT: i32 = 1;
/// An idle NPC starts wandering with probability 1-in-this per tick.
const NPC_START_WALK_ODDS: u32 = 150;
/// A wandering NPC stops with probability 1-in-this per completed tile.
const NPC_STOP_WALK_ODDS: u32 = 10;
/// Consecutive shoved ticks before an NPC gives way.
const NPC_SHOVE_FRAMES: u32 = 15;

include!("types.rs");
include!("npcs.rs");
include!("hero.rs");
include!("session.rs");
include!("scenario.rs");

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
