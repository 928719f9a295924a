use serde::Deserialize;
use tracing::warn;

use super::tilemap::EMPTY_TILE;

/// Per-tile directional blocking flags. A set bit means entry/exit across
/// that edge (or across the named diagonal) is blocked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct BlockMask(pub u8);

impl BlockMask {
    pub const RIGHT: BlockMask = BlockMask(0x01);
    pub const LEFT: BlockMask = BlockMask(0x02);
    pub const TOP: BlockMask = BlockMask(0x04);
    pub const BOTTOM: BlockMask = BlockMask(0x08);
    pub const TL_BR_DIAG: BlockMask = BlockMask(0x10);
    pub const TR_BL_DIAG: BlockMask = BlockMask(0x20);

    /// All six flags set: the tile cannot be entered from anywhere.
    pub const ALL: BlockMask = BlockMask(0x3f);

    pub fn intersects(self, other: BlockMask) -> bool {
        self.0 & other.0 != 0
    }

    /// A tile is walkable when at least one of the six flags is clear.
    pub fn is_walkable(self) -> bool {
        self.0 & Self::ALL.0 != Self::ALL.0
    }
}

/// Collision lookup table for a tileset: one block mask per tile index plus
/// which tiles are animated. The table is loaded once per map and read-only
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionRules {
    masks: Vec<BlockMask>,
    animated: Vec<bool>,
}

impl CollisionRules {
    pub fn new(masks: Vec<BlockMask>, animated_indices: &[usize]) -> Self {
        let mut animated = vec![false; masks.len()];
        for &index in animated_indices {
            if let Some(slot) = animated.get_mut(index) {
                *slot = true;
            }
        }
        Self { masks, animated }
    }

    /// A table where every tile index is open from every direction.
    pub fn open(tile_count: usize) -> Self {
        Self {
            masks: vec![BlockMask::default(); tile_count],
            animated: vec![false; tile_count],
        }
    }

    pub fn tile_count(&self) -> usize {
        self.masks.len()
    }

    /// Block mask for a tile index. The empty-tile sentinel is open from any
    /// direction; an index beyond the table resolves to fully blocked so
    /// corrupt or version-mismatched map data cannot crash movement.
    pub fn mask_for(&self, tile: i32) -> BlockMask {
        if tile == EMPTY_TILE || tile < 0 {
            return BlockMask::default();
        }
        match self.masks.get(tile as usize) {
            Some(mask) => *mask,
            None => {
                warn!(tile, table_len = self.masks.len(), "tile index outside collision table");
                BlockMask::ALL
            }
        }
    }

    pub fn can_walk(&self, tile: i32) -> bool {
        self.mask_for(tile).is_walkable()
    }

    pub fn is_animated(&self, tile: i32) -> bool {
        if tile < 0 {
            return false;
        }
        self.animated.get(tile as usize).copied().unwrap_or(false)
    }
}

/// On-disk form of a tileset's collision data.
#[derive(Debug, Clone, Deserialize)]
pub struct TilesetDescriptor {
    pub masks: Vec<BlockMask>,
    #[serde(default)]
    pub animated: Vec<usize>,
}

impl TilesetDescriptor {
    pub fn into_rules(self) -> CollisionRules {
        CollisionRules::new(self.masks, &self.animated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tile_is_open_from_any_direction() {
        let rules = CollisionRules::new(vec![BlockMask::ALL], &[]);
        assert_eq!(rules.mask_for(EMPTY_TILE), BlockMask::default());
        assert!(rules.can_walk(EMPTY_TILE));
    }

    #[test]
    fn out_of_range_index_fails_closed() {
        let rules = CollisionRules::new(vec![BlockMask::default()], &[]);
        assert_eq!(rules.mask_for(7), BlockMask::ALL);
        assert!(!rules.can_walk(7));
    }

    #[test]
    fn walkable_needs_one_clear_flag() {
        let five_of_six = BlockMask(BlockMask::ALL.0 & !BlockMask::TR_BL_DIAG.0);
        let rules = CollisionRules::new(vec![five_of_six, BlockMask::ALL], &[]);
        assert!(rules.can_walk(0));
        assert!(!rules.can_walk(1));
    }

    #[test]
    fn animated_flags_follow_descriptor_indices() {
        let descriptor = TilesetDescriptor {
            masks: vec![BlockMask::default(); 4],
            animated: vec![2, 9],
        };
        let rules = descriptor.into_rules();
        assert!(rules.is_animated(2));
        assert!(!rules.is_animated(1));
        assert!(!rules.is_animated(9));
    }
}
