use thiserror::Error;

use crate::geometry::PixelPos;

use super::tileset::{BlockMask, CollisionRules};

/// Sentinel tile index for "no tile here". Empty cells are walkable from
/// every direction.
pub const EMPTY_TILE: i32 = -1;

/// Outcome of a single-layer movement query between two pixel positions.
///
/// The diagonal variants mean "not cleanly allowed because a diagonal tile's
/// half-space boundary sits between the two points" - callers treat them as
/// softer than `Blocked` when deciding whether to nudge or to cut across a
/// diagonal tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    Blocked,
    Allowed,
    BlockedTlBr,
    BlockedTrBl,
}

impl MoveResult {
    pub fn is_allowed(self) -> bool {
        matches!(self, MoveResult::Allowed)
    }

    /// Anything but a hard block. Diagonal results still permit nudging.
    pub fn is_passable(self) -> bool {
        !matches!(self, MoveResult::Blocked)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TileLayerError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("layer dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("tile ({x}, {y}) is outside the {width}x{height} layer")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// One rectangular grid of tile indices. Maps stack several of these;
/// overlay layers start empty and only explicit entries override the
/// sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    width: i32,
    height: i32,
    tiles: Vec<i32>,
}

impl TileLayer {
    pub fn new(width: i32, height: i32, tiles: Vec<i32>) -> Result<Self, TileLayerError> {
        if width <= 0 || height <= 0 {
            return Err(TileLayerError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if tiles.len() != expected {
            return Err(TileLayerError::TileCountMismatch {
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// A sparse overlay layer: every cell starts as the sentinel.
    pub fn empty(width: i32, height: i32) -> Result<Self, TileLayerError> {
        if width <= 0 || height <= 0 {
            return Err(TileLayerError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            tiles: vec![EMPTY_TILE; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<i32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.tiles
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: i32) -> Result<(), TileLayerError> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Err(TileLayerError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.tiles[y as usize * self.width as usize + x as usize] = tile;
        Ok(())
    }

    /// Can a sprite move between two pixel positions on this layer?
    ///
    /// Checks, in order: the destination tile is walkable at all, neither
    /// tile blocks the crossed edge, and no diagonal tile involved has the
    /// two points in different half-spaces. Out-of-bounds lookups fail
    /// closed.
    pub fn can_move_between(
        &self,
        rules: &CollisionRules,
        tile_size: i32,
        from: PixelPos,
        to: PixelPos,
    ) -> MoveResult {
        let from_tile = from.to_tile(tile_size);
        let to_tile = to.to_tile(tile_size);

        let Some(tile_from) = self.tile_at(from_tile.x, from_tile.y) else {
            return MoveResult::Blocked;
        };
        let Some(tile_to) = self.tile_at(to_tile.x, to_tile.y) else {
            return MoveResult::Blocked;
        };

        if !rules.can_walk(tile_to) {
            return MoveResult::Blocked;
        }

        let from_dirs = rules.mask_for(tile_from);
        let to_dirs = rules.mask_for(tile_to);

        // A crossing is vetoed by either side: the exit edge of the source
        // tile or the entry edge of the destination tile.
        if to_tile.y < from_tile.y
            && (from_dirs.intersects(BlockMask::TOP) || to_dirs.intersects(BlockMask::BOTTOM))
        {
            return MoveResult::Blocked;
        }
        if to_tile.y > from_tile.y
            && (from_dirs.intersects(BlockMask::BOTTOM) || to_dirs.intersects(BlockMask::TOP))
        {
            return MoveResult::Blocked;
        }
        if to_tile.x < from_tile.x
            && (from_dirs.intersects(BlockMask::LEFT) || to_dirs.intersects(BlockMask::RIGHT))
        {
            return MoveResult::Blocked;
        }
        if to_tile.x > from_tile.x
            && (from_dirs.intersects(BlockMask::RIGHT) || to_dirs.intersects(BlockMask::LEFT))
        {
            return MoveResult::Blocked;
        }

        let mut result = MoveResult::Allowed;

        // Half-space tests against every diagonal involved, destination tile
        // first. A later test can overwrite an earlier diagonal verdict.
        for (dirs, anchor) in [(to_dirs, to_tile), (from_dirs, from_tile)] {
            if dirs.intersects(BlockMask::TR_BL_DIAG)
                && !same_half_space(
                    tile_size,
                    tile_local(from, anchor, tile_size),
                    tile_local(to, anchor, tile_size),
                    Diagonal::TrBl,
                )
            {
                result = MoveResult::BlockedTrBl;
            }
            if dirs.intersects(BlockMask::TL_BR_DIAG)
                && !same_half_space(
                    tile_size,
                    tile_local(from, anchor, tile_size),
                    tile_local(to, anchor, tile_size),
                    Diagonal::TlBr,
                )
            {
                result = MoveResult::BlockedTlBr;
            }
        }

        result
    }

    /// Can a sprite jump from `from` towards `to` on this layer?
    ///
    /// True when the crossed edge of the source tile is blocked but the tile
    /// one step beyond the destination is walkable, free of diagonals, and
    /// walled on the near side - a one-tile gap worth hopping over. Diagonal
    /// tiles on either end disqualify the jump outright.
    pub fn can_jump_between(
        &self,
        rules: &CollisionRules,
        tile_size: i32,
        from: PixelPos,
        to: PixelPos,
    ) -> bool {
        let from_tile = from.to_tile(tile_size);
        let to_tile = to.to_tile(tile_size);

        let Some(tile_from) = self.tile_at(from_tile.x, from_tile.y) else {
            return false;
        };
        let from_dirs = rules.mask_for(tile_from);

        if from_dirs.intersects(BlockMask::TL_BR_DIAG) || from_dirs.intersects(BlockMask::TR_BL_DIAG)
        {
            return false;
        }

        let mut jump = false;

        if to_tile.y < from_tile.y && from_dirs.intersects(BlockMask::TOP) {
            match self.landing_edge(rules, to_tile.x, to_tile.y - 1) {
                LandingEdge::Diagonal => return false,
                LandingEdge::Mask(beyond) => {
                    if beyond.intersects(BlockMask::BOTTOM) {
                        jump = true;
                    }
                }
                LandingEdge::Unusable => {}
            }
        }
        if to_tile.y > from_tile.y && from_dirs.intersects(BlockMask::BOTTOM) {
            match self.landing_edge(rules, to_tile.x, to_tile.y + 1) {
                LandingEdge::Diagonal => return false,
                LandingEdge::Mask(beyond) => {
                    if beyond.intersects(BlockMask::TOP) {
                        jump = true;
                    }
                }
                LandingEdge::Unusable => {}
            }
        }
        if to_tile.x < from_tile.x && from_dirs.intersects(BlockMask::LEFT) {
            match self.landing_edge(rules, to_tile.x - 1, to_tile.y) {
                LandingEdge::Diagonal => return false,
                LandingEdge::Mask(beyond) => {
                    if beyond.intersects(BlockMask::RIGHT) {
                        jump = true;
                    }
                }
                LandingEdge::Unusable => {}
            }
        }
        if to_tile.x > from_tile.x && from_dirs.intersects(BlockMask::RIGHT) {
            match self.landing_edge(rules, to_tile.x + 1, to_tile.y) {
                LandingEdge::Diagonal => return false,
                LandingEdge::Mask(beyond) => {
                    if beyond.intersects(BlockMask::LEFT) {
                        jump = true;
                    }
                }
                LandingEdge::Unusable => {}
            }
        }

        jump
    }

    fn landing_edge(&self, rules: &CollisionRules, x: i32, y: i32) -> LandingEdge {
        let Some(tile) = self.tile_at(x, y) else {
            return LandingEdge::Unusable;
        };
        if !rules.can_walk(tile) {
            return LandingEdge::Unusable;
        }
        let dirs = rules.mask_for(tile);
        if dirs.intersects(BlockMask::TL_BR_DIAG) || dirs.intersects(BlockMask::TR_BL_DIAG) {
            return LandingEdge::Diagonal;
        }
        LandingEdge::Mask(dirs)
    }
}

enum LandingEdge {
    /// Walkable, diagonal-free landing tile with this mask.
    Mask(BlockMask),
    /// Landing tile carries a diagonal; the whole jump is disallowed.
    Diagonal,
    /// Unwalkable or out of bounds; this direction just cannot jump.
    Unusable,
}

#[derive(Clone, Copy)]
enum Diagonal {
    TlBr,
    TrBl,
}

fn tile_local(point: PixelPos, tile: crate::geometry::TileCoord, tile_size: i32) -> (i32, i32) {
    (point.x - tile.x * tile_size, point.y - tile.y * tile_size)
}

/// Classifies both points against a diagonal line through the tile's local
/// 0..tile_size space. Strict comparisons: a point exactly on the line is in
/// neither half, so any pair involving it reports "not same side".
fn same_half_space(tile_size: i32, from: (i32, i32), to: (i32, i32), diagonal: Diagonal) -> bool {
    let (from_side, to_side) = match diagonal {
        Diagonal::TlBr => (from.1 - from.0, to.1 - to.0),
        Diagonal::TrBl => (
            tile_size - from.0 - from.1,
            tile_size - to.0 - to.1,
        ),
    };
    (from_side < 0 && to_side < 0) || (from_side > 0 && to_side > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileCoord;

    const TILE_SIZE: i32 = 32;

    fn layer_10x10(tiles: &[(i32, i32, i32)]) -> TileLayer {
        let mut layer = TileLayer::new(10, 10, vec![0; 100]).expect("layer");
        for &(x, y, tile) in tiles {
            layer.set_tile(x, y, tile).expect("in bounds");
        }
        layer
    }

    fn rules(masks: &[u8]) -> CollisionRules {
        CollisionRules::new(masks.iter().map(|&m| BlockMask(m)).collect(), &[])
    }

    #[test]
    fn open_grid_allows_movement() {
        let layer = layer_10x10(&[]);
        let rules = rules(&[0]);
        let from = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let to = from.offset(2, 0);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, from, to),
            MoveResult::Allowed
        );
    }

    #[test]
    fn blocking_is_vetoed_by_either_side() {
        // Tile 1 blocks exit right; tile 2 blocks entry left.
        let rules = rules(&[0, BlockMask::RIGHT.0, BlockMask::LEFT.0]);
        let from = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let to = TileCoord::new(6, 5).center_pixel(TILE_SIZE);

        let exit_blocked = layer_10x10(&[(5, 5, 1)]);
        assert_eq!(
            exit_blocked.can_move_between(&rules, TILE_SIZE, from, to),
            MoveResult::Blocked
        );

        let entry_blocked = layer_10x10(&[(6, 5, 2)]);
        assert_eq!(
            entry_blocked.can_move_between(&rules, TILE_SIZE, from, to),
            MoveResult::Blocked
        );
    }

    #[test]
    fn unwalkable_destination_blocks_every_direction() {
        let rules = rules(&[0, BlockMask::ALL.0]);
        let layer = layer_10x10(&[(6, 5, 1)]);
        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            let from = TileCoord::new(6 + dx, 5 + dy).center_pixel(TILE_SIZE);
            let to = TileCoord::new(6, 5).center_pixel(TILE_SIZE);
            assert_eq!(
                layer.can_move_between(&rules, TILE_SIZE, from, to),
                MoveResult::Blocked
            );
        }
    }

    #[test]
    fn out_of_bounds_fails_closed() {
        let layer = layer_10x10(&[]);
        let rules = rules(&[0]);
        let from = TileCoord::new(0, 0).center_pixel(TILE_SIZE);
        let to = PixelPos::new(-40, from.y);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, from, to),
            MoveResult::Blocked
        );
        let beyond = PixelPos::new(10 * TILE_SIZE + 4, from.y);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, from, beyond),
            MoveResult::Blocked
        );
    }

    #[test]
    fn diagonal_tile_splits_by_half_space() {
        // Tile 1 carries a TL-BR diagonal; tile (6,5) wears it.
        let rules = rules(&[0, BlockMask::TL_BR_DIAG.0]);
        let layer = layer_10x10(&[(6, 5, 1)]);

        // Both points below the diagonal (local y - x > 0): same side.
        let origin = TileCoord::new(6, 5).origin_pixel(TILE_SIZE);
        let same_from = origin.offset(5, 10);
        let same_to = origin.offset(7, 10);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, same_from, same_to),
            MoveResult::Allowed
        );

        // Straddling the diagonal: local y - x goes from +1 to -1.
        let cross_from = origin.offset(5, 6);
        let cross_to = origin.offset(7, 6);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, cross_from, cross_to),
            MoveResult::BlockedTlBr
        );
    }

    #[test]
    fn point_on_the_diagonal_line_is_never_same_side() {
        // Exact-zero classification: a point on the line blocks both ways.
        let rules = rules(&[0, BlockMask::TL_BR_DIAG.0]);
        let layer = layer_10x10(&[(6, 5, 1)]);
        let origin = TileCoord::new(6, 5).origin_pixel(TILE_SIZE);

        let on_line = origin.offset(6, 6);
        let above = origin.offset(4, 6);
        let below = origin.offset(8, 6);
        for (from, to) in [(above, on_line), (on_line, above), (below, on_line)] {
            assert_eq!(
                layer.can_move_between(&rules, TILE_SIZE, from, to),
                MoveResult::BlockedTlBr,
                "{from:?} -> {to:?}"
            );
        }
    }

    #[test]
    fn tr_bl_half_space_classification() {
        let rules = rules(&[0, BlockMask::TR_BL_DIAG.0]);
        let layer = layer_10x10(&[(6, 5, 1)]);
        let origin = TileCoord::new(6, 5).origin_pixel(TILE_SIZE);

        // Both in the top-left half (tile_size - x - y > 0).
        let a = origin.offset(4, 4);
        let b = origin.offset(6, 4);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, a, b),
            MoveResult::Allowed
        );

        // Crossing: 32 - x - y flips sign between the points.
        let c = origin.offset(15, 16);
        let d = origin.offset(17, 16);
        assert_eq!(
            layer.can_move_between(&rules, TILE_SIZE, c, d),
            MoveResult::BlockedTrBl
        );
    }

    #[test]
    fn jump_needs_blocked_edge_and_walled_landing() {
        // Tile 1 blocks right, tile 2 blocks left. Hero tile (5,5) = 1,
        // landing tile (7,5) = 2, gap tile open.
        let rules = rules(&[0, BlockMask::RIGHT.0, BlockMask::LEFT.0]);
        let layer = layer_10x10(&[(5, 5, 1), (7, 5, 2)]);

        let edge = PixelPos::new(5 * TILE_SIZE + 30, 5 * TILE_SIZE + 17);
        let probe = edge.offset(4, 0);
        assert!(layer.can_jump_between(&rules, TILE_SIZE, edge, probe));

        // Without the far wall there is nothing to jump over.
        let no_wall = layer_10x10(&[(5, 5, 1)]);
        assert!(!no_wall.can_jump_between(&rules, TILE_SIZE, edge, probe));
    }

    #[test]
    fn diagonal_tiles_disqualify_jumps() {
        let rules = rules(&[
            0,
            BlockMask::RIGHT.0,
            BlockMask(BlockMask::LEFT.0 | BlockMask::TL_BR_DIAG.0).0,
        ]);
        let layer = layer_10x10(&[(5, 5, 1), (7, 5, 2)]);
        let edge = PixelPos::new(5 * TILE_SIZE + 30, 5 * TILE_SIZE + 17);
        let probe = edge.offset(4, 0);
        assert!(!layer.can_jump_between(&rules, TILE_SIZE, edge, probe));
    }

    #[test]
    fn layer_construction_validates_shape() {
        assert_eq!(
            TileLayer::new(3, 3, vec![0; 8]),
            Err(TileLayerError::TileCountMismatch {
                expected: 9,
                actual: 8
            })
        );
        assert!(TileLayer::new(0, 3, Vec::new()).is_err());
    }
}
