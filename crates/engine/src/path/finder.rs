use crate::geometry::{Direction, PixelPos, TileCoord};
use crate::map::MoveResult;
use crate::world::LevelState;

pub const CARDINAL_STEP_COST: i32 = 10;
/// Diagonal steps cost 10 * sqrt(2), integer-approximated.
pub const DIAGONAL_STEP_COST: i32 = 14;

/// Search bounds in tiles. Pathfinding is clipped to a box of roughly this
/// size centred on the source: only on-screen targets should be reachable
/// by point-and-click, so off-screen loops are deliberately not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width_tiles: i32,
    pub height_tiles: i32,
}

#[derive(Debug)]
struct PathNode {
    coord: TileCoord,
    parent: Option<usize>,
    distance_come: i32,
    distance_to_go: i32,
    cost: i32,
}

/// Find a tile path from one pixel position to another.
///
/// Returns the tile sequence from the source tile to the target tile
/// inclusive, or an empty vector when the target is inaccessible or no path
/// exists inside the viewport box. Empty means "nothing to do", never an
/// error.
pub fn find_path(
    level: &LevelState,
    from: PixelPos,
    to: PixelPos,
    viewport: Viewport,
) -> Vec<TileCoord> {
    let tile_size = level.tile_size();
    let from_tile = from.to_tile(tile_size);
    let to_tile = to.to_tile(tile_size);

    // A target with no open cardinal entry cannot be reached; skip the
    // whole search.
    if !is_target_accessible(level, to) {
        return Vec::new();
    }

    let x_start = (from_tile.x - (viewport.width_tiles + 1) / 2).max(0);
    let y_start = (from_tile.y - (viewport.height_tiles + 1) / 2).max(0);
    let x_end = (from_tile.x + (viewport.width_tiles + 1) / 2).min(level.width_tiles());
    let y_end = (from_tile.y + (viewport.height_tiles + 1) / 2).min(level.height_tiles());

    // The bounded box keeps node counts small; linear lists over one arena
    // are plenty.
    let mut nodes = vec![PathNode {
        coord: from_tile,
        parent: None,
        distance_come: 0,
        distance_to_go: heuristic(from_tile, to_tile),
        cost: heuristic(from_tile, to_tile),
    }];
    let mut open: Vec<usize> = vec![0];
    let mut closed: Vec<usize> = Vec::new();

    while !open.is_empty() && find_in(&nodes, &closed, to_tile).is_none() {
        let slot = lowest_cost_slot(&nodes, &open);
        let current = open.remove(slot);
        closed.push(current);

        let current_coord = nodes[current].coord;
        let from_px = current_coord.origin_pixel(tile_size);

        for direction in Direction::ALL {
            let (dx, dy) = direction.vector();
            let next = current_coord.offset(dx, dy);
            if next.x < x_start || next.x > x_end || next.y < y_start || next.y > y_end {
                continue;
            }
            if find_in(&nodes, &closed, next).is_some() {
                continue;
            }

            let to_px = next.origin_pixel(tile_size);
            if !direction.is_diagonal() {
                if !level.can_hero_move(from_px, to_px).is_allowed() {
                    continue;
                }
            } else if !diagonal_step_allowed(level, from_px, to_px, dx, dy, tile_size) {
                continue;
            }

            let local_cost = if direction.is_diagonal() {
                DIAGONAL_STEP_COST
            } else {
                CARDINAL_STEP_COST
            };

            if let Some(open_slot) = open.iter().position(|&index| nodes[index].coord == next) {
                let index = open[open_slot];
                let candidate = nodes[current].distance_come + local_cost;
                if candidate < nodes[index].distance_come {
                    nodes[index].parent = Some(current);
                    nodes[index].distance_come = candidate;
                    nodes[index].cost = candidate + nodes[index].distance_to_go;
                }
            } else {
                let distance_come = nodes[current].distance_come + local_cost;
                let distance_to_go = heuristic(next, to_tile);
                nodes.push(PathNode {
                    coord: next,
                    parent: Some(current),
                    distance_come,
                    distance_to_go,
                    cost: distance_come + distance_to_go,
                });
                open.push(nodes.len() - 1);
            }
        }
    }

    let Some(mut index) = find_in(&nodes, &closed, to_tile) else {
        return Vec::new();
    };
    let mut path = vec![nodes[index].coord];
    while let Some(parent) = nodes[index].parent {
        index = parent;
        path.push(nodes[index].coord);
    }
    path.reverse();
    path
}

/// A diagonal step is legal only if both orthogonal decompositions succeed:
/// horizontal-then-vertical and vertical-then-horizontal, two movement
/// queries each. Crossing a diagonal tile is tolerated when both legs of a
/// decomposition report the same diagonal and its orientation matches the
/// sign of the step - that allows cutting across a graphically-diagonal but
/// open tile while real diagonal walls keep blocking.
fn diagonal_step_allowed(
    level: &LevelState,
    from_px: PixelPos,
    to_px: PixelPos,
    dx: i32,
    dy: i32,
    tile_size: i32,
) -> bool {
    let h_mid = PixelPos::new(to_px.x, to_px.y - dy * tile_size);
    let v_mid = PixelPos::new(to_px.x - dx * tile_size, to_px.y);

    let move_h = level.can_hero_move(from_px, h_mid);
    let move_hv = level.can_hero_move(h_mid, to_px);
    let move_v = level.can_hero_move(from_px, v_mid);
    let move_vh = level.can_hero_move(v_mid, to_px);

    if !move_h.is_passable()
        || !move_hv.is_passable()
        || !move_v.is_passable()
        || !move_vh.is_passable()
    {
        return false;
    }

    if move_h.is_allowed() && move_hv.is_allowed() && move_v.is_allowed() && move_vh.is_allowed() {
        return true;
    }

    let mut allowed = false;
    if (move_h == MoveResult::BlockedTlBr && move_hv == MoveResult::BlockedTlBr)
        || (move_v == MoveResult::BlockedTlBr && move_vh == MoveResult::BlockedTlBr)
    {
        allowed = dx * dy > 0;
    }
    if (move_h == MoveResult::BlockedTrBl && move_hv == MoveResult::BlockedTrBl)
        || (move_v == MoveResult::BlockedTrBl && move_vh == MoveResult::BlockedTrBl)
    {
        allowed = dx * dy < 0;
    }
    allowed
}

fn is_target_accessible(level: &LevelState, to: PixelPos) -> bool {
    let tile_size = level.tile_size();
    [
        (-tile_size, 0),
        (0, -tile_size),
        (tile_size, 0),
        (0, tile_size),
    ]
    .iter()
    .any(|&(dx, dy)| level.can_hero_move(to.offset(dx, dy), to).is_passable())
}

fn heuristic(from: TileCoord, to: TileCoord) -> i32 {
    ((to.x - from.x).abs() + (to.y - from.y).abs()) * CARDINAL_STEP_COST
}

fn find_in(nodes: &[PathNode], list: &[usize], coord: TileCoord) -> Option<usize> {
    list.iter()
        .copied()
        .find(|&index| nodes[index].coord == coord)
}

/// Index into `open` of the cheapest node. Strict comparison keeps the
/// earliest-inserted node on ties, which makes path shape deterministic.
fn lowest_cost_slot(nodes: &[PathNode], open: &[usize]) -> usize {
    let mut best_slot = 0;
    let mut best_cost = i32::MAX;
    for (slot, &index) in open.iter().enumerate() {
        if nodes[index].cost < best_cost {
            best_cost = nodes[index].cost;
            best_slot = slot;
        }
    }
    best_slot
}
