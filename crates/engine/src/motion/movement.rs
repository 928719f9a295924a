use crate::geometry::{Cardinal, PixelPos};
use crate::map::MoveResult;
use crate::world::{LevelState, SpriteId};

/// Physical extent of a sprite around its feet point, in pixels. Collision
/// is probed at the centre and at the four points one extent away.
pub const EXTENT: i32 = 6;

/// Pixels a walking sprite covers per movement step.
pub const WALK_INCREMENT: i32 = 2;

/// Size of a sliding correction, in pixels, along a single axis.
const NUDGE_STEP: i32 = 2;

const CENTRE: usize = 0;
const LEFT: usize = 1;
const UP: usize = 2;
const RIGHT: usize = 3;
const DOWN: usize = 4;

/// Try to move a sprite to the desired pixel position.
///
/// Five probe points are tested (centre plus the four extent points), and a
/// move that is almost clear gets nudged 2 px perpendicular to the
/// obstruction so the sprite slides along walls and diagonal edges instead
/// of sticking to them. Returns true iff the sprite's stored position was
/// updated; on false the position is unchanged.
pub fn try_move(
    level: &mut LevelState,
    sprite_id: SpriteId,
    check: PixelPos,
    direction: Cardinal,
) -> bool {
    check_and_set(level, sprite_id, check, direction, true)
}

/// Probe the desired position without committing it. Used for the
/// recursive re-check of a nudged target.
fn check_and_set(
    level: &mut LevelState,
    sprite_id: SpriteId,
    check: PixelPos,
    direction: Cardinal,
    can_set: bool,
) -> bool {
    let Some(sprite) = level.sprite(sprite_id) else {
        return false;
    };
    let ignore_hero = sprite.kind().is_hero();
    let pos = sprite.pixel_position();
    let tile_size = level.tile_size();

    if level.clip_disabled() {
        if can_set {
            if let Some(sprite) = level.sprite_mut(sprite_id) {
                sprite.set_pixel_position(check, tile_size);
            }
        }
        return true;
    }

    // Probe order: centre, left, up, right, down.
    let new_points = [
        check,
        check.offset(-EXTENT, 0),
        check.offset(0, -EXTENT),
        check.offset(EXTENT, 0),
        check.offset(0, EXTENT),
    ];
    let old_points = [
        pos,
        pos.offset(-EXTENT, 0),
        pos.offset(0, -EXTENT),
        pos.offset(EXTENT, 0),
        pos.offset(0, EXTENT),
    ];

    let mut moves = [MoveResult::Blocked; 5];
    let mut clear = [false; 5];
    for index in 0..5 {
        moves[index] = level.can_move(
            old_points[index],
            new_points[index],
            sprite_id,
            ignore_hero,
            false,
        );
        clear[index] = moves[index].is_allowed();
    }

    // From the desired centre, is each extent point reachable at all?
    // Diagonal-blocked results still count as reachable here: those
    // positions can be nudged out of.
    let mut points = [true; 5];
    for side in [LEFT, UP, RIGHT, DOWN] {
        points[side] = level
            .can_move(check, new_points[side], sprite_id, ignore_hero, false)
            .is_passable();
    }

    let mut nudge_x = 0;
    let mut nudge_y = 0;
    let mut moved = false;

    // Exactly one side unreachable: slide away from it.
    if !points[LEFT] && points[UP] && points[RIGHT] && points[DOWN] {
        nudge_x = NUDGE_STEP;
        moved = true;
    } else if points[LEFT] && points[UP] && !points[RIGHT] && points[DOWN] {
        nudge_x = -NUDGE_STEP;
        moved = true;
    } else if points[LEFT] && !points[UP] && points[RIGHT] && points[DOWN] {
        nudge_y = NUDGE_STEP;
        moved = true;
    } else if points[LEFT] && points[UP] && points[RIGHT] && !points[DOWN] {
        nudge_y = -NUDGE_STEP;
        moved = true;
    }

    // The easy case: all five probes are clear.
    if !moved {
        moved = clear[CENTRE] && clear[LEFT] && clear[UP] && clear[RIGHT] && clear[DOWN];
    }

    // Four of five clear, or a diagonal corner. Which perpendicular nudge
    // applies depends on the travel direction, and when travelling straight
    // into the blocked probe, on which diagonal the blocking tile carries.
    // First matching rule wins.
    if !moved {
        if clear[CENTRE] && clear[UP] && clear[RIGHT] && clear[DOWN] {
            // Free everywhere but the left probe.
            match direction {
                Cardinal::Up | Cardinal::Down => {
                    nudge_x = NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Left => {
                    if moves[LEFT] == MoveResult::BlockedTlBr {
                        nudge_y = -NUDGE_STEP;
                        moved = true;
                    } else if moves[LEFT] == MoveResult::BlockedTrBl {
                        nudge_y = NUDGE_STEP;
                        moved = true;
                    }
                }
                Cardinal::Right => {}
            }
        } else if clear[CENTRE] && clear[LEFT] && clear[UP] && clear[DOWN] {
            // Free everywhere but the right probe.
            match direction {
                Cardinal::Up | Cardinal::Down => {
                    nudge_x = -NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Right => {
                    if moves[RIGHT] == MoveResult::BlockedTlBr {
                        nudge_y = NUDGE_STEP;
                        moved = true;
                    } else if moves[RIGHT] == MoveResult::BlockedTrBl {
                        nudge_y = -NUDGE_STEP;
                        moved = true;
                    }
                }
                Cardinal::Left => {}
            }
        } else if clear[CENTRE] && clear[LEFT] && clear[RIGHT] && clear[DOWN] {
            // Free everywhere but the top probe.
            match direction {
                Cardinal::Left | Cardinal::Right => {
                    nudge_y = NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Up => {
                    if moves[UP] == MoveResult::BlockedTlBr {
                        nudge_x = -NUDGE_STEP;
                        moved = true;
                    } else if moves[UP] == MoveResult::BlockedTrBl {
                        nudge_x = NUDGE_STEP;
                        moved = true;
                    }
                }
                Cardinal::Down => {}
            }
        } else if clear[CENTRE] && clear[LEFT] && clear[UP] && clear[RIGHT] {
            // Free everywhere but the bottom probe.
            match direction {
                Cardinal::Left | Cardinal::Right => {
                    nudge_y = -NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Down => {
                    if moves[DOWN] == MoveResult::BlockedTlBr {
                        nudge_x = NUDGE_STEP;
                        moved = true;
                    } else if moves[DOWN] == MoveResult::BlockedTrBl {
                        nudge_x = -NUDGE_STEP;
                        moved = true;
                    }
                }
                Cardinal::Up => {}
            }
        } else if clear[CENTRE]
            && clear[RIGHT]
            && clear[DOWN]
            && moves[LEFT] == MoveResult::BlockedTrBl
            && moves[UP] == MoveResult::BlockedTrBl
        {
            // Left and top probes sit on the same TR-BL diagonal.
            match direction {
                Cardinal::Up => {
                    nudge_x = NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Left => {
                    nudge_y = NUDGE_STEP;
                    moved = true;
                }
                _ => {}
            }
        } else if clear[CENTRE]
            && clear[LEFT]
            && clear[DOWN]
            && moves[UP] == MoveResult::BlockedTlBr
            && moves[RIGHT] == MoveResult::BlockedTlBr
        {
            // Top and right probes sit on the same TL-BR diagonal.
            match direction {
                Cardinal::Up => {
                    nudge_x = -NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Right => {
                    nudge_y = NUDGE_STEP;
                    moved = true;
                }
                _ => {}
            }
        } else if clear[CENTRE]
            && clear[LEFT]
            && clear[UP]
            && moves[RIGHT] == MoveResult::BlockedTrBl
            && moves[DOWN] == MoveResult::BlockedTrBl
        {
            // Right and bottom probes sit on the same TR-BL diagonal.
            match direction {
                Cardinal::Down => {
                    nudge_x = -NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Right => {
                    nudge_y = -NUDGE_STEP;
                    moved = true;
                }
                _ => {}
            }
        } else if clear[CENTRE]
            && clear[UP]
            && clear[RIGHT]
            && moves[LEFT] == MoveResult::BlockedTlBr
            && moves[DOWN] == MoveResult::BlockedTlBr
        {
            // Left and bottom probes sit on the same TL-BR diagonal.
            match direction {
                Cardinal::Down => {
                    nudge_x = NUDGE_STEP;
                    moved = true;
                }
                Cardinal::Left => {
                    nudge_y = -NUDGE_STEP;
                    moved = true;
                }
                _ => {}
            }
        }
    }

    if !moved {
        return false;
    }

    if nudge_x != 0 || nudge_y != 0 {
        if can_set {
            // Re-probe the nudged target before committing so a nudge never
            // pushes the sprite into a second obstruction.
            let nudged = check.offset(nudge_x, nudge_y);
            if check_and_set(level, sprite_id, nudged, direction, false) {
                if let Some(sprite) = level.sprite_mut(sprite_id) {
                    sprite.set_pixel_position(nudged, tile_size);
                }
                return true;
            }
            return false;
        }
        // Probe-only: tolerate a single blocked probe. One side may be
        // transiently blocked while the nudge is still in progress.
        let clear_count = clear.iter().filter(|&&is_clear| is_clear).count();
        return clear_count >= 4;
    }

    if can_set {
        if let Some(sprite) = level.sprite_mut(sprite_id) {
            sprite.set_pixel_position(check, tile_size);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileCoord;
    use crate::map::{BlockMask, CollisionRules, MapKind, TileLayer};

    const TILE_SIZE: i32 = 32;

    fn rules() -> CollisionRules {
        CollisionRules::new(
            vec![BlockMask::default(), BlockMask::ALL, BlockMask::LEFT],
            &[],
        )
    }

    fn level_with_tiles(tiles: &[(i32, i32, i32)]) -> LevelState {
        let mut layer = TileLayer::new(10, 10, vec![0; 100]).expect("layer");
        for &(x, y, tile) in tiles {
            layer.set_tile(x, y, tile).expect("in bounds");
        }
        LevelState::new("movement", MapKind::Overworld, TILE_SIZE, vec![layer], rules())
            .expect("level")
    }

    #[test]
    fn open_ground_commits_the_desired_position() {
        let mut level = level_with_tiles(&[]);
        let hero = level.spawn_hero(TileCoord::new(5, 5), 0);
        let start = level.hero().expect("hero").pixel_position();
        let desired = start.offset(WALK_INCREMENT, 0);
        assert!(try_move(&mut level, hero, desired, Cardinal::Right));
        assert_eq!(level.hero().expect("hero").pixel_position(), desired);
    }

    #[test]
    fn grazing_a_wall_nudges_exactly_one_axis() {
        // Solid wall column at x=4. The hero hugs it closely enough that
        // only the left probe is obstructed while moving up.
        let mut level = level_with_tiles(&[(4, 4, 1), (4, 5, 1), (4, 6, 1)]);
        let hero = level.spawn_hero(TileCoord::new(5, 5), 0);
        let hugging = PixelPos::new(5 * TILE_SIZE + 4, 5 * TILE_SIZE + 17);
        level
            .sprite_mut(hero)
            .expect("hero")
            .set_pixel_position(hugging, TILE_SIZE);

        let desired = hugging.offset(0, -WALK_INCREMENT);
        assert!(try_move(&mut level, hero, desired, Cardinal::Up));
        assert_eq!(
            level.hero().expect("hero").pixel_position(),
            desired.offset(NUDGE_STEP, 0)
        );
    }

    #[test]
    fn blocked_centre_rejects_the_move() {
        // Solid wall column at x=6; the desired centre lands inside it.
        let mut level = level_with_tiles(&[(6, 4, 1), (6, 5, 1), (6, 6, 1)]);
        let hero = level.spawn_hero(TileCoord::new(5, 5), 0);
        let pressed = PixelPos::new(5 * TILE_SIZE + 31, 5 * TILE_SIZE + 17);
        level
            .sprite_mut(hero)
            .expect("hero")
            .set_pixel_position(pressed, TILE_SIZE);

        let desired = pressed.offset(WALK_INCREMENT, 0);
        assert!(!try_move(&mut level, hero, desired, Cardinal::Right));
        assert_eq!(level.hero().expect("hero").pixel_position(), pressed);
    }

    #[test]
    fn wall_holds_the_hero_on_its_near_side() {
        // Tile (6,5) refuses entry from the left; walking right stalls at
        // the point where the right probe would cross in.
        let mut level = level_with_tiles(&[(6, 5, 2)]);
        let hero = level.spawn_hero(TileCoord::new(5, 5), 0);
        for _ in 0..20 {
            let pos = level.hero().expect("hero").pixel_position();
            try_move(
                &mut level,
                hero,
                pos.offset(WALK_INCREMENT, 0),
                Cardinal::Right,
            );
        }
        let hero_sprite = level.hero().expect("hero");
        assert_eq!(hero_sprite.tile_position(TILE_SIZE), TileCoord::new(5, 5));
        assert_eq!(hero_sprite.pixel_position().x, 6 * TILE_SIZE - EXTENT - 1);
    }

    #[test]
    fn no_clip_flag_commits_anything() {
        let mut level = level_with_tiles(&[(6, 5, 1)]);
        let hero = level.spawn_hero(TileCoord::new(5, 5), 0);
        level.set_clip_disabled(true);
        let inside_wall = TileCoord::new(6, 5).center_pixel(TILE_SIZE);
        assert!(try_move(&mut level, hero, inside_wall, Cardinal::Right));
        assert_eq!(level.hero().expect("hero").pixel_position(), inside_wall);
    }
}
