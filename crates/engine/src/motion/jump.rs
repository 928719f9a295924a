use tracing::debug;

use crate::geometry::{Cardinal, PixelPos};
use crate::world::LevelState;

use super::movement::{EXTENT, WALK_INCREMENT};

/// Consecutive same-direction ticks of pressing against a jumpable edge
/// before the jump starts.
pub const JUMP_TRIES: u32 = 15;

/// Number of iterations a jump takes from take-off to landing.
pub const INCREMENT_COUNT: u32 = 8;

/// An in-flight jump: linear interpolation towards the centre of the tile
/// two steps ahead, plus a vertical displacement that decays each iteration
/// and flips sign at the apex, tracing a rise-then-fall arc.
#[derive(Debug, Clone)]
pub struct JumpArc {
    x_increment: f32,
    y_increment: f32,
    delta: f32,
    cumulative_displacement: f32,
    next_displacement: f32,
    start_x: f32,
    start_y: f32,
    iteration: u32,
}

impl JumpArc {
    pub fn new(start: PixelPos, direction: Cardinal, tile_size: i32) -> Self {
        let from = start.to_tile(tile_size);
        let (dx, dy) = direction.vector();
        let landing = from.offset(dx * 2, dy * 2);
        let landing_centre = landing.center_pixel(tile_size);

        Self {
            x_increment: (landing_centre.x - start.x) as f32 / INCREMENT_COUNT as f32,
            y_increment: (landing_centre.y - start.y) as f32 / INCREMENT_COUNT as f32,
            delta: 1.0,
            cumulative_displacement: 0.0,
            next_displacement: (INCREMENT_COUNT / 2) as f32,
            start_x: start.x as f32,
            start_y: start.y as f32,
            iteration: 0,
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Advance one iteration and return the next pixel position, or `None`
    /// once the arc is complete.
    pub fn next_position(&mut self) -> Option<PixelPos> {
        self.iteration += 1;
        if self.iteration > INCREMENT_COUNT {
            return None;
        }
        self.cumulative_displacement += self.next_displacement;
        self.next_displacement -= self.delta;
        if self.next_displacement < 1e-3 {
            // Past the apex: displacement now pulls back down.
            self.next_displacement = -self.delta;
        }
        let x = self.start_x + self.iteration as f32 * self.x_increment;
        let y = self.start_y + self.iteration as f32 * self.y_increment
            - self.cumulative_displacement;
        Some(PixelPos::new(x as i32, y as i32))
    }
}

/// Watches for sustained pressure against a jumpable edge and runs the jump
/// once triggered. Jumps bypass normal collision: each iteration's position
/// is committed directly to the hero.
#[derive(Debug, Default)]
pub struct JumpTracker {
    last_direction: Option<Cardinal>,
    counter: u32,
    active: Option<JumpArc>,
}

impl JumpTracker {
    pub fn is_jumping(&self) -> bool {
        self.active.is_some()
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.last_direction = None;
    }

    /// Call once per tick for the direction the hero pushed in. Probes one
    /// extent beyond the hero's edge; a direction change restarts the
    /// count. The raw jump query is used here - no nudge assistance.
    pub fn check(&mut self, level: &LevelState, direction: Cardinal) {
        let Some(hero) = level.hero() else {
            return;
        };
        let pos = hero.pixel_position();
        let (dx, dy) = direction.vector();
        let edge = pos.offset(dx * EXTENT, dy * EXTENT);
        let probe = edge.offset(dx * WALK_INCREMENT, dy * WALK_INCREMENT);

        if level.can_jump(edge, probe) {
            if self.last_direction != Some(direction) {
                self.counter = 0;
                self.last_direction = Some(direction);
            }
            self.counter += 1;
            if self.counter == JUMP_TRIES {
                self.reset();
                debug!(?direction, x = pos.x, y = pos.y, "jump started");
                self.active = Some(JumpArc::new(pos, direction, level.tile_size()));
            }
        } else {
            self.reset();
        }
    }

    /// Call once per tick while jumping: commits the next arc position to
    /// the hero and lands once the final iteration has run.
    pub fn advance(&mut self, level: &mut LevelState) {
        let tile_size = level.tile_size();
        let Some(arc) = self.active.as_mut() else {
            return;
        };
        if let Some(next) = arc.next_position() {
            if let Some(hero) = level.hero_mut() {
                hero.set_pixel_position(next, tile_size);
            }
        }
        if arc.iteration() >= INCREMENT_COUNT {
            self.active = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TileCoord;

    const TILE_SIZE: i32 = 32;

    #[test]
    fn arc_lands_on_the_tile_two_ahead() {
        let start = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let mut arc = JumpArc::new(start, Cardinal::Right, TILE_SIZE);
        let mut last = start;
        while let Some(position) = arc.next_position() {
            last = position;
        }
        assert_eq!(last, TileCoord::new(7, 5).center_pixel(TILE_SIZE));
    }

    #[test]
    fn arc_rises_then_falls() {
        let start = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let mut arc = JumpArc::new(start, Cardinal::Right, TILE_SIZE);
        let mut heights = Vec::new();
        while let Some(position) = arc.next_position() {
            heights.push(start.y - position.y);
        }
        assert_eq!(heights.len(), INCREMENT_COUNT as usize);
        // Apex at the halfway point, back on the ground at the end.
        let apex = (0..INCREMENT_COUNT as usize)
            .max_by_key(|&index| heights[index])
            .expect("non-empty");
        assert_eq!(apex as u32, INCREMENT_COUNT / 2 - 1);
        assert!(heights[apex] > 0);
        assert_eq!(heights[INCREMENT_COUNT as usize - 1], 0);
    }

    #[test]
    fn arc_reports_completion_after_final_iteration() {
        let start = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let mut arc = JumpArc::new(start, Cardinal::Down, TILE_SIZE);
        for _ in 0..INCREMENT_COUNT {
            assert!(arc.next_position().is_some());
        }
        assert!(arc.next_position().is_none());
    }
}
