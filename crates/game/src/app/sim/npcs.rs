/// Wander and shove state for one NPC. The tile position here is
/// authoritative while walking; the sprite's pixel position follows the
/// walk offset, and tile claims move one tile ahead of the crossing.
#[derive(Debug, Clone)]
struct NpcAgent {
    sprite: SpriteId,
    x: i32,
    y: i32,
    fixed: bool,
    walking: bool,
    walk_offset: i32,
    facing: Cardinal,
    shoves: u32,
    shoved: bool,
}

impl NpcAgent {
    fn from_level(level: &LevelState) -> Vec<NpcAgent> {
        level
            .sprites()
            .iter()
            .filter(|sprite| sprite.kind().is_npc())
            .map(|sprite| {
                let tile = sprite.tile_position(level.tile_size());
                NpcAgent {
                    sprite: sprite.id(),
                    x: tile.x,
                    y: tile.y,
                    fixed: matches!(sprite.kind(), SpriteKind::Npc { fixed: true }),
                    walking: false,
                    walk_offset: 0,
                    facing: Cardinal::Down,
                    shoves: 0,
                    shoved: false,
                }
            })
            .collect()
    }

    fn tile(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    fn is_walking(&self) -> bool {
        self.walking
    }

    /// One wander tick. An idle NPC occasionally picks a direction and sets
    /// off; a walking NPC advances its offset and, on completing a tile,
    /// releases the tile behind it and decides whether to carry on.
    fn walk(&mut self, level: &mut LevelState, rng: &mut SmallRng) {
        if self.fixed {
            return;
        }

        if !self.walking {
            if rng.random_range(0..NPC_START_WALK_ODDS) != 1 {
                return;
            }
            let direction = match rng.random_range(0..4) {
                0 => Cardinal::Up,
                1 => Cardinal::Down,
                2 => Cardinal::Left,
                _ => Cardinal::Right,
            };
            self.face(level, direction);
            if !self.can_move_in_direction(level, direction) {
                return;
            }
            self.walking = true;
            self.walk_offset = 0;
            let (dx, dy) = direction.vector();
            self.claim(level, TileCoord::new(self.x + dx, self.y + dy));
        }

        self.walk_offset += NPC_WALK_INCREMENT;
        self.update_sprite_pixel(level);

        if self.walk_offset % level.tile_size() == 0 {
            // Finished a whole tile: free the one we came from.
            self.release(level, self.tile());
            let (dx, dy) = self.facing.vector();
            self.x += dx;
            self.y += dy;
            self.walk_offset = 0;
            self.update_sprite_pixel(level);

            // A shoved NPC moves exactly one tile.
            if self.shoved {
                self.shoved = false;
                self.walking = false;
                return;
            }
            if rng.random_range(0..NPC_STOP_WALK_ODDS) == 1 {
                self.walking = false;
                return;
            }
            if self.can_move_in_direction(level, self.facing) {
                let (dx, dy) = self.facing.vector();
                self.claim(level, TileCoord::new(self.x + dx, self.y + dy));
            } else {
                self.walking = false;
            }
        }
    }

    /// Something pressed into one of this NPC's tiles. After enough
    /// consecutive shoves the NPC steps aside into the first free cardinal
    /// direction, tried in a fixed order.
    fn shove(&mut self, level: &mut LevelState) {
        if self.fixed || self.walking {
            return;
        }
        self.shoves += 1;
        if self.shoves < NPC_SHOVE_FRAMES {
            return;
        }
        self.shoves = 0;
        for direction in [
            Cardinal::Up,
            Cardinal::Down,
            Cardinal::Left,
            Cardinal::Right,
        ] {
            self.face(level, direction);
            if self.can_move_in_direction(level, direction) {
                self.walking = true;
                self.walk_offset = 0;
                self.shoved = true;
                let (dx, dy) = direction.vector();
                self.claim(level, TileCoord::new(self.x + dx, self.y + dy));
                break;
            }
        }
    }

    fn face(&mut self, level: &mut LevelState, direction: Cardinal) {
        self.facing = direction;
        if let Some(sprite) = level.sprite_mut(self.sprite) {
            sprite.set_direction(direction.into());
        }
    }

    /// Probe between this NPC's tile centre and the next tile's centre.
    /// NPCs get no nudge assistance and yield to every other occupant,
    /// including the hero.
    fn can_move_in_direction(&self, level: &LevelState, direction: Cardinal) -> bool {
        let tile_size = level.tile_size();
        let half = tile_size / 2;
        let (dx, dy) = direction.vector();
        let current = PixelPos::new(self.x * tile_size + half, self.y * tile_size + half);
        let next = PixelPos::new(
            (self.x + dx) * tile_size + half,
            (self.y + dy) * tile_size + half,
        );
        level
            .can_move(current, next, self.sprite, false, false)
            .is_allowed()
    }

    fn claim(&self, level: &mut LevelState, tile: TileCoord) {
        if let Some(sprite) = level.sprite_mut(self.sprite) {
            sprite.occupy(tile);
        }
    }

    fn release(&self, level: &mut LevelState, tile: TileCoord) {
        if let Some(sprite) = level.sprite_mut(self.sprite) {
            sprite.deoccupy(tile);
        }
    }

    fn update_sprite_pixel(&self, level: &mut LevelState) {
        let tile_size = level.tile_size();
        let (dx, dy) = self.facing.vector();
        let pixel = self
            .tile()
            .center_pixel(tile_size)
            .offset(dx * self.walk_offset, dy * self.walk_offset);
        if let Some(sprite) = level.sprite_mut(self.sprite) {
            sprite.move_pixel(pixel);
        }
    }
}
