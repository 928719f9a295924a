impl Session {
    /// One movement step for the hero: resolve the move (with nudging),
    /// then run the jump and shove checks for that direction. Jump and
    /// shove probe the raw collision queries, so they are deliberately
    /// harder to satisfy than walking.
    fn move_hero(&mut self, direction: Cardinal) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let hero_id = hero.id();
        let pos = hero.pixel_position();
        let (dx, dy) = direction.vector();
        let desired = pos.offset(dx * WALK_INCREMENT, dy * WALK_INCREMENT);

        try_move(&mut self.level, hero_id, desired, direction);
        self.jump.check(&self.level, direction);
        self.check_shove(direction);
    }

    /// If the ground one step past the hero's edge is walkable but an NPC
    /// stands there, lean on it.
    fn check_shove(&mut self, direction: Cardinal) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let hero_id = hero.id();
        let pos = hero.pixel_position();
        let (dx, dy) = direction.vector();
        let edge = pos.offset(dx * EXTENT, dy * EXTENT);
        let probe = edge.offset(dx * WALK_INCREMENT, dy * WALK_INCREMENT);

        if !self
            .level
            .can_move(edge, probe, hero_id, true, true)
            .is_allowed()
        {
            return;
        }
        let Some(target) = self.level.sprite_id_at_pixel(probe) else {
            return;
        };
        if let Some(agent) = self.npcs.iter_mut().find(|agent| agent.sprite == target) {
            agent.shove(&mut self.level);
        }
    }

    /// The action button: if the hero faces an adjacent, reachable, idle
    /// NPC, turn it towards the hero and surface its first speech line.
    fn context_action(&mut self, events: &mut TickEvents) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let hero_id = hero.id();
        let tile_size = self.level.tile_size();
        let hero_pos = hero.pixel_position();
        let hero_tile = hero.tile_position(tile_size);
        let (dx, dy) = hero.direction().vector();

        let candidate = hero_pos.offset(dx * tile_size, dy * tile_size);
        if !self
            .level
            .can_move(hero_pos, candidate, hero_id, true, true)
            .is_allowed()
        {
            return;
        }

        let target_tile = hero_tile.offset(dx, dy);
        let Some(agent_index) = self.npcs.iter().position(|agent| {
            !agent.is_walking()
                && self
                    .level
                    .sprite(agent.sprite)
                    .is_some_and(|sprite| sprite.is_occupying(target_tile))
        }) else {
            return;
        };

        let sprite_id = self.npcs[agent_index].sprite;
        let npc_tile = self.npcs[agent_index].tile();
        let to_hero_x = hero_tile.x - npc_tile.x;
        let to_hero_y = hero_tile.y - npc_tile.y;
        let facing = if to_hero_x.abs() > to_hero_y.abs() {
            if to_hero_x < 0 {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if to_hero_y < 0 {
            Direction::Up
        } else {
            Direction::Down
        };
        if let Some(sprite) = self.level.sprite_mut(sprite_id) {
            sprite.set_direction(facing);
        }

        let line = self
            .level
            .sprite(sprite_id)
            .and_then(|sprite| sprite.speech().first().cloned());
        if let Some(line) = line {
            events.speech = Some((sprite_id, line));
        }
    }
}
