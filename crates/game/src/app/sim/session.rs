/// One running simulation: the owned level state, the hero's jump tracker
/// and waypoint queue, and the NPC agents. Everything advances exactly once
/// per `tick` call; rendering reads are expected to happen between ticks.
struct Session {
    level: LevelState,
    jump: JumpTracker,
    hero_path: WalkPath,
    npcs: Vec<NpcAgent>,
    viewport: Viewport,
    rng: SmallRng,
}

impl Session {
    fn new(level: LevelState, viewport: Viewport, seed: u64) -> Self {
        let npcs = NpcAgent::from_level(&level);
        Self {
            level,
            jump: JumpTracker::default(),
            hero_path: WalkPath::default(),
            npcs,
            viewport,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn level(&self) -> &LevelState {
        &self.level
    }

    fn hero_tile(&self) -> Option<TileCoord> {
        self.level
            .hero()
            .map(|hero| hero.tile_position(self.level.tile_size()))
    }

    /// Replace the running level with a freshly built one. The new level is
    /// complete before the swap, so a failed build leaves the current map,
    /// sprites and claims untouched.
    fn install_map(
        &mut self,
        definition: &MapDefinition,
        rules: CollisionRules,
        destination: Option<TileCoord>,
    ) -> Result<(), LevelError> {
        let tile_size = self.level.tile_size();
        let level = LevelState::from_definition(definition, rules, tile_size, destination)?;
        let npcs = NpcAgent::from_level(&level);
        self.level = level;
        self.npcs = npcs;
        self.hero_path.clear();
        self.jump = JumpTracker::default();
        info!(map = %self.level.name(), "map installed");
        Ok(())
    }

    /// A point-and-click movement order: a single pathfinding call fills
    /// the waypoint queue, which subsequent ticks consume.
    fn order_move_to(&mut self, target: PixelPos) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let path = find_path(&self.level, hero.pixel_position(), target, self.viewport);
        debug!(waypoints = path.len(), "movement ordered");
        self.hero_path.set(path);
    }

    /// Advance the simulation one tick: NPCs wander, then either the jump
    /// arc or the input intents drive the hero, then action tiles fire.
    fn tick(&mut self, intents: MoveIntents) -> TickEvents {
        let mut events = TickEvents::default();

        for agent in &mut self.npcs {
            agent.walk(&mut self.level, &mut self.rng);
        }

        if self.jump.is_jumping() {
            self.jump.advance(&mut self.level);
        } else {
            self.perform_input(intents, &mut events);
        }

        self.check_map_actions(&mut events);
        events
    }

    fn perform_input(&mut self, intents: MoveIntents, events: &mut TickEvents) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let old_pos = hero.pixel_position();
        let tile_size = self.level.tile_size();

        let mut move_up = false;
        let mut move_down = false;
        let mut move_left = false;
        let mut move_right = false;

        // Walking along an ordered path: head for the next waypoint centre,
        // dropping it once we are within one step of it on both axes.
        if let Some(next) = self.hero_path.front() {
            let mut target = next.center_pixel(tile_size);
            if (target.x - old_pos.x).abs() < WALK_INCREMENT
                && (target.y - old_pos.y).abs() < WALK_INCREMENT
            {
                self.hero_path.advance();
                if let Some(following) = self.hero_path.front() {
                    target = following.center_pixel(tile_size);
                }
            }
            move_up = target.y < old_pos.y;
            move_down = target.y > old_pos.y;
            move_left = target.x < old_pos.x;
            move_right = target.x > old_pos.x;
        }

        move_up |= intents.up;
        move_down |= intents.down;
        move_left |= intents.left;
        move_right |= intents.right;

        if intents.action {
            self.context_action(events);
        }

        if move_up {
            self.move_hero(Cardinal::Up);
            if intents.run {
                self.move_hero(Cardinal::Up);
            }
        }
        if move_down {
            self.move_hero(Cardinal::Down);
            if intents.run {
                self.move_hero(Cardinal::Down);
            }
        }
        if move_left {
            self.move_hero(Cardinal::Left);
            if intents.run {
                self.move_hero(Cardinal::Left);
            }
        }
        if move_right {
            self.move_hero(Cardinal::Right);
            if intents.run {
                self.move_hero(Cardinal::Right);
            }
        }

        if move_left || move_right || move_up || move_down {
            if let Some(hero) = self.level.hero_mut() {
                hero.set_direction(Direction::from_points(
                    move_left, move_right, move_up, move_down,
                ));
            }
        } else {
            // An idle tick: jump progress does not survive standing still.
            self.jump.reset();
        }
    }

    /// Fire whatever action sits under the hero. Layer changes apply
    /// immediately; teleports are surfaced for the driver to act on, since
    /// installing a map is its call.
    fn check_map_actions(&mut self, events: &mut TickEvents) {
        let Some(hero) = self.level.hero() else {
            return;
        };
        let hero_tile = hero.tile_position(self.level.tile_size());
        let Some(action) = self.level.trigger_at(hero_tile).cloned() else {
            return;
        };
        match action {
            MapAction::Teleport { map, destination } => {
                events.teleport = Some(TeleportRequest { map, destination });
            }
            MapAction::ChangeLayer { layer } => {
                if let Some(hero) = self.level.hero_mut() {
                    hero.set_layer_index(layer);
                }
            }
        }
    }
}
