use thiserror::Error;
use tracing::info;

use crate::geometry::{PixelPos, TileCoord};
use crate::map::{
    CollisionRules, MapAction, MapDefinition, MapKind, MapLoadError, MapTrigger, MoveResult,
    TileLayer, EMPTY_TILE,
};

use super::sprite::{Sprite, SpriteId, SpriteKind};

#[derive(Debug, Error)]
pub enum LevelError {
    #[error("a level needs at least one tile layer")]
    NoLayers,
    #[error("layer {index} is {actual_width}x{actual_height}, expected {width}x{height}")]
    LayerSizeMismatch {
        index: usize,
        actual_width: i32,
        actual_height: i32,
        width: i32,
        height: i32,
    },
    #[error("tile size must be positive, got {0}")]
    InvalidTileSize(i32),
    #[error(transparent)]
    Load(#[from] MapLoadError),
}

/// All mutable state of the currently loaded map: the layer stack, the
/// collision rules, every sprite and the action triggers. Owned by the
/// simulation driver and passed by reference to the movement, jump and
/// pathfinding systems; replaced wholesale when a new map is installed.
#[derive(Debug, Clone)]
pub struct LevelState {
    name: String,
    kind: MapKind,
    tile_size: i32,
    layers: Vec<TileLayer>,
    rules: CollisionRules,
    sprites: Vec<Sprite>,
    hero: Option<SpriteId>,
    triggers: Vec<MapTrigger>,
    next_sprite_id: u64,
    clip_disabled: bool,
}

impl LevelState {
    pub fn new(
        name: impl Into<String>,
        kind: MapKind,
        tile_size: i32,
        layers: Vec<TileLayer>,
        rules: CollisionRules,
    ) -> Result<Self, LevelError> {
        if tile_size <= 0 {
            return Err(LevelError::InvalidTileSize(tile_size));
        }
        let Some(base) = layers.first() else {
            return Err(LevelError::NoLayers);
        };
        let (width, height) = (base.width(), base.height());
        for (index, layer) in layers.iter().enumerate() {
            if layer.width() != width || layer.height() != height {
                return Err(LevelError::LayerSizeMismatch {
                    index,
                    actual_width: layer.width(),
                    actual_height: layer.height(),
                    width,
                    height,
                });
            }
        }
        Ok(Self {
            name: name.into(),
            kind,
            tile_size,
            layers,
            rules,
            sprites: Vec::new(),
            hero: None,
            triggers: Vec::new(),
            next_sprite_id: 0,
            clip_disabled: false,
        })
    }

    /// Build a fully populated level from a parsed map definition. Nothing
    /// is shared with any previous level; the caller swaps the result in
    /// once it exists, so a failure here leaves the old state untouched.
    pub fn from_definition(
        definition: &MapDefinition,
        rules: CollisionRules,
        tile_size: i32,
        start_override: Option<TileCoord>,
    ) -> Result<Self, LevelError> {
        let layers = definition.build_layers()?;
        let mut level = Self::new(
            definition.header.name.clone(),
            definition.header.kind,
            tile_size,
            layers,
            rules,
        )?;
        level.triggers = definition.actions.clone();

        let start = start_override.unwrap_or(definition.header.start);
        level.spawn_hero(start, definition.header.start_layer);
        for npc in &definition.npcs {
            level.spawn_npc(
                TileCoord::new(npc.x, npc.y),
                npc.layer,
                npc.fixed,
                npc.speech.clone(),
            );
        }
        info!(
            map = %level.name,
            layers = level.layers.len(),
            npcs = definition.npcs.len(),
            "level built"
        );
        Ok(level)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MapKind {
        self.kind
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn width_tiles(&self) -> i32 {
        self.layers[0].width()
    }

    pub fn height_tiles(&self) -> i32 {
        self.layers[0].height()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Debug escape hatch: when set, movement commits any requested
    /// position without collision checks.
    pub fn clip_disabled(&self) -> bool {
        self.clip_disabled
    }

    pub fn set_clip_disabled(&mut self, disabled: bool) {
        self.clip_disabled = disabled;
    }

    pub fn spawn_hero(&mut self, tile: TileCoord, layer_index: usize) -> SpriteId {
        let id = self.spawn(SpriteKind::Hero, tile, layer_index);
        self.hero = Some(id);
        id
    }

    pub fn spawn_npc(
        &mut self,
        tile: TileCoord,
        layer_index: usize,
        fixed: bool,
        speech: Vec<String>,
    ) -> SpriteId {
        let id = self.spawn(SpriteKind::Npc { fixed }, tile, layer_index);
        if let Some(sprite) = self.sprite_mut(id) {
            sprite.set_speech(speech);
        }
        id
    }

    fn spawn(&mut self, kind: SpriteKind, tile: TileCoord, layer_index: usize) -> SpriteId {
        let id = SpriteId(self.next_sprite_id);
        self.next_sprite_id = self.next_sprite_id.saturating_add(1);
        let mut sprite = Sprite::new(id, kind, layer_index);
        sprite.set_pixel_position(tile.center_pixel(self.tile_size), self.tile_size);
        self.sprites.push(sprite);
        id
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn sprite(&self, id: SpriteId) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.id() == id)
    }

    pub fn sprite_mut(&mut self, id: SpriteId) -> Option<&mut Sprite> {
        self.sprites.iter_mut().find(|sprite| sprite.id() == id)
    }

    pub fn hero_id(&self) -> Option<SpriteId> {
        self.hero
    }

    pub fn hero(&self) -> Option<&Sprite> {
        self.hero.and_then(|id| self.sprite(id))
    }

    pub fn hero_mut(&mut self) -> Option<&mut Sprite> {
        let id = self.hero?;
        self.sprite_mut(id)
    }

    pub fn trigger_at(&self, tile: TileCoord) -> Option<&MapAction> {
        self.triggers
            .iter()
            .find(|trigger| trigger.source == tile)
            .map(|trigger| &trigger.action)
    }

    /// Is any sprite claiming this tile? `layer_filter` restricts the check
    /// to sprites on that layer, the ignore flags skip the hero or all NPCs.
    pub fn is_tile_occupied(
        &self,
        tile: TileCoord,
        layer_filter: Option<usize>,
        ignore_hero: bool,
        ignore_npcs: bool,
    ) -> bool {
        for sprite in &self.sprites {
            if ignore_hero && Some(sprite.id()) == self.hero {
                continue;
            }
            if ignore_npcs && sprite.kind().is_npc() {
                continue;
            }
            if let Some(layer) = layer_filter {
                if sprite.layer_index() != layer {
                    continue;
                }
            }
            if sprite.is_occupying(tile) {
                return true;
            }
        }
        false
    }

    pub fn sprite_at_tile(&self, tile: TileCoord) -> Option<&Sprite> {
        self.sprites.iter().find(|sprite| sprite.is_occupying(tile))
    }

    pub fn sprite_id_at_pixel(&self, pixel: PixelPos) -> Option<SpriteId> {
        self.sprite_at_tile(pixel.to_tile(self.tile_size))
            .map(Sprite::id)
    }

    /// Movement query for the hero: the hero's own claims are ignored, NPC
    /// claims still block.
    pub fn can_hero_move(&self, from: PixelPos, to: PixelPos) -> MoveResult {
        let Some(hero) = self.hero else {
            return MoveResult::Blocked;
        };
        self.can_move(from, to, hero, true, false)
    }

    /// Movement query for any sprite, aggregated over every layer at or
    /// below the mover's layer. The worst result wins, except that a real
    /// (non-sentinel) tile on the mover's own layer that permits the move
    /// overrides the layers underneath - that is what lets a bridge span
    /// unwalkable water.
    pub fn can_move(
        &self,
        from: PixelPos,
        to: PixelPos,
        mover: SpriteId,
        ignore_hero: bool,
        ignore_npcs: bool,
    ) -> MoveResult {
        let Some(sprite) = self.sprite(mover) else {
            return MoveResult::Blocked;
        };
        let layer_index = sprite.layer_index();
        let to_tile = to.to_tile(self.tile_size);

        if self.is_tile_occupied(to_tile, Some(layer_index), ignore_hero, ignore_npcs) {
            return MoveResult::Blocked;
        }

        let Some(top) = self.layers.get(layer_index) else {
            return MoveResult::Blocked;
        };
        let Some(tile_to) = top.tile_at(to_tile.x, to_tile.y) else {
            return MoveResult::Blocked;
        };

        let top_result = top.can_move_between(&self.rules, self.tile_size, from, to);
        if top_result != MoveResult::Blocked && tile_to != EMPTY_TILE {
            return top_result;
        }

        let mut aggregate = MoveResult::Allowed;
        for (index, layer) in self.layers.iter().enumerate().take(layer_index + 1) {
            let result = if index == layer_index {
                top_result
            } else {
                layer.can_move_between(&self.rules, self.tile_size, from, to)
            };
            match result {
                MoveResult::Blocked => return MoveResult::Blocked,
                MoveResult::Allowed => {}
                diagonal => aggregate = diagonal,
            }
        }
        aggregate
    }

    /// Jump query for the hero: any layer at or below the hero's layer that
    /// reports a jumpable gap makes the jump possible.
    pub fn can_jump(&self, from: PixelPos, to: PixelPos) -> bool {
        let Some(hero) = self.hero() else {
            return false;
        };
        let layer_index = hero.layer_index();
        self.layers
            .iter()
            .take(layer_index + 1)
            .any(|layer| layer.can_jump_between(&self.rules, self.tile_size, from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::BlockMask;

    const TILE_SIZE: i32 = 32;

    fn open_rules() -> CollisionRules {
        CollisionRules::new(
            vec![
                BlockMask::default(),
                BlockMask::ALL,
                BlockMask::RIGHT,
                BlockMask::LEFT,
            ],
            &[],
        )
    }

    fn open_level() -> LevelState {
        let layer = TileLayer::new(10, 10, vec![0; 100]).expect("layer");
        LevelState::new("test", MapKind::Overworld, TILE_SIZE, vec![layer], open_rules())
            .expect("level")
    }

    #[test]
    fn hero_movement_ignores_own_claims() {
        let mut level = open_level();
        level.spawn_hero(TileCoord::new(5, 5), 0);
        let from = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let to = from.offset(2, 0);
        assert_eq!(level.can_hero_move(from, to), MoveResult::Allowed);
    }

    #[test]
    fn npc_claims_block_the_hero() {
        let mut level = open_level();
        level.spawn_hero(TileCoord::new(5, 5), 0);
        level.spawn_npc(TileCoord::new(6, 5), 0, true, Vec::new());
        let from = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let to = TileCoord::new(6, 5).center_pixel(TILE_SIZE);
        assert_eq!(level.can_hero_move(from, to), MoveResult::Blocked);
    }

    #[test]
    fn occupancy_filter_respects_layers() {
        let mut level = {
            let base = TileLayer::new(10, 10, vec![0; 100]).expect("layer");
            let overlay = TileLayer::empty(10, 10).expect("overlay");
            LevelState::new(
                "layers",
                MapKind::Town,
                TILE_SIZE,
                vec![base, overlay],
                open_rules(),
            )
            .expect("level")
        };
        level.spawn_hero(TileCoord::new(5, 5), 0);
        let npc = level.spawn_npc(TileCoord::new(6, 5), 1, true, Vec::new());
        assert!(level
            .sprite(npc)
            .expect("npc")
            .is_occupying(TileCoord::new(6, 5)));

        // The NPC sits on layer 1; a layer-0 hero is not blocked by it.
        let from = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        let to = TileCoord::new(6, 5).center_pixel(TILE_SIZE);
        assert_eq!(level.can_hero_move(from, to), MoveResult::Allowed);
    }

    #[test]
    fn bridge_layer_overrides_water_below() {
        // Base layer holds unwalkable water at (5,5); the overlay carries an
        // open bridge tile there and on the approach.
        let mut base_tiles = vec![0; 100];
        base_tiles[5 * 10 + 5] = 1;
        let base = TileLayer::new(10, 10, base_tiles).expect("base");
        let mut overlay = TileLayer::empty(10, 10).expect("overlay");
        overlay.set_tile(4, 5, 0).expect("in bounds");
        overlay.set_tile(5, 5, 0).expect("in bounds");
        let mut level = LevelState::new(
            "bridge",
            MapKind::Overworld,
            TILE_SIZE,
            vec![base, overlay],
            open_rules(),
        )
        .expect("level");
        level.spawn_hero(TileCoord::new(4, 5), 1);

        let from = TileCoord::new(4, 5).center_pixel(TILE_SIZE);
        let to = TileCoord::new(5, 5).center_pixel(TILE_SIZE);
        assert_eq!(level.can_hero_move(from, to), MoveResult::Allowed);

        // Drop the hero to the base layer: the water now blocks.
        level.hero_mut().expect("hero").set_layer_index(0);
        assert_eq!(level.can_hero_move(from, to), MoveResult::Blocked);
    }

    #[test]
    fn sprite_lookup_by_tile_and_pixel() {
        let mut level = open_level();
        level.spawn_hero(TileCoord::new(5, 5), 0);
        let npc = level.spawn_npc(TileCoord::new(2, 2), 0, false, Vec::new());
        assert_eq!(
            level.sprite_at_tile(TileCoord::new(2, 2)).map(Sprite::id),
            Some(npc)
        );
        let probe = TileCoord::new(2, 2).center_pixel(TILE_SIZE);
        assert_eq!(level.sprite_id_at_pixel(probe), Some(npc));
        assert_eq!(level.sprite_at_tile(TileCoord::new(9, 9)).map(Sprite::id), None);
    }

    #[test]
    fn mismatched_layer_sizes_are_rejected() {
        let base = TileLayer::new(10, 10, vec![0; 100]).expect("base");
        let narrow = TileLayer::new(9, 10, vec![0; 90]).expect("narrow");
        let result = LevelState::new(
            "broken",
            MapKind::Cave,
            TILE_SIZE,
            vec![base, narrow],
            open_rules(),
        );
        assert!(matches!(
            result,
            Err(LevelError::LayerSizeMismatch { index: 1, .. })
        ));
    }
}
