use crate::geometry::{Direction, PixelPos, TileCoord};

/// Upper bound on tiles a single sprite can claim at once. Sprites normally
/// claim one tile, transiently two while crossing a boundary.
pub const MAX_OCCUPY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpriteId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Hero,
    Npc { fixed: bool },
}

impl SpriteKind {
    pub fn is_hero(self) -> bool {
        matches!(self, SpriteKind::Hero)
    }

    pub fn is_npc(self) -> bool {
        matches!(self, SpriteKind::Npc { .. })
    }
}

/// A character on the map: the hero or an NPC. Holds the authoritative
/// pixel position and the set of tile coordinates the sprite currently
/// claims. Claims are explicit - they are not derived from the pixel
/// position except through `set_pixel_position`.
#[derive(Debug, Clone)]
pub struct Sprite {
    id: SpriteId,
    kind: SpriteKind,
    pixel: PixelPos,
    direction: Direction,
    layer_index: usize,
    occupied: Vec<TileCoord>,
    speech: Vec<String>,
}

impl Sprite {
    pub(crate) fn new(id: SpriteId, kind: SpriteKind, layer_index: usize) -> Self {
        Self {
            id,
            kind,
            pixel: PixelPos::default(),
            direction: Direction::Down,
            layer_index,
            occupied: Vec::with_capacity(MAX_OCCUPY),
            speech: Vec::new(),
        }
    }

    pub fn id(&self) -> SpriteId {
        self.id
    }

    pub fn kind(&self) -> SpriteKind {
        self.kind
    }

    pub fn layer_index(&self) -> usize {
        self.layer_index
    }

    pub fn set_layer_index(&mut self, layer_index: usize) {
        self.layer_index = layer_index;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = direction;
    }

    pub fn pixel_position(&self) -> PixelPos {
        self.pixel
    }

    pub fn tile_position(&self, tile_size: i32) -> TileCoord {
        self.pixel.to_tile(tile_size)
    }

    /// Move the sprite and reset its claims to the containing tile. This is
    /// the normal position update for hero walking, jumping and teleports.
    pub fn set_pixel_position(&mut self, pixel: PixelPos, tile_size: i32) {
        self.occupied.clear();
        self.pixel = pixel;
        self.occupy(pixel.to_tile(tile_size));
    }

    /// Update the pixel position without touching tile claims. Used by NPC
    /// walking, which claims the destination tile ahead of the crossing and
    /// releases the source tile afterwards.
    pub fn move_pixel(&mut self, pixel: PixelPos) {
        self.pixel = pixel;
    }

    pub fn is_occupying(&self, tile: TileCoord) -> bool {
        self.occupied.contains(&tile)
    }

    /// Claim a tile. Claiming an already-claimed tile is a no-op.
    pub fn occupy(&mut self, tile: TileCoord) {
        if !self.is_occupying(tile) && self.occupied.len() < MAX_OCCUPY {
            self.occupied.push(tile);
        }
    }

    /// Release a tile. Releasing an unclaimed tile is a no-op.
    pub fn deoccupy(&mut self, tile: TileCoord) {
        if let Some(found) = self.occupied.iter().position(|&claimed| claimed == tile) {
            self.occupied.remove(found);
        }
    }

    pub fn occupied_tiles(&self) -> &[TileCoord] {
        &self.occupied
    }

    pub fn speech(&self) -> &[String] {
        &self.speech
    }

    pub(crate) fn set_speech(&mut self, speech: Vec<String>) {
        self.speech = speech;
    }
}
