use serde::{Deserialize, Serialize};

/// A position in tile units. Equality and hashing are by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Pixel position of this tile's centre point. The extra +1 keeps the
    /// centre strictly inside the tile for even tile sizes.
    pub fn center_pixel(self, tile_size: i32) -> PixelPos {
        PixelPos {
            x: self.x * tile_size + (tile_size >> 1) + 1,
            y: self.y * tile_size + (tile_size >> 1) + 1,
        }
    }

    /// Pixel position of this tile's top-left corner.
    pub fn origin_pixel(self, tile_size: i32) -> PixelPos {
        PixelPos {
            x: self.x * tile_size,
            y: self.y * tile_size,
        }
    }
}

/// A position in map pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Containing tile via truncating division. Coordinates are expected to
    /// be non-negative; negative positions land in edge tiles and every
    /// collision query on them fails closed.
    pub fn to_tile(self, tile_size: i32) -> TileCoord {
        TileCoord {
            x: self.x / tile_size,
            y: self.y / tile_size,
        }
    }
}

/// The four movement axes used by collision probing and jumping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinal {
    Left,
    Up,
    Right,
    Down,
}

impl Cardinal {
    pub const ALL: [Cardinal; 4] = [Cardinal::Left, Cardinal::Up, Cardinal::Right, Cardinal::Down];

    pub fn vector(self) -> (i32, i32) {
        match self {
            Cardinal::Left => (-1, 0),
            Cardinal::Up => (0, -1),
            Cardinal::Right => (1, 0),
            Cardinal::Down => (0, 1),
        }
    }
}

/// Facing and path directions. The variant order is load-bearing: the
/// pathfinder expands neighbours in this order, which fixes tie-breaks
/// between equal-cost paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
    UpLeft,
    UpRight,
    DownRight,
    DownLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::UpLeft,
        Direction::UpRight,
        Direction::DownRight,
        Direction::DownLeft,
    ];

    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
            Direction::UpLeft => (-1, -1),
            Direction::UpRight => (1, -1),
            Direction::DownRight => (1, 1),
            Direction::DownLeft => (-1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        let (dx, dy) = self.vector();
        dx != 0 && dy != 0
    }

    /// Resolve a facing from per-axis movement flags. Combinations favour
    /// diagonals; no movement defaults to facing down.
    pub fn from_points(left: bool, right: bool, up: bool, down: bool) -> Direction {
        if up && left {
            Direction::UpLeft
        } else if up && right {
            Direction::UpRight
        } else if down && left {
            Direction::DownLeft
        } else if down && right {
            Direction::DownRight
        } else if left {
            Direction::Left
        } else if right {
            Direction::Right
        } else if up {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}

impl From<Cardinal> for Direction {
    fn from(cardinal: Cardinal) -> Self {
        match cardinal {
            Cardinal::Left => Direction::Left,
            Cardinal::Up => Direction::Up,
            Cardinal::Right => Direction::Right,
            Cardinal::Down => Direction::Down,
        }
    }
}
