/// Resolved movement intents for one tick. The simulation never sees input
/// devices, only these booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct MoveIntents {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    /// Running doubles the movement steps taken this tick.
    run: bool,
    /// Context action: talk to whatever the hero is facing.
    action: bool,
}

impl MoveIntents {
    fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TeleportRequest {
    map: String,
    destination: TileCoord,
}

/// What a tick surfaced to the surrounding driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TickEvents {
    teleport: Option<TeleportRequest>,
    speech: Option<(SpriteId, String)>,
}

/// Waypoint queue filled by one pathfinding call and consumed by the
/// movement layer one tile at a time.
#[derive(Debug, Clone, Default)]
struct WalkPath {
    waypoints: VecDeque<TileCoord>,
}

impl WalkPath {
    fn set(&mut self, tiles: Vec<TileCoord>) {
        self.waypoints = tiles.into();
    }

    fn clear(&mut self) {
        self.waypoints.clear();
    }

    fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    fn front(&self) -> Option<TileCoord> {
        self.waypoints.front().copied()
    }

    fn advance(&mut self) {
        self.waypoints.pop_front();
    }
}
