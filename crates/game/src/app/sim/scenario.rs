/// Built-in demo content: a small field map with a wall to route around,
/// one talkative NPC and a teleport pad. The JSON goes through the same
/// deserialization path as external map files.
const DEMO_SCENARIO: &str = r#"{
    "seed": 1807,
    "ticks": 400,
    "viewport": {"width_tiles": 15, "height_tiles": 10},
    "tile_size": 32,
    "tileset": {
        "masks": [0, 63, 2, 1],
        "animated": [3]
    },
    "map": {
        "header": {
            "name": "meadowgate",
            "tileset": "field",
            "kind": "town",
            "start": {"x": 1, "y": 1}
        },
        "width": 10,
        "height": 8,
        "base": [
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 1, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 1, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
            0, 0, 0, 0, 0, 0, 0, 0, 0, 0
        ],
        "overlays": [],
        "npcs": [
            {"x": 6, "y": 2, "speech": ["Mind the old wall, traveller."]}
        ],
        "actions": [
            {"source": {"x": 0, "y": 7}, "kind": "teleport", "map": "meadowgate", "destination": {"x": 1, "y": 1}}
        ]
    }
}"#;

#[derive(Debug, Deserialize)]
struct Scenario {
    seed: u64,
    ticks: u32,
    viewport: ViewportConfig,
    tile_size: i32,
    tileset: TilesetDescriptor,
    map: MapDefinition,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct ViewportConfig {
    width_tiles: i32,
    height_tiles: i32,
}

impl ViewportConfig {
    fn to_viewport(self) -> Viewport {
        Viewport {
            width_tiles: self.width_tiles,
            height_tiles: self.height_tiles,
        }
    }
}

fn load_demo_scenario() -> Result<Scenario, String> {
    let mut deserializer = serde_json::Deserializer::from_str(DEMO_SCENARIO);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|error| format!("demo scenario is invalid: {error}"))
}

/// Run the demo headless: order the hero across the map via pathfinding,
/// then keep walking right once the path is consumed.
pub(crate) fn run_demo() -> Result<(), String> {
    let scenario = load_demo_scenario()?;
    let level = LevelState::from_definition(
        &scenario.map,
        scenario.tileset.into_rules(),
        scenario.tile_size,
        None,
    )
    .map_err(|error| format!("failed to build level: {error}"))?;

    let mut session = Session::new(level, scenario.viewport.to_viewport(), scenario.seed);
    let target = TileCoord::new(8, 6).center_pixel(scenario.tile_size);
    session.order_move_to(target);

    for tick_index in 0..scenario.ticks {
        let intents = if session.hero_path.is_empty() {
            MoveIntents {
                right: true,
                ..MoveIntents::none()
            }
        } else {
            MoveIntents::none()
        };
        let events = session.tick(intents);
        if let Some((_, line)) = events.speech {
            info!(%line, "npc speaks");
        }
        if let Some(request) = events.teleport {
            info!(map = %request.map, "teleport requested");
        }
        if tick_index % 100 == 0 {
            if let Some(tile) = session.hero_tile() {
                debug!(tick = tick_index, x = tile.x, y = tile.y, "hero position");
            }
        }
    }

    let Some(tile) = session.hero_tile() else {
        return Err("hero disappeared during the demo".to_string());
    };
    info!(map = %session.level().name(), x = tile.x, y = tile.y, "demo finished");
    Ok(())
}
