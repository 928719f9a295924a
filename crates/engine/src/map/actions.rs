use serde::Deserialize;

use crate::geometry::TileCoord;

/// Something that happens when the hero stands on a specific tile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapAction {
    /// Move the hero to another map (possibly the current one).
    Teleport {
        map: String,
        destination: TileCoord,
    },
    /// Move the hero to a different layer of the current map, e.g. walking
    /// up onto a bridge.
    ChangeLayer { layer: usize },
}

/// A map action bound to its source tile. Loaded once per map, immutable,
/// matched against the hero tile every tick.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapTrigger {
    pub source: TileCoord,
    #[serde(flatten)]
    pub action: MapAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_deserialize_tagged_by_kind() {
        let parsed: Vec<MapTrigger> = serde_json::from_str(
            r#"[
                {"source": {"x": 3, "y": 4}, "kind": "teleport", "map": "cavern", "destination": {"x": 1, "y": 1}},
                {"source": {"x": 7, "y": 2}, "kind": "change_layer", "layer": 1}
            ]"#,
        )
        .expect("triggers parse");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].source, TileCoord::new(3, 4));
        assert!(matches!(
            &parsed[0].action,
            MapAction::Teleport { map, destination }
                if map == "cavern" && *destination == TileCoord::new(1, 1)
        ));
        assert!(matches!(parsed[1].action, MapAction::ChangeLayer { layer: 1 }));
    }
}
