use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::geometry::TileCoord;

use super::actions::MapTrigger;
use super::tilemap::{TileLayer, TileLayerError};

/// Maps carry one dense base layer plus at most this many sparse overlays.
pub const MAX_OVERLAY_LAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapKind {
    Overworld,
    Town,
    Cave,
    Interior,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapHeader {
    pub name: String,
    pub tileset: String,
    pub kind: MapKind,
    /// Tile the hero starts on when the map is entered without a teleport
    /// destination.
    pub start: TileCoord,
    /// Layer the hero starts on.
    #[serde(default)]
    pub start_layer: usize,
}

/// One explicit cell of a sparse overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SparseTile {
    pub x: i32,
    pub y: i32,
    pub tile: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SparseLayer {
    pub tiles: Vec<SparseTile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NpcSpawn {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub layer: usize,
    /// Fixed NPCs never wander and cannot be shoved.
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub speech: Vec<String>,
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read map file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Layer(#[from] TileLayerError),
    #[error("map has {actual} overlay layers, at most {MAX_OVERLAY_LAYERS} are supported")]
    TooManyOverlays { actual: usize },
    #[error("start layer {layer} is outside the {layers} map layers")]
    StartLayerOutOfRange { layer: usize, layers: usize },
    #[error("start tile ({x}, {y}) is outside the {width}x{height} map")]
    StartOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// A complete, not-yet-installed map: everything needed to build fresh
/// runtime state. Loading produces this in full before any live state is
/// touched, so a failed load never leaves a half-built level behind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapDefinition {
    pub header: MapHeader,
    pub width: i32,
    pub height: i32,
    /// Dense base layer, row-major, `width * height` entries.
    pub base: Vec<i32>,
    #[serde(default)]
    pub overlays: Vec<SparseLayer>,
    #[serde(default)]
    pub npcs: Vec<NpcSpawn>,
    #[serde(default)]
    pub actions: Vec<MapTrigger>,
}

impl MapDefinition {
    pub fn from_json(text: &str) -> Result<Self, MapLoadError> {
        let definition: MapDefinition = serde_json::from_str(text)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn from_file(path: &Path) -> Result<Self, MapLoadError> {
        let text = fs::read_to_string(path).map_err(|source| MapLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn layer_count(&self) -> usize {
        1 + self.overlays.len()
    }

    /// Build the runtime layer stack: the dense base plus each sparse
    /// overlay expanded over a sentinel-filled grid.
    pub fn build_layers(&self) -> Result<Vec<TileLayer>, MapLoadError> {
        let mut layers = Vec::with_capacity(self.layer_count());
        layers.push(TileLayer::new(self.width, self.height, self.base.clone())?);
        for overlay in &self.overlays {
            let mut layer = TileLayer::empty(self.width, self.height)?;
            for entry in &overlay.tiles {
                layer.set_tile(entry.x, entry.y, entry.tile)?;
            }
            layers.push(layer);
        }
        Ok(layers)
    }

    fn validate(&self) -> Result<(), MapLoadError> {
        if self.overlays.len() > MAX_OVERLAY_LAYERS {
            return Err(MapLoadError::TooManyOverlays {
                actual: self.overlays.len(),
            });
        }
        let expected = self.width.max(0) as usize * self.height.max(0) as usize;
        if self.width <= 0 || self.height <= 0 || self.base.len() != expected {
            return Err(MapLoadError::Layer(TileLayerError::TileCountMismatch {
                expected,
                actual: self.base.len(),
            }));
        }
        if self.header.start_layer >= self.layer_count() {
            return Err(MapLoadError::StartLayerOutOfRange {
                layer: self.header.start_layer,
                layers: self.layer_count(),
            });
        }
        let start = self.header.start;
        if start.x < 0 || start.y < 0 || start.x >= self.width || start.y >= self.height {
            return Err(MapLoadError::StartOutOfBounds {
                x: start.x,
                y: start.y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}
