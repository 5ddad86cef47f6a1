//! Read-only access to a Tiled JSON map export.
//!
//! Only what the scene needs at startup is modelled: named tile layers with
//! their flat row-major gid arrays. Everything else in the document is
//! ignored.

use serde::Deserialize;

use crate::geometry::TilePos;
use crate::layout::LayoutError;

/// First gid of the "basement" tileset in the HQ map.
pub const BASEMENT_FIRSTGID: u32 = 3377;

/// Gid of the top-left tile of a glass door block.
pub const DOOR_ANCHOR_GID: u32 = BASEMENT_FIRSTGID + 763;

/// Layer holding the glass walls and doors.
pub const DOOR_LAYER: &str = "glass";

#[derive(Debug, Clone, Deserialize)]
pub struct TileMap {
    pub layers: Vec<TileLayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TileLayer {
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// Row-major gids; absent on object layers.
    #[serde(default)]
    pub data: Vec<u32>,
}

impl TileLayer {
    /// Gid at `(col, row)`, or `None` outside the layer. Gid 0 is empty.
    pub fn gid(&self, col: u32, row: u32) -> Option<u32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get((row * self.width + col) as usize).copied()
    }
}

impl TileMap {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(json).map_err(LayoutError::Parse)
    }

    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Every tile in `layer` whose gid is `anchor_gid`, scanned row by row.
    /// A missing layer yields no anchors.
    pub fn find_door_anchors(&self, layer: &str, anchor_gid: u32) -> Vec<TilePos> {
        let Some(layer) = self.layer(layer) else {
            return Vec::new();
        };
        let mut anchors = Vec::new();
        for row in 0..layer.height {
            for col in 0..layer.width {
                if layer.gid(col, row) == Some(anchor_gid) {
                    anchors.push(TilePos(col as i32, row as i32));
                }
            }
        }
        anchors
    }
}
