//! Map descriptors
//!
//! The on-disk shape of a map: declared dimensions plus per-floor
//! `bottom` (base) and `middle` (overlay) tile rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::loader::DataError;
use crate::world::tile::TileRef;

/// Largest `width * height` a map may declare
pub const MAX_MAP_CELLS: u64 = 4096 * 4096;

/// Tile rows of one layer, indexed `[y][x]`. `None` means no tile.
pub type TileRows = Vec<Vec<Option<TileCell>>>;

/// One cell in a descriptor layer: either a bare id or `{ "tileId": .. }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TileCell {
    Id(String),
    Object {
        #[serde(rename = "tileId")]
        tile_id: String,
    },
}

impl TileCell {
    pub fn id(&self) -> &str {
        match self {
            TileCell::Id(id) => id,
            TileCell::Object { tile_id } => tile_id,
        }
    }

    /// Empty ids mean "no tile"
    pub fn to_tile_ref(&self) -> Option<TileRef> {
        let id = self.id().trim();
        if id.is_empty() {
            None
        } else {
            Some(TileRef::new(id))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartPos {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub z: i32,
}

/// Static layers of one floor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayers {
    #[serde(default)]
    pub bottom: TileRows,
    #[serde(default)]
    pub middle: TileRows,
}

/// A map as supplied by the map-loading side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescriptor {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub dimensions: Dimensions,
    /// Floor index (as a string key) to layers
    #[serde(default)]
    pub levels: BTreeMap<String, LevelLayers>,
    #[serde(default)]
    pub start_pos: Option<StartPos>,
}

impl MapDescriptor {
    /// Check declared dimensions and floor keys
    pub fn validate(&self) -> Result<(), DataError> {
        let Dimensions { width, height } = self.dimensions;
        if width < 0 || height < 0 {
            return Err(DataError::InvalidMap {
                reason: format!("negative dimensions {}x{}", width, height),
            });
        }
        if width as u64 * height as u64 > MAX_MAP_CELLS {
            return Err(DataError::InvalidMap {
                reason: format!("{}x{} exceeds {} cells", width, height, MAX_MAP_CELLS),
            });
        }
        if let Some(key) = self.levels.keys().find(|key| key.trim().parse::<i32>().is_err()) {
            return Err(DataError::InvalidMap {
                reason: format!("level key '{}' is not a floor index", key),
            });
        }
        Ok(())
    }

    /// Tile at `[y][x]` of a layer, tolerating ragged or short rows
    pub fn cell(rows: &[Vec<Option<TileCell>>], x: i32, y: i32) -> Option<TileRef> {
        if x < 0 || y < 0 {
            return None;
        }
        rows.get(y as usize)?
            .get(x as usize)?
            .as_ref()
            .and_then(TileCell::to_tile_ref)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
