//! Data loader
//!
//! Loads the tile catalog from RON and map descriptors from JSON or RON,
//! with fallback to the built-in tile definitions.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::maps::MapDescriptor;
use super::tiles::default_tile_defs;
use crate::world::tile::{SharedCatalog, TileClassifier, TileDefs};

/// Default location of the data files
pub const DEFAULT_DATA_DIR: &str = "assets/data";

/// File name of the tile catalog inside the data directory
pub const TILES_FILE: &str = "tiles.ron";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid map: {reason}")]
    InvalidMap { reason: String },
}

/// Manages the tile catalog
#[derive(Debug, Clone)]
pub struct DataManager {
    /// Tile definitions from disk, or the defaults
    pub tiles: TileDefs,
}

impl DataManager {
    /// Create a new DataManager, loading from the default directory or
    /// using defaults
    pub fn new() -> Self {
        Self::load_from(Path::new(DEFAULT_DATA_DIR))
    }

    /// Load data from a directory, falling back to defaults per file
    pub fn load_from(base_path: &Path) -> Self {
        Self {
            tiles: Self::load_tiles(base_path),
        }
    }

    /// Load tile definitions from RON file
    fn load_tiles(base_path: &Path) -> TileDefs {
        let path = base_path.join(TILES_FILE);
        if path.exists() {
            match load_tile_defs(&path) {
                Ok(defs) => {
                    log::info!("Loaded {} tile definitions from {:?}", defs.len(), path);
                    return defs;
                }
                Err(e) => log::warn!("Failed to load {:?}: {}. Using defaults.", path, e),
            }
        } else {
            log::debug!("No tile catalog at {:?}, using defaults", path);
        }
        default_tile_defs()
    }

    /// Get tile definitions
    pub fn tile_defs(&self) -> &TileDefs {
        &self.tiles
    }

    /// Classifier over the loaded tiles, with the built-in definitions as
    /// the secondary catalog
    pub fn classifier(&self) -> TileClassifier {
        let primary: SharedCatalog = Arc::new(self.tiles.clone());
        let secondary: SharedCatalog = Arc::new(default_tile_defs());
        TileClassifier::with_fallback(Some(primary), Some(secondary))
    }
}

impl Default for DataManager {
    fn default() -> Self {
        Self {
            tiles: default_tile_defs(),
        }
    }
}

/// Read a tile catalog from a RON file
pub fn load_tile_defs(path: &Path) -> Result<TileDefs, DataError> {
    let content = fs::read_to_string(path)?;
    Ok(ron::from_str(&content)?)
}

/// Read and validate a map descriptor. `.ron` files are parsed as RON,
/// anything else as JSON.
pub fn load_map_descriptor(path: &Path) -> Result<MapDescriptor, DataError> {
    let content = fs::read_to_string(path)?;
    let is_ron = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("ron"));

    let descriptor: MapDescriptor = if is_ron {
        ron::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    descriptor.validate()?;
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::{TileCatalog, TileRef};
    use std::path::PathBuf;

    /// Scratch directory unique to one test
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fowcast-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_dir_uses_defaults() {
        let data = DataManager::load_from(Path::new("definitely/not/here"));
        assert_eq!(data.tile_defs(), &default_tile_defs());
    }

    #[test]
    fn test_load_tiles_from_ron() {
        let dir = scratch_dir("tiles");
        fs::write(
            dir.join(TILES_FILE),
            r#"{
                "glass": (name: "Glass", tags: ["impassable", "transparent"]),
                "hedge": (tags: ["blocks_vision"]),
            }"#,
        )
        .unwrap();

        let data = DataManager::load_from(&dir);
        assert_eq!(data.tile_defs().len(), 2);
        assert!(data.tile_defs().tile_tags("hedge").unwrap().has("blocks_vision"));

        // Built-in tiles still resolve through the secondary catalog
        let classifier = data.classifier();
        assert!(classifier.is_blocking_vision(&TileRef::new("hedge")));
        assert!(classifier.is_blocking_vision(&TileRef::new("wall")));
        assert!(!classifier.is_blocking_vision(&TileRef::new("glass")));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_broken_ron_falls_back() {
        let dir = scratch_dir("broken");
        fs::write(dir.join(TILES_FILE), "{ this is not ron").unwrap();

        assert!(matches!(load_tile_defs(&dir.join(TILES_FILE)), Err(DataError::Ron(_))));
        let data = DataManager::load_from(&dir);
        assert_eq!(data.tile_defs(), &default_tile_defs());

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_map_descriptor_json_and_ron() {
        let dir = scratch_dir("maps");
        let json_path = dir.join("room.json");
        fs::write(
            &json_path,
            r#"{"id": "room", "dimensions": {"width": 2, "height": 1},
                "levels": {"0": {"bottom": [["floor", "floor"]], "middle": [["", "wall"]]}}}"#,
        )
        .unwrap();
        let desc = load_map_descriptor(&json_path).unwrap();
        assert_eq!(desc.id, "room");
        assert_eq!(desc.dimensions.width, 2);

        let ron_path = dir.join("room.ron");
        fs::write(
            &ron_path,
            r#"(id: "room_ron", dimensions: (width: 1, height: 1), levels: {"0": (bottom: [[Some("floor")]])})"#,
        )
        .unwrap();
        let desc = load_map_descriptor(&ron_path).unwrap();
        assert_eq!(desc.id, "room_ron");
        assert_eq!(MapDescriptor::cell(&desc.levels["0"].bottom, 0, 0), Some(TileRef::new("floor")));

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_invalid_map_is_rejected() {
        let dir = scratch_dir("invalid");
        let path = dir.join("bad.json");
        fs::write(&path, r#"{"dimensions": {"width": -4, "height": 2}}"#).unwrap();
        assert!(matches!(load_map_descriptor(&path), Err(DataError::InvalidMap { .. })));

        assert!(matches!(
            load_map_descriptor(&dir.join("missing.json")),
            Err(DataError::Io(_))
        ));
        fs::remove_dir_all(dir).ok();
    }
}
