//! World module
//!
//! Contains the level grid, tiles, fog of war and field of view.

pub mod map;
pub mod tile;
pub mod fog;
pub mod fov;

pub use map::{Layer, LevelGrid, Observer, Position, TileLookup};
pub use tile::{
    FloorOpening, TileCatalog, TileClassifier, TileDef, TileDefs, TileRef, TileTags, TileTraits,
};
pub use fog::{FogGrid, FogOfWar, Visibility};
pub use fov::{cap_radius, compute_fov, MAX_VISION_RADIUS};
