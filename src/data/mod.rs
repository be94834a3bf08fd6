//! Data loading
//!
//! Tile catalogs and map descriptors from external RON/JSON files, with
//! built-in tile definitions as the fallback.

pub mod loader;
pub mod maps;
pub mod tiles;

pub use loader::{load_map_descriptor, load_tile_defs, DataError, DataManager};
pub use maps::{MapDescriptor, TileCell, MAX_MAP_CELLS};
pub use tiles::default_tile_defs;
