//! Built-in tile definitions
//!
//! Used when no tile catalog file is available, and as the secondary
//! catalog behind a loaded one.

use crate::world::tile::{TileDef, TileDefs};

/// Create the default tile catalog
pub fn default_tile_defs() -> TileDefs {
    TileDefs::new()
        // Ground
        .with("floor", TileDef::new("Floor", ["floor"]))
        .with("grass", TileDef::new("Grass", ["landscape", "floor"]))
        .with("air", TileDef::new("Open Air", Vec::<String>::new()))
        // Walls and doors
        .with("wall", TileDef::new("Wall", ["wall", "impassable", "blocks_vision"]))
        .with(
            "window",
            TileDef::new("Window", ["window", "impassable", "transparent", "allows_vision"]),
        )
        .with("door_closed", TileDef::new("Closed Door", ["door", "impassable", "blocks_vision"]))
        .with("door_open", TileDef::new("Open Door", ["door"]))
        .with("roof", TileDef::new("Roof", ["roof", "solid_terrain_top"]))
        // Level transitions
        .with("stairs_up", TileDef::new("Stairs Up", ["stairs_up"]))
        .with("stairs_down", TileDef::new("Stairs Down", ["stairs_down"]))
        .with("ladder", TileDef::new("Ladder", ["z_transition"]))
        .with("hole", TileDef::new("Hole", ["hole"]))
        .with(
            "cliff_top",
            TileDef::new("Cliff Top", ["landscape", "impassable", "solid_terrain_top"]),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::TileCatalog;

    #[test]
    fn test_defaults_cover_core_tiles() {
        let defs = default_tile_defs();
        for id in ["floor", "wall", "window", "stairs_up", "stairs_down", "hole", "air"] {
            assert!(defs.get(id).is_some(), "missing default tile {}", id);
        }
        assert!(defs.tile_tags("wall").unwrap().has("blocks_vision"));
        assert!(defs.tile_tags("window").unwrap().allows_vision());
        assert!(defs.tile_tags("air").unwrap().is_empty());
    }
}
