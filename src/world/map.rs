//! Map data structure
//!
//! Per-floor tile layers for the active map. Floors are keyed by a signed
//! index: 0 is ground level, negative values are below ground.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tile::TileRef;
use crate::data::MapDescriptor;

/// Position on a single floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Where the observer stands: a position plus a floor index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observer {
    pub x: i32,
    pub y: i32,
    pub floor: i32,
}

impl Observer {
    pub fn new(x: i32, y: i32, floor: i32) -> Self {
        Self { x, y, floor }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

/// Which of the two static layers to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Ground: floors, grass, holes
    Base,
    /// Placed over the base: walls, windows, furniture
    Overlay,
}

/// Result of a bounds-checked tile lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLookup<'a> {
    OutOfBounds,
    Empty,
    Tile(&'a TileRef),
}

impl<'a> TileLookup<'a> {
    pub fn tile(self) -> Option<&'a TileRef> {
        match self {
            TileLookup::Tile(tile) => Some(tile),
            _ => None,
        }
    }

    pub fn is_out_of_bounds(self) -> bool {
        matches!(self, TileLookup::OutOfBounds)
    }

    pub fn is_empty(self) -> bool {
        matches!(self, TileLookup::Empty)
    }
}

/// The two tile layers of one floor, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    base: Vec<Option<TileRef>>,
    overlay: Vec<Option<TileRef>>,
}

impl Level {
    fn empty(cells: usize) -> Self {
        Self {
            base: vec![None; cells],
            overlay: vec![None; cells],
        }
    }

    fn layer(&self, layer: Layer) -> &[Option<TileRef>] {
        match layer {
            Layer::Base => &self.base,
            Layer::Overlay => &self.overlay,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Option<TileRef>> {
        match layer {
            Layer::Base => &mut self.base,
            Layer::Overlay => &mut self.overlay,
        }
    }
}

/// All floors of the active map.
///
/// Every level's layers hold exactly `width * height` cells. Loading a
/// different map builds a fresh grid; nothing is carried over.
#[derive(Debug, Clone, Default)]
pub struct LevelGrid {
    map_id: String,
    width: i32,
    height: i32,
    levels: BTreeMap<i32, Level>,
    start: Option<Observer>,
}

impl LevelGrid {
    /// Create an empty grid with no floors
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            map_id: String::new(),
            width: width.max(0),
            height: height.max(0),
            levels: BTreeMap::new(),
            start: None,
        }
    }

    /// Build a grid from a map descriptor.
    ///
    /// Only the declared `width * height` area is copied. Longer rows or
    /// extra rows in the descriptor are ignored, missing cells are empty.
    pub fn from_descriptor(descriptor: &MapDescriptor) -> Self {
        let mut grid = Self::new(descriptor.dimensions.width, descriptor.dimensions.height);
        grid.map_id = descriptor.id.clone();
        grid.start = descriptor.start_pos.map(|p| Observer::new(p.x, p.y, p.z));

        for (key, layers) in &descriptor.levels {
            let Ok(floor) = key.trim().parse::<i32>() else {
                log::warn!("Skipping level '{}' in map '{}': not a floor index", key, descriptor.id);
                continue;
            };

            let mut level = Level::empty(grid.cell_count());
            for y in 0..grid.height {
                for x in 0..grid.width {
                    let idx = grid.xy_to_idx(x, y);
                    level.base[idx] = MapDescriptor::cell(&layers.bottom, x, y);
                    level.overlay[idx] = MapDescriptor::cell(&layers.middle, x, y);
                }
            }
            grid.levels.insert(floor, level);
        }

        grid
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Start position declared by the map, if any
    pub fn start(&self) -> Option<Observer> {
        self.start
    }

    fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Convert in-bounds 2D coordinates to a 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Check against the declared dimensions
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Add an empty floor, replacing any existing one at that index
    pub fn insert_level(&mut self, floor: i32) {
        let level = Level::empty(self.cell_count());
        self.levels.insert(floor, level);
    }

    /// Add a floor with every base cell set to `tile`
    pub fn insert_filled_level(&mut self, floor: i32, tile: &TileRef) {
        let mut level = Level::empty(self.cell_count());
        level.base.fill(Some(tile.clone()));
        self.levels.insert(floor, level);
    }

    /// Set or clear one cell. Ignored when the floor is missing or the
    /// coordinates fall outside the map.
    pub fn set_tile(&mut self, floor: i32, x: i32, y: i32, layer: Layer, tile: Option<TileRef>) {
        if !self.in_bounds(x, y) {
            return;
        }
        let idx = self.xy_to_idx(x, y);
        if let Some(level) = self.levels.get_mut(&floor) {
            level.layer_mut(layer)[idx] = tile;
        }
    }

    pub fn get_tile(&self, floor: i32, x: i32, y: i32, layer: Layer) -> TileLookup<'_> {
        if !self.in_bounds(x, y) {
            return TileLookup::OutOfBounds;
        }
        let Some(level) = self.levels.get(&floor) else {
            return TileLookup::OutOfBounds;
        };
        match level.layer(layer).get(self.xy_to_idx(x, y)) {
            Some(Some(tile)) => TileLookup::Tile(tile),
            Some(None) => TileLookup::Empty,
            None => TileLookup::OutOfBounds,
        }
    }

    /// Both layers of a cell as `(overlay, base)`, or `None` if the cell
    /// does not exist
    pub fn cell(&self, floor: i32, x: i32, y: i32) -> Option<(Option<&TileRef>, Option<&TileRef>)> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let level = self.levels.get(&floor)?;
        let idx = self.xy_to_idx(x, y);
        Some((level.overlay.get(idx)?.as_ref(), level.base.get(idx)?.as_ref()))
    }

    pub fn has_floor(&self, floor: i32) -> bool {
        self.levels.contains_key(&floor)
    }

    /// Floor indices in ascending order
    pub fn floors(&self) -> impl Iterator<Item = i32> + '_ {
        self.levels.keys().copied()
    }

    pub fn floor_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::maps::{Dimensions, LevelLayers, StartPos, TileCell};

    fn rows(width: usize, height: usize, id: &str) -> Vec<Vec<Option<TileCell>>> {
        vec![vec![Some(TileCell::Id(id.to_string())); width]; height]
    }

    fn descriptor(width: i32, height: i32, physical: usize) -> MapDescriptor {
        let mut levels = BTreeMap::new();
        levels.insert(
            "0".to_string(),
            LevelLayers {
                bottom: rows(physical, physical, "floor"),
                middle: rows(physical, physical, ""),
            },
        );
        MapDescriptor {
            id: "test".to_string(),
            name: None,
            dimensions: Dimensions { width, height },
            levels,
            start_pos: Some(StartPos { x: 1, y: 2, z: 0 }),
        }
    }

    #[test]
    fn test_from_descriptor() {
        let grid = LevelGrid::from_descriptor(&descriptor(4, 3, 4));
        assert_eq!(grid.width(), 4);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.floors().collect::<Vec<_>>(), vec![0]);
        assert_eq!(grid.start(), Some(Observer::new(1, 2, 0)));
        assert_eq!(
            grid.get_tile(0, 3, 2, Layer::Base).tile().map(TileRef::id),
            Some("floor")
        );
        // Empty string is no tile at all
        assert!(grid.get_tile(0, 3, 2, Layer::Overlay).is_empty());
    }

    #[test]
    fn test_declared_dimensions_are_authoritative() {
        // Physical rows are 8x8 but the map declares 5x5
        let grid = LevelGrid::from_descriptor(&descriptor(5, 5, 8));
        assert!(grid.get_tile(0, 4, 4, Layer::Base).tile().is_some());
        assert!(grid.get_tile(0, 5, 4, Layer::Base).is_out_of_bounds());
        assert!(grid.get_tile(0, 7, 7, Layer::Base).is_out_of_bounds());
    }

    #[test]
    fn test_short_rows_are_padded_empty() {
        let grid = LevelGrid::from_descriptor(&descriptor(6, 6, 3));
        assert!(grid.get_tile(0, 2, 2, Layer::Base).tile().is_some());
        assert!(grid.get_tile(0, 5, 5, Layer::Base).is_empty());
    }

    #[test]
    fn test_bad_floor_key_is_skipped() {
        let mut desc = descriptor(2, 2, 2);
        desc.levels.insert("roof".to_string(), LevelLayers::default());
        desc.levels.insert("-1".to_string(), LevelLayers::default());
        let grid = LevelGrid::from_descriptor(&desc);
        assert_eq!(grid.floors().collect::<Vec<_>>(), vec![-1, 0]);
    }

    #[test]
    fn test_missing_floor_and_bounds() {
        let mut grid = LevelGrid::new(3, 3);
        grid.insert_filled_level(0, &TileRef::new("floor"));
        assert!(grid.get_tile(1, 0, 0, Layer::Base).is_out_of_bounds());
        assert!(grid.get_tile(0, -1, 0, Layer::Base).is_out_of_bounds());
        assert!(grid.cell(0, 3, 0).is_none());
        assert!(grid.cell(2, 0, 0).is_none());
    }

    #[test]
    fn test_set_tile() {
        let mut grid = LevelGrid::new(3, 3);
        grid.insert_level(0);
        grid.set_tile(0, 1, 1, Layer::Overlay, Some(TileRef::new("wall")));
        grid.set_tile(0, 9, 9, Layer::Overlay, Some(TileRef::new("wall")));

        let (overlay, base) = grid.cell(0, 1, 1).unwrap();
        assert_eq!(overlay.map(TileRef::id), Some("wall"));
        assert!(base.is_none());
        assert!(grid.get_tile(0, 1, 1, Layer::Base).is_empty());
    }

    #[test]
    fn test_index_of_large_map() {
        let grid = LevelGrid::new(50_000, 50_000);
        assert_eq!(grid.xy_to_idx(49_999, 49_999), 2_499_999_999);
        assert_eq!(grid.cell_count(), 2_500_000_000);
    }

    #[test]
    fn test_negative_dimensions_clamp() {
        let grid = LevelGrid::from_descriptor(&descriptor(-3, 2, 2));
        assert_eq!(grid.width(), 0);
        assert!(grid.get_tile(0, 0, 0, Layer::Base).is_out_of_bounds());
    }
}
