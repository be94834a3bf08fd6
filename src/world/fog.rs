//! Fog of war
//!
//! One visibility grid per floor, always sized to the active map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Visibility of a single cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Hidden,
    Visible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Visibility grid for one floor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FogGrid {
    width: i32,
    height: i32,
    cells: Vec<Visibility>,
}

impl FogGrid {
    /// Create a grid with every cell hidden
    pub fn new(width: i32, height: i32) -> Self {
        let (width, height) = (width.max(0), height.max(0));
        Self {
            width,
            height,
            cells: vec![Visibility::Hidden; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    #[inline]
    fn idx(&self, x: i32, y: i32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Visibility> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map_or(false, Visibility::is_visible)
    }

    /// Mark one cell visible. Returns true if it was hidden before.
    pub fn set_visible(&mut self, x: i32, y: i32) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.idx(x, y);
        let was_hidden = self.cells[idx] == Visibility::Hidden;
        self.cells[idx] = Visibility::Visible;
        was_hidden
    }

    /// Hide every cell
    pub fn reset(&mut self) {
        self.cells.fill(Visibility::Hidden);
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_visible()).count()
    }

    /// Rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Visibility]> {
        // chunk size must be non-zero; an empty grid has no cells to yield
        self.cells.chunks(self.width.max(1) as usize)
    }
}

/// Visibility grids for every floor of the active map
#[derive(Debug, Clone, Default)]
pub struct FogOfWar {
    width: i32,
    height: i32,
    grids: BTreeMap<i32, FogGrid>,
}

impl FogOfWar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every grid and create fresh hidden ones for exactly `floors`,
    /// sized to the new map
    pub fn reallocate_for_map(
        &mut self,
        width: i32,
        height: i32,
        floors: impl IntoIterator<Item = i32>,
    ) {
        let (width, height) = (width.max(0), height.max(0));
        self.grids = floors
            .into_iter()
            .map(|floor| (floor, FogGrid::new(width, height)))
            .collect();
        self.width = width;
        self.height = height;
    }

    /// Hide every cell on one floor. Unknown floors are ignored.
    pub fn reset(&mut self, floor: i32) {
        if let Some(grid) = self.grids.get_mut(&floor) {
            grid.reset();
        }
    }

    /// Hide every cell on every floor
    pub fn reset_all(&mut self) {
        for grid in self.grids.values_mut() {
            grid.reset();
        }
    }

    /// Mark a cell visible. Out-of-bounds cells and unknown floors are a
    /// no-op. Returns true if the cell was hidden before.
    pub fn mark_visible(&mut self, floor: i32, x: i32, y: i32) -> bool {
        self.grids
            .get_mut(&floor)
            .map_or(false, |grid| grid.set_visible(x, y))
    }

    pub fn visibility(&self, floor: i32, x: i32, y: i32) -> Option<Visibility> {
        self.grids.get(&floor)?.get(x, y)
    }

    pub fn is_visible(&self, floor: i32, x: i32, y: i32) -> bool {
        self.visibility(floor, x, y).map_or(false, Visibility::is_visible)
    }

    pub fn grid(&self, floor: i32) -> Option<&FogGrid> {
        self.grids.get(&floor)
    }

    pub fn has_floor(&self, floor: i32) -> bool {
        self.grids.contains_key(&floor)
    }

    /// Floor indices in ascending order
    pub fn floors(&self) -> impl Iterator<Item = i32> + '_ {
        self.grids.keys().copied()
    }

    /// Current `(width, height)`
    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reallocate_creates_hidden_grids() {
        let mut fog = FogOfWar::new();
        fog.reallocate_for_map(4, 3, [0, 1, -1]);

        assert_eq!(fog.dimensions(), (4, 3));
        assert_eq!(fog.floors().collect::<Vec<_>>(), vec![-1, 0, 1]);
        let grid = fog.grid(0).unwrap();
        assert_eq!((grid.width(), grid.height()), (4, 3));
        assert_eq!(grid.visible_count(), 0);
        assert_eq!(grid.rows().count(), 3);
    }

    #[test]
    fn test_reallocate_discards_old_floors() {
        let mut fog = FogOfWar::new();
        fog.reallocate_for_map(10, 10, [0, 1]);
        fog.mark_visible(0, 9, 9);

        fog.reallocate_for_map(20, 20, [0]);
        assert!(!fog.has_floor(1));
        let grid = fog.grid(0).unwrap();
        assert_eq!((grid.width(), grid.height()), (20, 20));
        assert_eq!(grid.visible_count(), 0);
    }

    #[test]
    fn test_mark_visible() {
        let mut fog = FogOfWar::new();
        fog.reallocate_for_map(5, 5, [0]);

        assert!(fog.mark_visible(0, 2, 3));
        assert!(!fog.mark_visible(0, 2, 3));
        assert!(fog.is_visible(0, 2, 3));
        assert_eq!(fog.visibility(0, 3, 2), Some(Visibility::Hidden));
    }

    #[test]
    fn test_mark_visible_out_of_bounds_is_noop() {
        let mut fog = FogOfWar::new();
        fog.reallocate_for_map(5, 5, [0]);

        assert!(!fog.mark_visible(0, 5, 0));
        assert!(!fog.mark_visible(0, -1, 2));
        assert!(!fog.mark_visible(3, 1, 1));
        assert_eq!(fog.grid(0).unwrap().visible_count(), 0);
        assert_eq!(fog.visibility(0, 5, 0), None);
    }

    #[test]
    fn test_reset() {
        let mut fog = FogOfWar::new();
        fog.reallocate_for_map(3, 3, [0, 1]);
        fog.mark_visible(0, 1, 1);
        fog.mark_visible(1, 1, 1);

        fog.reset(0);
        assert!(!fog.is_visible(0, 1, 1));
        assert!(fog.is_visible(1, 1, 1));

        fog.reset_all();
        assert!(!fog.is_visible(1, 1, 1));
        // Unknown floor
        fog.reset(7);
    }

    #[test]
    fn test_visibility_serializes_lowercase() {
        let json = serde_json::to_string(&Visibility::Visible).unwrap();
        assert_eq!(json, "\"visible\"");
    }
}
