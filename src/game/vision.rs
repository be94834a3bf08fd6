//! Vision engine
//!
//! Ties the level grid, tile classifier and fog of war together behind
//! the two calls the turn loop makes: load a map, update visibility.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::data::MapDescriptor;
use crate::world::{
    compute_fov, FogGrid, FogOfWar, LevelGrid, Observer, TileClassifier, Visibility,
};

/// Owns the active map's levels and fog of war
#[derive(Debug)]
pub struct VisionEngine {
    classifier: TileClassifier,
    levels: LevelGrid,
    fog: FogOfWar,
}

impl VisionEngine {
    /// Create an engine with no map loaded
    pub fn new(classifier: TileClassifier) -> Self {
        Self {
            classifier,
            levels: LevelGrid::default(),
            fog: FogOfWar::default(),
        }
    }

    /// Replace the active map. Levels and fog grids are rebuilt from
    /// scratch even if the dimensions match the previous map.
    pub fn load_map(&mut self, descriptor: &MapDescriptor) {
        self.install_levels(LevelGrid::from_descriptor(descriptor));
    }

    /// Replace the active map with an already built grid
    pub fn install_levels(&mut self, levels: LevelGrid) {
        self.fog
            .reallocate_for_map(levels.width(), levels.height(), levels.floors());
        self.levels = levels;

        log::info!(
            "Loaded map '{}' ({}x{}, {} floors)",
            self.levels.map_id(),
            self.levels.width(),
            self.levels.height(),
            self.levels.floor_count()
        );
    }

    /// Drop the active map; later updates are no-ops until the next load
    pub fn unload_map(&mut self) {
        self.install_levels(LevelGrid::default());
    }

    /// Recompute visibility from `(x, y)` on `floor`.
    ///
    /// Bad input (no map, unknown floor, origin off the map) leaves the
    /// fog untouched. The radius is capped before any tile is scanned.
    pub fn update_visibility(&mut self, x: i32, y: i32, floor: i32, requested_radius: i32) {
        let origin = Observer::new(x, y, floor);
        compute_fov(
            &self.levels,
            &self.classifier,
            &mut self.fog,
            origin,
            requested_radius,
        );
    }

    pub fn update_for(&mut self, observer: Observer, requested_radius: i32) {
        self.update_visibility(observer.x, observer.y, observer.floor, requested_radius);
    }

    pub fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    pub fn levels(&self) -> &LevelGrid {
        &self.levels
    }

    pub fn classifier(&self) -> &TileClassifier {
        &self.classifier
    }

    pub fn is_map_loaded(&self) -> bool {
        !self.levels.is_empty()
    }

    pub fn visibility(&self, floor: i32, x: i32, y: i32) -> Option<Visibility> {
        self.fog.visibility(floor, x, y)
    }

    pub fn is_visible(&self, floor: i32, x: i32, y: i32) -> bool {
        self.fog.is_visible(floor, x, y)
    }

    /// Vision blocking at a map cell; off-map cells block
    pub fn is_cell_blocking_vision(&self, floor: i32, x: i32, y: i32) -> bool {
        self.levels
            .cell(floor, x, y)
            .map_or(true, |(overlay, base)| self.classifier.cell_blocks_vision(overlay, base))
    }

    /// Movement blocking at a map cell, for movement code sharing the
    /// same catalog; off-map cells block
    pub fn is_cell_blocking_movement(&self, floor: i32, x: i32, y: i32) -> bool {
        self.levels
            .cell(floor, x, y)
            .map_or(true, |(overlay, base)| self.classifier.cell_blocks_movement(overlay, base))
    }
}

/// Thread-safe handle to a [`VisionEngine`].
///
/// Map loads and visibility updates hold the write lock for the whole
/// reset and sweep, so readers always see a complete grid.
#[derive(Debug, Clone)]
pub struct SharedVision {
    inner: Arc<RwLock<VisionEngine>>,
}

impl SharedVision {
    pub fn new(engine: VisionEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    pub fn load_map(&self, descriptor: &MapDescriptor) {
        // Parse outside the lock; only the swap happens under it
        let levels = LevelGrid::from_descriptor(descriptor);
        self.inner.write().install_levels(levels);
    }

    pub fn update_visibility(&self, x: i32, y: i32, floor: i32, requested_radius: i32) {
        self.inner
            .write()
            .update_visibility(x, y, floor, requested_radius);
    }

    /// Copy of one floor's grid
    pub fn snapshot(&self, floor: i32) -> Option<FogGrid> {
        self.inner.read().fog().grid(floor).cloned()
    }

    /// Run `f` against the fog while holding the read lock
    pub fn with_fog<R>(&self, f: impl FnOnce(&FogOfWar) -> R) -> R {
        f(self.inner.read().fog())
    }

    pub fn read(&self) -> RwLockReadGuard<'_, VisionEngine> {
        self.inner.read()
    }
}
