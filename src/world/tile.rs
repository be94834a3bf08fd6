//! Tile definitions
//!
//! Tile references, their tag sets, and the classifier that answers
//! vision and movement questions about them.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Tag names consulted by the classifier
pub mod tags {
    pub const IMPASSABLE: &str = "impassable";
    pub const BLOCKS_VISION: &str = "blocks_vision";
    pub const TRANSPARENT: &str = "transparent";
    pub const ALLOWS_VISION: &str = "allows_vision";
    pub const SOLID_TERRAIN_TOP: &str = "solid_terrain_top";
    pub const OPENING_UP: &str = "opening_up";
    pub const OPENING_DOWN: &str = "opening_down";
    pub const STAIRS_UP: &str = "stairs_up";
    pub const STAIRS_DOWN: &str = "stairs_down";
    pub const HOLE: &str = "hole";
    pub const Z_TRANSITION: &str = "z_transition";
}

/// Reference to a tile definition by id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileRef(String);

impl TileRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of tags attached to a tile definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileTags(HashSet<String>);

impl TileTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn insert(&mut self, tag: impl Into<String>) {
        self.0.insert(tag.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Windows, glass and the like override any vision blocking
    pub fn allows_vision(&self) -> bool {
        self.has(tags::ALLOWS_VISION) || self.has(tags::TRANSPARENT)
    }
}

impl<S: Into<String>> FromIterator<S> for TileTags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A single tile definition from the catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: TileTags,
}

impl TileDef {
    pub fn new<S: Into<String>>(name: &str, tags: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.into_iter().collect(),
        }
    }
}

/// Read-only source of tile tags, keyed by tile id
pub trait TileCatalog {
    /// Tags for a tile id, or `None` if the catalog has no such tile
    fn tile_tags(&self, id: &str) -> Option<&TileTags>;
}

/// Tile definitions keyed by id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileDefs {
    defs: HashMap<String, TileDef>,
}

impl TileDefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, def: TileDef) {
        self.defs.insert(id.into(), def);
    }

    /// Builder-style insert
    pub fn with(mut self, id: &str, def: TileDef) -> Self {
        self.insert(id, def);
        self
    }

    pub fn get(&self, id: &str) -> Option<&TileDef> {
        self.defs.get(id)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl TileCatalog for TileDefs {
    fn tile_tags(&self, id: &str) -> Option<&TileTags> {
        self.defs.get(id).map(|def| &def.tags)
    }
}

/// Direction in which a floor opening lets vision through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FloorOpening {
    Up,
    Down,
    Both,
}

impl FloorOpening {
    pub fn looks_up(self) -> bool {
        matches!(self, FloorOpening::Up | FloorOpening::Both)
    }

    pub fn looks_down(self) -> bool {
        matches!(self, FloorOpening::Down | FloorOpening::Both)
    }

    /// Combine two openings on the same cell
    pub fn merge(self, other: FloorOpening) -> FloorOpening {
        if self == other {
            self
        } else {
            FloorOpening::Both
        }
    }

    fn from_tags(set: &TileTags) -> Option<FloorOpening> {
        if set.has(tags::Z_TRANSITION) {
            return Some(FloorOpening::Both);
        }
        let up = set.has(tags::OPENING_UP) || set.has(tags::STAIRS_UP);
        let down = set.has(tags::OPENING_DOWN) || set.has(tags::STAIRS_DOWN) || set.has(tags::HOLE);
        match (up, down) {
            (true, true) => Some(FloorOpening::Both),
            (true, false) => Some(FloorOpening::Up),
            (false, true) => Some(FloorOpening::Down),
            (false, false) => None,
        }
    }
}

/// Everything the classifier needs to know about one tile id, resolved
/// from its tags in a single pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileTraits {
    /// `Some(true)` blocks vision, `Some(false)` lets it through, `None`
    /// has no opinion and defers to the layer below
    pub vision: Option<bool>,
    pub impassable: bool,
    /// Acts as a floor/ceiling between levels; closes any opening
    pub solid_floor: bool,
    pub opening: Option<FloorOpening>,
}

impl TileTraits {
    fn from_tags(set: &TileTags) -> Self {
        let vision = if set.allows_vision() {
            Some(false)
        } else if set.has(tags::BLOCKS_VISION) {
            Some(true)
        } else {
            None
        };
        let solid_floor = set.has(tags::SOLID_TERRAIN_TOP);
        Self {
            vision,
            impassable: set.has(tags::IMPASSABLE),
            solid_floor,
            opening: if solid_floor { None } else { FloorOpening::from_tags(set) },
        }
    }
}

/// Shared handle to a catalog
pub type SharedCatalog = Arc<dyn TileCatalog + Send + Sync>;

/// Answers blocking questions about tiles.
///
/// Lookups try the primary catalog, then the optional secondary one.
/// A tile found in neither blocks nothing: maps may reference tiles
/// whose definitions are not loaded yet.
///
/// Catalogs are read-only, so each id is resolved to [`TileTraits`] once
/// and served from memory afterwards.
pub struct TileClassifier {
    primary: Option<SharedCatalog>,
    secondary: Option<SharedCatalog>,
    resolved: RwLock<HashMap<String, TileTraits>>,
}

impl TileClassifier {
    pub fn new(primary: SharedCatalog) -> Self {
        Self {
            primary: Some(primary),
            secondary: None,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Primary catalog with a secondary one consulted on misses
    pub fn with_fallback(primary: Option<SharedCatalog>, secondary: Option<SharedCatalog>) -> Self {
        Self {
            primary,
            secondary,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Classifier with no catalog at all; every tile is permissive
    pub fn permissive() -> Self {
        Self::with_fallback(None, None)
    }

    /// Tags for a tile through both catalog tiers
    pub fn tags(&self, tile: &TileRef) -> Option<&TileTags> {
        let id = tile.id();
        self.primary
            .as_deref()
            .and_then(|catalog| catalog.tile_tags(id))
            .or_else(|| self.secondary.as_deref().and_then(|catalog| catalog.tile_tags(id)))
    }

    /// Resolved traits for a tile. Unknown ids get the permissive default
    /// and are logged the first time they are seen.
    pub fn traits(&self, tile: &TileRef) -> TileTraits {
        let cached = self.resolved.read().get(tile.id()).copied();
        if let Some(traits) = cached {
            return traits;
        }

        let mut resolved = self.resolved.write();
        *resolved
            .entry(tile.id().to_string())
            .or_insert_with(|| match self.tags(tile) {
                Some(set) => TileTraits::from_tags(set),
                None => {
                    log::debug!("Unknown tile id '{}', treating it as blocking nothing", tile);
                    TileTraits::default()
                }
            })
    }

    pub fn is_blocking_vision(&self, tile: &TileRef) -> bool {
        self.traits(tile).vision.unwrap_or(false)
    }

    pub fn is_blocking_movement(&self, tile: &TileRef) -> bool {
        self.traits(tile).impassable
    }

    pub fn is_floor_opening(&self, tile: &TileRef) -> bool {
        self.floor_opening(tile).is_some()
    }

    pub fn floor_opening(&self, tile: &TileRef) -> Option<FloorOpening> {
        self.traits(tile).opening
    }

    /// Does this tile act as a floor/ceiling between levels?
    pub fn is_solid_floor(&self, tile: &TileRef) -> bool {
        self.traits(tile).solid_floor
    }

    /// Traits of both layers as `[overlay, base]`; `None` where a layer is empty
    pub fn cell_traits(
        &self,
        overlay: Option<&TileRef>,
        base: Option<&TileRef>,
    ) -> [Option<TileTraits>; 2] {
        [overlay, base].map(|layer| layer.map(|tile| self.traits(tile)))
    }

    /// Vision blocking for a whole map cell. The overlay is consulted
    /// first and the first layer with an opinion wins.
    pub fn cell_blocks_vision(&self, overlay: Option<&TileRef>, base: Option<&TileRef>) -> bool {
        if let Some(verdict) = overlay.and_then(|tile| self.traits(tile).vision) {
            return verdict;
        }
        base.and_then(|tile| self.traits(tile).vision).unwrap_or(false)
    }

    pub fn cell_blocks_movement(&self, overlay: Option<&TileRef>, base: Option<&TileRef>) -> bool {
        self.cell_traits(overlay, base)
            .into_iter()
            .flatten()
            .any(|traits| traits.impassable)
    }

    /// Openings declared by either layer. A solid floor on either layer
    /// closes the cell.
    pub fn cell_floor_opening(
        &self,
        overlay: Option<&TileRef>,
        base: Option<&TileRef>,
    ) -> Option<FloorOpening> {
        let layers = self.cell_traits(overlay, base);
        if layers.iter().flatten().any(|traits| traits.solid_floor) {
            return None;
        }
        layers
            .iter()
            .flatten()
            .filter_map(|traits| traits.opening)
            .reduce(FloorOpening::merge)
    }
}

impl fmt::Debug for TileClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileClassifier")
            .field("primary", &self.primary.is_some())
            .field("secondary", &self.secondary.is_some())
            .field("resolved", &self.resolved.read().len())
            .finish()
    }
}

impl Default for TileClassifier {
    fn default() -> Self {
        Self::permissive()
    }
}
