//! Fowcast - fog of war for multi-floor tile maps
//!
//! Recursive shadowcasting from an observer, per-floor visibility grids,
//! and one-floor visibility through stairwells and open floors.

pub mod data;
pub mod game;
pub mod world;

// Re-export commonly used types
pub use data::{DataManager, MapDescriptor};
pub use game::{SharedVision, VisionEngine, VisionRadiusProvider, Weather};
pub use world::{FogOfWar, LevelGrid, Observer, TileClassifier, Visibility, MAX_VISION_RADIUS};
