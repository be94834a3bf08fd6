//! Game module - vision lifecycle and radius providers

mod vision;
mod weather;

pub use vision::{SharedVision, VisionEngine};
pub use weather::{
    vision_radius_or_default, FixedRadius, VisionRadiusProvider, Weather, CLEAR_SKY_RADIUS,
    DEFAULT_VISION_RADIUS, FOG_RADIUS,
};
