//! Weather and vision radius
//!
//! The engine never picks a radius itself; callers ask a provider and
//! pass the answer in.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Radius used when no provider is available
pub const DEFAULT_VISION_RADIUS: i32 = 10;

/// Clear skies report an effectively unlimited radius. The engine caps it.
pub const CLEAR_SKY_RADIUS: i32 = 2112;

/// Radius in fog
pub const FOG_RADIUS: i32 = 50;

/// Source of the current effective vision radius
pub trait VisionRadiusProvider {
    fn current_vision_radius(&self) -> i32;
}

/// Current weather conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Clear,
    Overcast,
    Rain,
    Snow,
    Fog,
    Storm,
}

impl Weather {
    /// Get the weather name for display
    pub fn name(&self) -> &'static str {
        match self {
            Weather::Clear => "Clear",
            Weather::Overcast => "Overcast",
            Weather::Rain => "Rain",
            Weather::Snow => "Snow",
            Weather::Fog => "Fog",
            Weather::Storm => "Storm",
        }
    }
}

impl Weather {
    pub const ALL: [Weather; 6] = [
        Weather::Clear,
        Weather::Overcast,
        Weather::Rain,
        Weather::Snow,
        Weather::Fog,
        Weather::Storm,
    ];
}

impl FromStr for Weather {
    type Err = String;

    /// Case-insensitive match on [`Weather::name`]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weather::ALL
            .into_iter()
            .find(|weather| weather.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown weather '{}'", s))
    }
}

impl VisionRadiusProvider for Weather {
    fn current_vision_radius(&self) -> i32 {
        match self {
            Weather::Clear | Weather::Overcast => CLEAR_SKY_RADIUS,
            Weather::Fog => FOG_RADIUS,
            Weather::Rain | Weather::Snow | Weather::Storm => DEFAULT_VISION_RADIUS,
        }
    }
}

/// A radius that never changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRadius(pub i32);

impl VisionRadiusProvider for FixedRadius {
    fn current_vision_radius(&self) -> i32 {
        self.0
    }
}

/// Ask the provider if there is one, else fall back to the default
pub fn vision_radius_or_default(provider: Option<&dyn VisionRadiusProvider>) -> i32 {
    provider.map_or(DEFAULT_VISION_RADIUS, |p| p.current_vision_radius())
}
