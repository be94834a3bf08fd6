//! Field of View calculation
//!
//! Recursive shadowcasting over eight octants on the observer's floor,
//! followed by a single-floor hop through any visible floor openings.

use super::fog::FogOfWar;
use super::map::{Layer, LevelGrid, Observer, Position};
use super::tile::{FloorOpening, TileClassifier};

/// Largest radius the sweep will scan. Applied before any per-tile work,
/// independent of map size.
pub const MAX_VISION_RADIUS: i32 = 60;

/// Clamp a requested radius into `0..=MAX_VISION_RADIUS`
pub fn cap_radius(requested: i32) -> i32 {
    requested.clamp(0, MAX_VISION_RADIUS)
}

/// Recompute visibility from `origin`.
///
/// Every floor's grid is hidden first, then the origin floor is swept and
/// visible floor openings reveal the matching cell one floor up or down.
/// Returns the cells revealed on the origin floor, or `None` if the call
/// was a no-op because the origin is off the map or on an unknown floor.
pub fn compute_fov(
    levels: &LevelGrid,
    classifier: &TileClassifier,
    fog: &mut FogOfWar,
    origin: Observer,
    requested_radius: i32,
) -> Option<Vec<Position>> {
    let radius = cap_radius(requested_radius);

    if !levels.has_floor(origin.floor) || !fog.has_floor(origin.floor) {
        log::debug!("FOV skipped: floor {} is not loaded", origin.floor);
        return None;
    }
    if !levels.in_bounds(origin.x, origin.y) {
        log::debug!(
            "FOV skipped: origin ({}, {}) outside {}x{} map",
            origin.x,
            origin.y,
            levels.width(),
            levels.height()
        );
        return None;
    }

    // Full recompute: nothing from the previous call survives
    fog.reset_all();

    let mut sweep = Sweep {
        levels,
        classifier,
        fog: &mut *fog,
        origin,
        radius,
        radius_squared: radius * radius,
        visible: Vec::new(),
    };

    // Origin is always visible
    sweep.reveal(origin.x, origin.y);

    if radius > 0 {
        for octant in 0..8 {
            sweep.scan(1, 1.0, 0.0, octant);
        }
    }

    let visible = sweep.visible;
    let propagated = propagate_through_openings(levels, classifier, fog, origin.floor, &visible);
    log::trace!(
        "FOV from ({}, {}, {}) r={}: {} visible, {} through openings",
        origin.x,
        origin.y,
        origin.floor,
        radius,
        visible.len(),
        propagated
    );

    Some(visible)
}

/// State for one floor's sweep
struct Sweep<'a> {
    levels: &'a LevelGrid,
    classifier: &'a TileClassifier,
    fog: &'a mut FogOfWar,
    origin: Observer,
    radius: i32,
    radius_squared: i32,
    visible: Vec<Position>,
}

impl Sweep<'_> {
    /// Off-map cells block, so the sweep stops at the map edge
    fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.levels
            .cell(self.origin.floor, x, y)
            .map_or(true, |(overlay, base)| self.classifier.cell_blocks_vision(overlay, base))
    }

    fn reveal(&mut self, x: i32, y: i32) {
        if self.fog.mark_visible(self.origin.floor, x, y) {
            self.visible.push(Position::new(x, y));
        }
    }

    /// Scan one octant outwards from `depth`, recursing past each blocker.
    ///
    /// Octant-local coordinates have `dy = -depth` and `dx` running from
    /// `dy` to 0, so slopes `dx / dy` go from 1.0 (the diagonal) down to
    /// 0.0 (the axis). `high..low` is the wedge still lit at this depth.
    fn scan(&mut self, depth: i32, mut high: f64, low: f64, octant: u8) {
        if high < low {
            return;
        }

        let mut shadow_edge = high;
        for row in depth..=self.radius {
            let dy = -row;
            let mut in_shadow = false;

            for dx in dy..=0 {
                // Slopes through the cell's two outer corners
                let near = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let far = (dx as f64 + 0.5) / (dy as f64 - 0.5);
                if far > high {
                    continue;
                }
                if near < low {
                    break;
                }

                let (ox, oy) = transform_octant(dx, dy, octant);
                let (x, y) = (self.origin.x + ox, self.origin.y + oy);
                if dx * dx + dy * dy <= self.radius_squared {
                    self.reveal(x, y);
                }

                let opaque = self.is_opaque(x, y);
                if in_shadow {
                    if opaque {
                        shadow_edge = far;
                    } else {
                        in_shadow = false;
                        high = shadow_edge;
                    }
                } else if opaque && row < self.radius {
                    in_shadow = true;
                    self.scan(row + 1, high, near, octant);
                    shadow_edge = far;
                }
            }

            if in_shadow {
                break;
            }
        }
    }
}

/// Map octant-local `(col, row)` onto map offsets
fn transform_octant(col: i32, row: i32, octant: u8) -> (i32, i32) {
    match octant {
        0 => (col, row),
        1 => (row, col),
        2 => (row, -col),
        3 => (col, -row),
        4 => (-col, -row),
        5 => (-row, -col),
        6 => (-row, col),
        7 => (-col, row),
        _ => (col, row),
    }
}

/// Reveal the cell above or below each visible opening. Only the
/// adjacent floor is touched; returns how many cells were revealed.
/// Floors past the ends of the `i32` range do not exist.
fn propagate_through_openings(
    levels: &LevelGrid,
    classifier: &TileClassifier,
    fog: &mut FogOfWar,
    floor: i32,
    visible: &[Position],
) -> usize {
    let above = floor.checked_add(1).filter(|&f| fog.has_floor(f));
    let below = floor.checked_sub(1).filter(|&f| fog.has_floor(f));
    if above.is_none() && below.is_none() {
        return 0;
    }

    let mut revealed = 0;
    for pos in visible {
        let Some(opening) = cell_opening(levels, classifier, floor, above, *pos) else {
            continue;
        };
        if let Some(above) = above.filter(|_| opening.looks_up()) {
            revealed += usize::from(fog.mark_visible(above, pos.x, pos.y));
        }
        if let Some(below) = below.filter(|_| opening.looks_down()) {
            revealed += usize::from(fog.mark_visible(below, pos.x, pos.y));
        }
    }
    revealed
}

/// Opening at a cell: tagged openings on either layer, no floor
/// underfoot, or no floor on the level above (nothing overhead).
/// A solid floor tile on the cell closes it.
fn cell_opening(
    levels: &LevelGrid,
    classifier: &TileClassifier,
    floor: i32,
    above: Option<i32>,
    pos: Position,
) -> Option<FloorOpening> {
    let (overlay, base) = levels.cell(floor, pos.x, pos.y)?;
    let layers = classifier.cell_traits(overlay, base);
    if layers.iter().flatten().any(|traits| traits.solid_floor) {
        return None;
    }

    let mut opening = layers
        .iter()
        .flatten()
        .filter_map(|traits| traits.opening)
        .reduce(FloorOpening::merge);
    if base.is_none() {
        opening = Some(merge_opening(opening, FloorOpening::Down));
    }
    let open_sky = above.map_or(false, |above| {
        levels.get_tile(above, pos.x, pos.y, Layer::Base).is_empty()
    });
    if open_sky {
        opening = Some(merge_opening(opening, FloorOpening::Up));
    }
    opening
}

fn merge_opening(current: Option<FloorOpening>, extra: FloorOpening) -> FloorOpening {
    current.map_or(extra, |opening| opening.merge(extra))
}
