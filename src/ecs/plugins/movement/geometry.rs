//! Planar geometry helpers shared by the movement code.
//!
//! Headings use the client's unit: a full turn is 65536, so one degree is
//! 182.04 heading units and 0 faces +x.

use glam::IVec3;

use crate::ecs::plugins::movement::config::WORLD_COORDINATE_LIMIT;

pub const HEADING_UNITS_PER_DEGREE: f64 = 182.044444444;

pub fn hypot(dx: f64, dy: f64) -> f64 {
    dx.hypot(dy)
}

pub fn distance_2d(a: IVec3, b: IVec3) -> f64 {
    hypot(b.x as f64 - a.x as f64, b.y as f64 - a.y as f64)
}

pub fn distance_3d(a: IVec3, b: IVec3) -> f64 {
    let dz = b.z as f64 - a.z as f64;
    distance_2d(a, b).hypot(dz)
}

/// `target` with every component clamped into the addressable world.
pub fn clamp_to_world(target: IVec3) -> IVec3 {
    target.clamp(
        IVec3::splat(-WORLD_COORDINATE_LIMIT),
        IVec3::splat(WORLD_COORDINATE_LIMIT),
    )
}

/// Index of the grid cell holding `coordinate`, flooring toward negative
/// infinity. Computed in `i64` and saturated, so any `i32` inputs are safe.
pub fn cell_index(coordinate: i32, origin: i32, cell_size: i32) -> i32 {
    let cell = (i64::from(coordinate) - i64::from(origin)).div_euclid(i64::from(cell_size.max(1)));
    cell.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Heading for a bearing given as its cosine and sine (or any vector with
/// that direction).
pub fn heading_from_direction(cos: f64, sin: f64) -> i32 {
    let mut angle = sin.atan2(cos).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    (angle * HEADING_UNITS_PER_DEGREE) as i32
}

pub fn heading_between(from: IVec3, to: IVec3) -> i32 {
    heading_from_direction(to.x as f64 - from.x as f64, to.y as f64 - from.y as f64)
}

pub fn heading_to_degrees(heading: i32) -> f64 {
    let angle = heading as f64 / HEADING_UNITS_PER_DEGREE;
    if angle < 0.0 { angle + 360.0 } else { angle }
}

/// Whether `b` lies within `range` of `a`, optionally counting height.
pub fn is_in_range(a: IVec3, b: IVec3, range: f64, include_z: bool) -> bool {
    let distance = if include_z { distance_3d(a, b) } else { distance_2d(a, b) };
    distance <= range
}

/// The integer point `distance` units from `origin` along the bearing
/// `(cos, sin)`. Components are truncated toward zero like every other
/// world coordinate conversion.
pub fn point_along(origin: IVec3, cos: f64, sin: f64, distance: f64) -> (i32, i32) {
    (
        origin.x + (distance * cos) as i32,
        origin.y + (distance * sin) as i32,
    )
}
