//! Shared slope/intercept/angle math (used by [`crate::harvester`] and
//! [`crate::merger`]).
//!
//! A line segment is stored as two endpoints, but both the Harvester's
//! emission logic and the Merger's similarity test work in slope-intercept
//! terms, so this module centralizes the conversion and its vertical-line
//! special case.

use crate::types::Point;

/// Sentinel run used in place of `Δx = 0` when computing the slope of a
/// (near-)vertical segment (spec.md §4.5's "Δx = 1 sentinel").
const VERTICAL_DELTA_X: f64 = 1.0;

/// The slope and y-intercept of the line through `a` and `b`.
///
/// When `a.x == b.x`, `Δx` is replaced by [`VERTICAL_DELTA_X`] rather than
/// dividing by zero, matching the spec's documented behavior for vertical
/// segments — callers that need true vertical-line handling should check
/// `a.x == b.x` directly rather than relying on the resulting slope alone.
#[must_use]
pub fn slope_intercept(a: Point, b: Point) -> (f64, f64) {
    let dx = f64::from(b.x - a.x);
    let dy = f64::from(b.y - a.y);
    let dx = if dx == 0.0 { VERTICAL_DELTA_X } else { dx };
    let slope = dy / dx;
    let intercept = f64::from(a.y) - slope * f64::from(a.x);
    (slope, intercept)
}

/// The angle, in radians, that the line through `a` and `b` makes with
/// the horizontal: `atan2(1.0, slope)` (spec.md §4.5, literal formula —
/// not the more intuitive `atan(slope)`, which disagrees with it for
/// every slope except 0 and ±1).
#[must_use]
pub fn angle_with_horizontal(a: Point, b: Point) -> f64 {
    let (slope, _) = slope_intercept(a, b);
    1.0f64.atan2(slope)
}

/// The Euclidean length of the segment `a`-`b`.
#[must_use]
pub fn length(a: Point, b: Point) -> f64 {
    a.distance(b)
}
