//! Gradient-guided Hough voting (spec.md §4.3).
//!
//! This is the detector's central pruning trick: instead of sweeping all
//! of `θ ∈ [-π/2, π/2)` for every edge pixel (plain Hough), each pixel
//! only votes in a narrow band around its own local gradient angle. This
//! keeps the per-pixel cost roughly constant regardless of angular
//! resolution.

use crate::accumulator::Accumulator;
use crate::luminance::LuminanceMap;
use crate::types::{BBox, Point};

/// Casts votes into an [`Accumulator`] from the edge pixels of a
/// [`LuminanceMap`].
pub struct Voter {
    /// Half-width, in radians, of the angular band swept around each
    /// pixel's local gradient direction.
    delta_theta_range: f64,
}

impl Voter {
    /// Create a voter with the given sweep half-width.
    #[must_use]
    pub const fn new(delta_theta_range: f64) -> Self {
        Self { delta_theta_range }
    }

    /// Sweep every edge pixel inside `bbox`, casting votes into `acc`.
    ///
    /// `bbox` restricts which pixels are considered; it does not change
    /// how `ρ` is computed (always relative to the image origin), so
    /// cropping is purely a "skip these pixels" operation — an ADD-ON
    /// over the base spec that the entry point uses to scope detection
    /// to a sub-rectangle.
    pub fn sweep(&self, luminance: &LuminanceMap, acc: &mut Accumulator, bbox: BBox) {
        let delta_theta = acc.delta_theta();
        for y in bbox.y0..bbox.y1 {
            for x in bbox.x0..bbox.x1 {
                let Some(entry) = luminance.get(x, y) else {
                    continue;
                };
                if !entry.is_edge {
                    continue;
                }

                let theta_center = normalize_theta(
                    f64::from(entry.gradient_y).atan2(f64::from(entry.gradient_x)),
                );
                let quantized_center = (theta_center / delta_theta).round() * delta_theta;

                let point = Point::new(
                    i32::try_from(x).unwrap_or(i32::MAX),
                    i32::try_from(y).unwrap_or(i32::MAX),
                );

                let steps =
                    (self.delta_theta_range / delta_theta).round().max(0.0);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let steps = steps as i64;
                for step in -steps..=steps {
                    #[allow(clippy::cast_precision_loss)]
                    let theta = normalize_theta(quantized_center + (step as f64) * delta_theta);
                    // ρ = x·cos(θ) − y·sin(θ); y grows downward (spec.md
                    // §4.3's documented convention — see SPEC_FULL.md's
                    // "Open Question resolutions").
                    let rho = f64::from(x) * theta.cos() - f64::from(y) * theta.sin();
                    acc.vote(theta, rho, point);
                }
            }
        }
    }
}

/// Fold an angle in `(-π, π]` into the Hough range `[-π/2, π/2)`.
///
/// A line's angle is only meaningful modulo π (a line at θ and θ+π is
/// the same line), so this is a fold, not a wraparound clamp.
fn normalize_theta(theta: f64) -> f64 {
    let mut theta = theta;
    while theta < -std::f64::consts::FRAC_PI_2 {
        theta += std::f64::consts::PI;
    }
    while theta >= std::f64::consts::FRAC_PI_2 {
        theta -= std::f64::consts::PI;
    }
    theta
}
