//! Harvesting accumulator cells into candidate lines (spec.md §4.4).
//!
//! Scans the accumulator in a fixed order — θ outer, ρ inner — and turns
//! every cell that clears the active [`ThresholdRegime`] into a
//! [`HarvestedLine`], marking the cell `recorded` so later diagonal
//! passes over nearby θ don't re-emit it (spec.md GLOSSARY's "cell
//! aliasing").
//!
//! The scan order is load-bearing, not cosmetic: because a real edge
//! typically casts votes into several adjacent `(ρ, θ)` cells, visiting θ
//! outermost keeps those near-duplicates close together in emission
//! order, which is what lets the [`crate::merger::Merger`] coalesce them
//! immediately afterward rather than needing a second indexing pass.

use crate::accumulator::Accumulator;
use crate::types::{DetectionProfile, Point};

/// Thresholds a cell must clear to be harvested, selected by
/// [`DetectionProfile`] (spec.md §4.4).
///
/// Same strategy-enum shape as the teacher's `ContourTracerKind`: the
/// regime only varies thresholds, so it's plain data rather than a trait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdRegime {
    /// Minimum vote count for a cell to be harvested.
    pub min_votes: u32,
    /// Minimum Euclidean distance between a cell's tracked endpoints.
    pub min_useful_length: f64,
}

impl ThresholdRegime {
    /// The regime for a given profile.
    #[must_use]
    pub const fn for_profile(profile: DetectionProfile) -> Self {
        match profile {
            DetectionProfile::Squishy => Self {
                min_votes: 10,
                min_useful_length: 5.0,
            },
            DetectionProfile::Strict => Self {
                min_votes: 90,
                min_useful_length: 50.0,
            },
        }
    }
}

/// Parameters shared across both regimes, used downstream by the
/// [`crate::merger::Merger`] and [`crate::filter::Filter`] (spec.md
/// §4.4's "shared params").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SharedParams {
    /// Minimum fraction of a segment's pixels that must be confirmed
    /// edge pixels for the Filter's (optional) density check.
    pub min_pixel_density: f64,
    /// Spacing, in pixels, between sample points when the Merger
    /// densifies a candidate segment (spec.md §4.5).
    pub min_point_resolution: u32,
    /// Maximum `|slope(C) - slope(E)|` for the Merger to consider two
    /// segments part of the same line (spec.md §4.5).
    pub angle_resolution: f64,
    /// Maximum gap, in pixels along the line, tolerated between two dash
    /// segments before the Merger treats them as unrelated.
    pub max_gap_between_dashes: u32,
}

impl Default for SharedParams {
    fn default() -> Self {
        Self {
            min_pixel_density: 1.0 / 5.0,
            min_point_resolution: 10,
            angle_resolution: 0.4,
            max_gap_between_dashes: 10,
        }
    }
}

/// A line pulled out of the accumulator, before merging.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarvestedLine {
    /// The cell's tracked lexicographically-smallest voting pixel.
    pub point_a: Point,
    /// The cell's tracked lexicographically-largest voting pixel.
    pub point_b: Point,
    /// The cell's vote count at harvest time.
    pub votes: u32,
}

/// Walks the accumulator and emits [`HarvestedLine`]s clearing `regime`.
pub struct Harvester {
    regime: ThresholdRegime,
}

impl Harvester {
    /// Build a harvester for the given threshold regime.
    #[must_use]
    pub const fn new(regime: ThresholdRegime) -> Self {
        Self { regime }
    }

    /// Harvest every cell in `acc` that clears the active regime,
    /// marking each one `recorded` as it's emitted.
    ///
    /// Scan order is θ outer, ρ inner (spec.md §4.4) — this is an
    /// observable property of the returned order, not just an
    /// implementation detail, since the Merger relies on nearby
    /// duplicates arriving close together.
    pub fn harvest(&self, acc: &mut Accumulator) -> Vec<HarvestedLine> {
        let mut lines = Vec::new();
        for theta_idx in 0..acc.num_theta() {
            for rho_idx in 0..acc.num_rho() {
                let cell = acc.cell_at_mut(theta_idx, rho_idx);
                if cell.recorded || cell.votes < self.regime.min_votes {
                    continue;
                }
                let (Some(point_a), Some(point_b)) = (cell.endpoint_a, cell.endpoint_b) else {
                    continue;
                };
                if point_a.distance(point_b) < self.regime.min_useful_length {
                    continue;
                }
                cell.recorded = true;
                lines.push(HarvestedLine {
                    point_a,
                    point_b,
                    votes: cell.votes,
                });
            }
        }
        lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Dimensions;

    #[test]
    fn threshold_regime_squishy_is_more_permissive_than_strict() {
        let squishy = ThresholdRegime::for_profile(DetectionProfile::Squishy);
        let strict = ThresholdRegime::for_profile(DetectionProfile::Strict);
        assert!(squishy.min_votes < strict.min_votes);
        assert!(squishy.min_useful_length < strict.min_useful_length);
    }

    #[test]
    fn harvest_skips_cells_below_min_votes() {
        let dims = Dimensions {
            width: 50,
            height: 50,
        };
        let mut acc = Accumulator::new(dims, 0.1).unwrap();
        acc.vote(0.0, 0.0, Point::new(1, 1));
        let harvester = Harvester::new(ThresholdRegime::for_profile(DetectionProfile::Strict));
        let lines = harvester.harvest(&mut acc);
        assert!(lines.is_empty());
    }

    #[test]
    fn harvest_emits_and_marks_recorded() {
        let dims = Dimensions {
            width: 50,
            height: 50,
        };
        let mut acc = Accumulator::new(dims, 0.1).unwrap();
        for i in 0..15 {
            acc.vote(0.0, 0.0, Point::new(i, i));
        }
        let regime = ThresholdRegime::for_profile(DetectionProfile::Squishy);
        let harvester = Harvester::new(regime);
        let lines = harvester.harvest(&mut acc);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].votes, 15);

        let theta_idx = acc.theta_index(0.0);
        let rho_idx = acc.rho_index(0.0);
        assert!(acc.cell_at(theta_idx, rho_idx).recorded);

        // A second harvest pass must not re-emit the same cell.
        let lines_again = harvester.harvest(&mut acc);
        assert!(lines_again.is_empty());
    }
}
