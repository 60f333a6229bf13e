//! Detection diagnostics (spec.md §6, §9).
//!
//! spec.md §9 notes that the reference implementation's profiling relied
//! on global mutable state, and recommends an explicit handle instead.
//! `DetectionMetrics` is that handle: a plain counter struct threaded
//! through [`crate::detect_lines`] and handed back to the caller, never a
//! process-wide singleton. Shaped after the teacher's
//! `mujou_pipeline::diagnostics::StageMetrics`.

use serde::{Deserialize, Serialize};

/// Counters describing one [`crate::detect_lines`] call.
///
/// The four fields named directly in spec.md §6 come first; the rest are
/// additive diagnostics (per-stage counts) that never influence detection
/// behavior, only observability.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionMetrics {
    /// Accumulator cells that ever received at least one vote.
    pub num_possible_lines: u32,
    /// Cells that cleared the active regime's `min_votes` threshold.
    pub num_lines_with_min_votes: u32,
    /// Harvested lines the Merger discarded while folding near-duplicates
    /// into a single survivor.
    pub num_duplicate_lines: u32,
    /// Segments returned to the caller after filtering.
    pub num_lines: u32,

    /// Total pixels classified as edges by the [`crate::luminance::LuminanceMap`].
    pub total_edge_pixels: u32,
    /// Total votes cast by the [`crate::voter::Voter`], counting repeats
    /// across the angular sweep.
    pub total_votes_cast: u64,
    /// Segment count immediately after the Merger, before the Filter runs.
    pub segments_before_filter: u32,
    /// Segments the Filter rejected.
    pub segments_rejected_by_filter: u32,
}

impl DetectionMetrics {
    /// A zeroed set of counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_all_zero() {
        let metrics = DetectionMetrics::new();
        assert_eq!(metrics.num_possible_lines, 0);
        assert_eq!(metrics.num_lines, 0);
        assert_eq!(metrics.total_votes_cast, 0);
    }

    #[test]
    fn metrics_round_trip_through_json() {
        let metrics = DetectionMetrics {
            num_possible_lines: 12,
            num_lines_with_min_votes: 4,
            num_duplicate_lines: 1,
            num_lines: 3,
            total_edge_pixels: 900,
            total_votes_cast: 12_345,
            segments_before_filter: 4,
            segments_rejected_by_filter: 1,
        };
        let json = serde_json::to_string(&metrics).unwrap();
        let parsed: DetectionMetrics = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metrics);
    }
}
