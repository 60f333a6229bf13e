//! Ranking accepted segments by length (ADD-ON, `SPEC_FULL.md`).
//!
//! Grounded on `mujou_pipeline::segment_analysis::find_top_segments`: a
//! pure, non-mutating view over the final segment list, useful for
//! diagnostic overlays that only want to highlight the most prominent
//! lines. Changes no detection semantics — it ranks whatever the
//! Merger/Filter already produced.

use crate::merger::Segment;

/// Return up to `n` segments from `segments`, ordered by `length`
/// descending.
#[must_use]
pub fn find_top_segments(segments: &[Segment], n: usize) -> Vec<Segment> {
    let mut ranked: Vec<Segment> = segments.to_vec();
    ranked.sort_by(|a, b| b.length.partial_cmp(&a.length).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked
}
