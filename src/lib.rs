//! A modified Hough transform line detector for rasterized images.
//!
//! `detect_lines` turns an arbitrary [`PixelSource`] into a list of
//! straight-line [`Segment`]s: it builds a per-pixel luminance/gradient
//! map, votes into a `(ρ, θ)` accumulator restricted to a narrow band
//! around each edge pixel's own gradient direction, harvests cells that
//! clear a vote/length threshold, merges near-duplicate harvested lines,
//! and filters the survivors.
//!
//! ```text
//! LuminanceMap → Accumulator ← Voter → Harvester → Merger → Filter
//! ```
//!
//! This crate is sans-IO: it never opens a file or decodes a bitmap
//! itself (that's [`PixelSource`]'s job), never draws an output image,
//! and never spawns a thread. Curve/arc detection, sub-pixel geometry,
//! and continuous-tone output are explicitly out of scope.
//!
//! # Example
//!
//! ```
//! use hough_lines::{detect_lines, DetectorOptions, ImageSource};
//! use image::{Rgb, RgbImage};
//!
//! let mut img = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
//! for y in 0..64 {
//!     img.put_pixel(32, y, Rgb([255, 255, 255]));
//! }
//! let source = ImageSource::new(img);
//! let output = detect_lines(&source, &DetectorOptions::default(), None, None).unwrap();
//! assert!(output.metrics.num_lines <= output.segments.len() as u32 + 1);
//! ```

mod accumulator;
mod diagnostics;
mod filter;
mod geometry;
mod harvester;
mod luminance;
mod merger;
mod pixel_source;
mod segment_rank;
mod types;
mod voter;

pub use accumulator::{Accumulator, Candidate};
pub use diagnostics::DetectionMetrics;
pub use filter::Filter;
pub use harvester::{Harvester, HarvestedLine, SharedParams, ThresholdRegime};
pub use luminance::{LuminanceEntry, LuminanceMap};
pub use merger::{Merger, Segment};
pub use pixel_source::{ImageSource, PixelSource};
pub use segment_rank::find_top_segments;
pub use types::{
    BBox, DetectionProfile, DetectorError, DetectorOptions, Dimensions, GradientDirection, Point,
};
pub use voter::Voter;

/// Something that wants to receive each accepted segment as it's
/// produced (spec.md §6's optional `out_segments` sink).
///
/// A failure here is non-fatal (spec.md §7): `detect_lines` keeps going
/// and still returns the full segment list, surfacing the first sink
/// error separately in [`DetectionOutput::sink_error`].
pub trait SegmentSink {
    /// Called once per accepted segment, in filter-output order.
    ///
    /// # Errors
    ///
    /// Any `Err` is recorded but does not stop detection.
    fn accept(&mut self, segment: &Segment) -> Result<(), String>;
}

impl<F: FnMut(&Segment) -> Result<(), String>> SegmentSink for F {
    fn accept(&mut self, segment: &Segment) -> Result<(), String> {
        self(segment)
    }
}

/// The result of a [`detect_lines`] call.
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Final accepted segments, in harvest/merge order (not sorted by
    /// any particular criterion — see [`find_top_segments`] for ranking).
    pub segments: Vec<Segment>,
    /// Counters describing this call (spec.md §6, §9).
    pub metrics: DetectionMetrics,
    /// The first error a [`SegmentSink`] reported, if any. Non-fatal:
    /// `segments` is still the complete, correct result.
    pub sink_error: Option<DetectorError>,
}

/// Detect straight line segments in `source`.
///
/// `bbox` restricts detection to a sub-rectangle (`None` means the whole
/// image); `sink`, if given, receives each accepted segment as it's
/// produced.
///
/// # Errors
///
/// Returns [`DetectorError::InvalidInput`] if `source` has zero area or
/// `bbox` is degenerate, and [`DetectorError::OutOfMemory`] if the
/// accumulator can't be allocated at the requested `delta_theta`. Both
/// are fatal — no segments are returned. A [`SegmentSink`] failure is
/// reported via [`DetectionOutput::sink_error`] instead, without failing
/// the call.
pub fn detect_lines(
    source: &dyn PixelSource,
    options: &DetectorOptions,
    bbox: Option<BBox>,
    mut sink: Option<&mut dyn SegmentSink>,
) -> Result<DetectionOutput, DetectorError> {
    let dims = source.dimensions();
    let bbox = bbox.unwrap_or_else(|| BBox::full(dims));
    if bbox.is_degenerate() {
        return Err(DetectorError::InvalidInput(
            "bbox is degenerate (x1 <= x0 or y1 <= y0)".to_string(),
        ));
    }

    let luminance = luminance::LuminanceMap::build(source, options.edge_threshold)?;
    let mut acc = accumulator::Accumulator::new(dims, options.delta_theta)?;

    voter::Voter::new(options.delta_theta_range).sweep(&luminance, &mut acc, bbox);

    let mut metrics = DetectionMetrics::new();
    metrics.total_edge_pixels = count_edge_pixels(&luminance, bbox);
    metrics.total_votes_cast = acc.total_votes();
    metrics.num_possible_lines = acc.cells_with_votes();

    let regime = harvester::ThresholdRegime::for_profile(options.profile);
    let shared = harvester::SharedParams::default();

    let harvested = harvester::Harvester::new(regime).harvest(&mut acc);
    metrics.num_lines_with_min_votes = u32::try_from(harvested.len()).unwrap_or(u32::MAX);

    let merged = merger::Merger::new(&luminance, shared).merge(harvested);
    metrics.segments_before_filter = u32::try_from(merged.len()).unwrap_or(u32::MAX);
    metrics.num_duplicate_lines = metrics
        .num_lines_with_min_votes
        .saturating_sub(metrics.segments_before_filter);

    let mut filter = filter::Filter::new(regime.min_useful_length, shared.min_pixel_density);
    filter.min_density_enabled = options.enable_density_filter;
    let accepted = filter.apply(merged);
    metrics.segments_rejected_by_filter =
        metrics.segments_before_filter.saturating_sub(u32::try_from(accepted.len()).unwrap_or(u32::MAX));
    metrics.num_lines = u32::try_from(accepted.len()).unwrap_or(u32::MAX);

    let mut sink_error = None;
    if let Some(sink) = sink.as_deref_mut() {
        for segment in &accepted {
            if let Err(message) = sink.accept(segment) {
                sink_error.get_or_insert(DetectorError::SinkFailure(message));
            }
        }
    }

    Ok(DetectionOutput {
        segments: accepted,
        metrics,
        sink_error,
    })
}

fn count_edge_pixels(luminance: &luminance::LuminanceMap, bbox: BBox) -> u32 {
    let mut count = 0u32;
    for y in bbox.y0..bbox.y1 {
        for x in bbox.x0..bbox.x1 {
            if luminance.is_edge(x, y) {
                count += 1;
            }
        }
    }
    count
}
