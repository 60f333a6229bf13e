//! Shared types for the line detector.
//!
//! Mirrors the role of `mujou_pipeline::types`: small, `Copy`-friendly
//! value types plus the detector's configuration and error enum.

use thiserror::Error;

/// An integer pixel coordinate, origin at the top-left, x right, y down.
///
/// Unlike [`geo::Point`] (used internally for distance math in
/// [`crate::merger`]), this is the detector's public coordinate type:
/// whole pixels, not floating-point image-space positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal position (pixels from the left edge).
    pub x: i32,
    /// Vertical position (pixels from the top edge).
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// Lexicographic order used throughout the detector: compare `x`
    /// first, then `y` (spec.md §3's "x, then y" ordering for
    /// `endpoint_a`/`endpoint_b` and `Segment` endpoints).
    #[must_use]
    pub fn lex_min(self, other: Self) -> Self {
        if self.lex_le(other) { self } else { other }
    }

    /// See [`Point::lex_min`].
    #[must_use]
    pub fn lex_max(self, other: Self) -> Self {
        if self.lex_le(other) { other } else { self }
    }

    /// `true` if `self` precedes or equals `other` under (x, then y)
    /// lexicographic order.
    #[must_use]
    pub fn lex_le(self, other: Self) -> bool {
        (self.x, self.y) <= (other.x, other.y)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// The diagonal length of the image, rounded up — used as `ρ_max`
    /// (spec.md §3, Accumulator layout).
    #[must_use]
    pub fn rho_max(self) -> f64 {
        (f64::from(self.width).powi(2) + f64::from(self.height).powi(2)).sqrt()
    }
}

/// A bounding box `(x0, y0, x1, y1)`, half-open on the high end.
///
/// Passed to [`crate::voter::Voter::sweep`] to restrict detection to a
/// sub-rectangle of the image (spec.md §6's `bbox` parameter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    /// Inclusive lower x bound.
    pub x0: u32,
    /// Inclusive lower y bound.
    pub y0: u32,
    /// Exclusive upper x bound.
    pub x1: u32,
    /// Exclusive upper y bound.
    pub y1: u32,
}

impl BBox {
    /// The bounding box spanning the entire image.
    #[must_use]
    pub const fn full(dims: Dimensions) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: dims.width,
            y1: dims.height,
        }
    }

    /// `true` if the box is degenerate (`x1 <= x0` or `y1 <= y0`).
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }
}

/// Coarse gradient direction, one of 8 compass codes (spec.md §3/GLOSSARY).
///
/// Classified from the signs and relative magnitudes of the Sobel
/// components `Gx`, `Gy`, with a central dead-band treated as "straight"
/// (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientDirection {
    /// West to east (`Gx >= 0`, `|Gy| <= 10`).
    WestToEast,
    /// East to west (`Gx < 0`, `|Gy| <= 10`).
    EastToWest,
    /// North to south (`Gy < 0`, `|Gx| <= 10`).
    NorthToSouth,
    /// South to north (`Gy >= 0`, `|Gx| <= 10`).
    SouthToNorth,
    /// Northeast to southwest.
    NortheastToSouthwest,
    /// Southwest to northeast.
    SouthwestToNortheast,
    /// Northwest to southeast.
    NorthwestToSoutheast,
    /// Southeast to northwest.
    SoutheastToNorthwest,
}

/// Which threshold regime the [`crate::harvester::Harvester`] applies.
///
/// Strategy-enum pattern, same shape as
/// `mujou_pipeline::contour::ContourTracerKind`: the regime controls
/// *thresholds*, not the algorithm itself, so this is plain data rather
/// than a trait — see [`crate::harvester::ThresholdRegime`] for the
/// associated constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionProfile {
    /// Tolerant thresholds for organic/blobby imagery (spec.md §4.4).
    Squishy,
    /// Default thresholds for technical line art (spec.md §4.4).
    #[default]
    Strict,
}

/// Configuration for a single detection pass.
///
/// All parameters have sensible defaults matching spec.md. Field
/// groupings follow spec.md §3/§4: edge-map tuning, voter sweep tuning,
/// and harvester/merger/filter tuning (the latter overridden wholesale by
/// [`DetectionProfile`] unless the caller sets them individually).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorOptions {
    /// Selects the squishy/strict threshold regime (spec.md §4.4).
    pub profile: DetectionProfile,

    /// Sobel gradient magnitude threshold above which a pixel counts as
    /// an edge (spec.md §4.1). Default 25.
    pub edge_threshold: i32,

    /// θ quantization step in radians (spec.md §3). Default 0.01.
    pub delta_theta: f64,

    /// Half-width of the angular sweep band around the local gradient
    /// angle (spec.md §4.3). Default π/8.
    pub delta_theta_range: f64,

    /// Whether to apply the Filter's optional pixel-density check
    /// (spec.md §4.6 item 2). Disabled by default — see `SPEC_FULL.md`'s
    /// "Open Question resolutions".
    pub enable_density_filter: bool,

    /// When drawing a rebuilt/annotated image (an external collaborator's
    /// concern, spec.md §6), whether interior pixels are drawn gray
    /// rather than left untouched.
    pub draw_interior_as_gray: bool,

    /// When drawing a rebuilt image, whether to erase the background
    /// before drawing shape outlines.
    pub redraw_with_just_shape_outlines: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            profile: DetectionProfile::default(),
            edge_threshold: 25,
            delta_theta: 0.01,
            delta_theta_range: std::f64::consts::FRAC_PI_8,
            enable_density_filter: false,
            draw_interior_as_gray: false,
            redraw_with_just_shape_outlines: false,
        }
    }
}

/// Errors that can occur while detecting lines.
///
/// Propagation policy (spec.md §7): [`DetectorError::InvalidInput`] and
/// [`DetectorError::OutOfMemory`] are fatal — callers get no partial
/// segment list. [`DetectorError::SinkFailure`] is reported but the
/// caller still receives whatever segments were found.
#[derive(Debug, Error)]
pub enum DetectorError {
    /// Null image, degenerate bbox, or zero-area image.
    #[error("invalid detector input: {0}")]
    InvalidInput(String),

    /// Accumulator allocation failed.
    #[error("out of memory allocating the hough accumulator")]
    OutOfMemory,

    /// The optional output image sink reported a write error. Non-fatal:
    /// the segment list this error is attached to is still valid.
    #[error("output sink failed: {0}")]
    SinkFailure(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_distance() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_lex_order_compares_x_first() {
        let a = Point::new(1, 100);
        let b = Point::new(2, 0);
        assert_eq!(a.lex_min(b), a);
        assert_eq!(a.lex_max(b), b);
    }

    #[test]
    fn point_lex_order_ties_break_on_y() {
        let a = Point::new(5, 1);
        let b = Point::new(5, 9);
        assert_eq!(a.lex_min(b), a);
        assert_eq!(a.lex_max(b), b);
    }

    #[test]
    fn dimensions_rho_max_matches_pythagoras() {
        let dims = Dimensions {
            width: 3,
            height: 4,
        };
        assert!((dims.rho_max() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bbox_full_spans_image() {
        let dims = Dimensions {
            width: 10,
            height: 20,
        };
        let bbox = BBox::full(dims);
        assert_eq!(bbox.x0, 0);
        assert_eq!(bbox.y0, 0);
        assert_eq!(bbox.x1, 10);
        assert_eq!(bbox.y1, 20);
        assert!(!bbox.is_degenerate());
    }

    #[test]
    fn bbox_degenerate_when_collapsed() {
        let bbox = BBox {
            x0: 5,
            y0: 0,
            x1: 5,
            y1: 10,
        };
        assert!(bbox.is_degenerate());
    }

    #[test]
    fn detection_profile_default_is_strict() {
        assert_eq!(DetectionProfile::default(), DetectionProfile::Strict);
    }

    #[test]
    fn detector_options_defaults_match_spec() {
        let opts = DetectorOptions::default();
        assert_eq!(opts.profile, DetectionProfile::Strict);
        assert_eq!(opts.edge_threshold, 25);
        assert!((opts.delta_theta - 0.01).abs() < f64::EPSILON);
        assert!((opts.delta_theta_range - std::f64::consts::FRAC_PI_8).abs() < f64::EPSILON);
        assert!(!opts.enable_density_filter);
    }

    #[test]
    fn error_messages_match_expected_text() {
        assert_eq!(
            DetectorError::InvalidInput("degenerate bbox".to_string()).to_string(),
            "invalid detector input: degenerate bbox",
        );
        assert_eq!(
            DetectorError::OutOfMemory.to_string(),
            "out of memory allocating the hough accumulator",
        );
        assert_eq!(
            DetectorError::SinkFailure("disk full".to_string()).to_string(),
            "output sink failed: disk full",
        );
    }
}
