//! Final acceptance filter over merged segments (spec.md §4.6).
//!
//! Two independent checks: a length filter (on by default) and a pixel
//! density filter (implemented, but off by default — see the module docs
//! below for why).

use crate::merger::Segment;

/// Post-merge acceptance filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Filter {
    /// Minimum segment length to survive filtering.
    pub min_length: f64,
    /// Whether the density filter runs at all.
    ///
    /// Defaults to `false`. The [`crate::merger::Merger`] discards a
    /// merged-away segment's pixel list rather than unioning it into the
    /// survivor, so `pixel_count` on a heavily-merged segment
    /// under-represents its true density. Enabling this without that
    /// union in place will reject otherwise-good long segments. See
    /// `SPEC_FULL.md`'s "Open Question resolutions".
    pub min_density_enabled: bool,
    /// Minimum `pixel_count / length` ratio, only checked when
    /// `min_density_enabled` is `true`.
    pub min_density: f64,
}

impl Filter {
    /// Build a filter with the given length threshold and density
    /// filtering disabled.
    #[must_use]
    pub const fn new(min_length: f64, min_density: f64) -> Self {
        Self {
            min_length,
            min_density_enabled: false,
            min_density,
        }
    }

    /// Retain only the segments that pass both active checks.
    #[must_use]
    pub fn apply(&self, segments: Vec<Segment>) -> Vec<Segment> {
        segments
            .into_iter()
            .filter(|s| self.passes(s))
            .collect()
    }

    fn passes(&self, segment: &Segment) -> bool {
        if segment.length < self.min_length {
            return false;
        }
        if self.min_density_enabled {
            if segment.length <= 0.0 {
                return false;
            }
            let density = f64::from(segment.pixel_count) / segment.length;
            if density < self.min_density {
                return false;
            }
        }
        true
    }
}
