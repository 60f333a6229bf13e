//! Coalescing harvested lines into final segments (spec.md §4.5).
//!
//! The Harvester often emits several near-duplicate lines for the same
//! physical edge (a handful of adjacent `(ρ, θ)` cells all clearing the
//! threshold). The Merger collapses those into one [`Segment`] per edge:
//! an O(n²) linear scan, no spatial index, with **destructive** merges —
//! when two lines merge, the absorbed one's pixel list is discarded
//! rather than unioned into the survivor (spec.md §9's design note on
//! this tradeoff; it's why the Filter's density check defaults off, see
//! [`crate::filter`]).

use crate::geometry;
use crate::harvester::{HarvestedLine, SharedParams};
use crate::luminance::LuminanceMap;
use crate::types::Point;
use geo::line_measures::Distance;
use geo::{Euclidean, Point as GeoPoint};

/// A merged, directed line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// One endpoint.
    pub point_a: Point,
    /// The other endpoint.
    pub point_b: Point,
    /// Slope of the line through `point_a`/`point_b` (spec.md §4.5's
    /// `Δx = 1` sentinel applies for verticals — see [`geometry`]).
    pub slope: f64,
    /// Y-intercept of the same line.
    pub y_intercept: f64,
    /// Angle this segment makes with the horizontal, in radians.
    pub angle_with_horizontal: f64,
    /// Number of accumulator votes contributing to this segment at last
    /// commit. Not a union of all absorbed segments' pixels — merges are
    /// destructive, so this is the survivor's count after the last
    /// successful merge's densification pass.
    pub pixel_count: u32,
    /// Euclidean length between `point_a` and `point_b`.
    pub length: f64,
}

impl Segment {
    fn from_harvested(line: HarvestedLine) -> Self {
        Self::from_points(line.point_a, line.point_b, line.votes)
    }

    fn from_points(a: Point, b: Point, pixel_count: u32) -> Self {
        let (slope, y_intercept) = geometry::slope_intercept(a, b);
        Self {
            point_a: a,
            point_b: b,
            slope,
            y_intercept,
            angle_with_horizontal: geometry::angle_with_horizontal(a, b),
            pixel_count,
            length: geometry::length(a, b),
        }
    }
}

/// Merges [`HarvestedLine`]s into final [`Segment`]s.
pub struct Merger<'a> {
    luminance: &'a LuminanceMap,
    params: SharedParams,
}

impl<'a> Merger<'a> {
    /// Build a merger that densifies against `luminance` using `params`.
    #[must_use]
    pub const fn new(luminance: &'a LuminanceMap, params: SharedParams) -> Self {
        Self { luminance, params }
    }

    /// Merge `lines` into the smallest set of segments consistent with
    /// `params`.
    ///
    /// Processes lines one at a time, in the order the Harvester emitted
    /// them (spec.md §4.5): each candidate either merges into the first
    /// already-accepted segment it's collinear with and overlaps, or is
    /// admitted as a new segment. Later candidates are tested only
    /// against the accepted list as it stands *so far* — this is why
    /// emission order (spec.md §5's θ-outer/ρ-inner scan) is
    /// load-bearing: it decides which segment a given candidate ends up
    /// extending.
    #[must_use]
    pub fn merge(&self, lines: Vec<HarvestedLine>) -> Vec<Segment> {
        let mut accepted: Vec<Segment> = Vec::new();

        for line in lines {
            let candidate = Segment::from_harvested(line);
            let existing_match = accepted.iter().position(|e| {
                self.similar(e, &candidate) && self.endpoint_conditions(e, &candidate)
            });

            match existing_match {
                Some(idx) => match self.try_merge(accepted[idx], candidate) {
                    Some(extended) => accepted[idx] = extended,
                    // Density rollback: collinear and overlapping, but the
                    // combined span doesn't hold enough true edge pixels.
                    // Admit the candidate on its own rather than discard it.
                    None => accepted.push(candidate),
                },
                None => accepted.push(candidate),
            }
        }

        accepted
    }

    /// Slope+intercept similarity test (spec.md §4.5). Compares slopes
    /// directly, not angles — see `SPEC_FULL.md`'s Open Question
    /// resolutions.
    fn similar(&self, a: &Segment, b: &Segment) -> bool {
        (a.slope - b.slope).abs() <= self.params.angle_resolution
    }

    /// The 5 endpoint conditions of spec.md §4.5, any one of which makes
    /// `existing` (E) and `candidate` (C) overlap: `E.A.x` or `E.B.x`
    /// falls inside `[C.A.x, C.B.x]`, `|E.A.x - C.B.x|` or
    /// `|E.B.x - C.A.x|` is within `max_gap_between_dashes`, or `E.A` is
    /// within `min_point_resolution` of `C.A`.
    ///
    /// Relies on `point_a.x <= point_b.x` for both segments, which holds
    /// because the Harvester tracks endpoints via lexicographic
    /// (x, then y) order.
    fn endpoint_conditions(&self, existing: &Segment, candidate: &Segment) -> bool {
        let (cx_lo, cx_hi) = (candidate.point_a.x, candidate.point_b.x);
        if (cx_lo..=cx_hi).contains(&existing.point_a.x)
            || (cx_lo..=cx_hi).contains(&existing.point_b.x)
        {
            return true;
        }

        let max_gap = f64::from(self.params.max_gap_between_dashes);
        if f64::from(existing.point_a.x - candidate.point_b.x).abs() <= max_gap {
            return true;
        }
        if f64::from(existing.point_b.x - candidate.point_a.x).abs() <= max_gap {
            return true;
        }

        let min_resolution = f64::from(self.params.min_point_resolution);
        endpoint_distance(existing.point_a, candidate.point_a) <= min_resolution
    }

    /// Attempt to merge `a` and `b`, extending the combined span to the
    /// two most distant endpoints among the four, then densifying
    /// against the luminance map. Returns `None` if the densified
    /// pixel density falls below `min_pixel_density` (spec.md §4.5's
    /// "density rollback check").
    fn try_merge(&self, a: Segment, b: Segment) -> Option<Segment> {
        let candidates = [a.point_a, a.point_b, b.point_a, b.point_b];
        let (mut far_a, mut far_b, mut best) = (candidates[0], candidates[1], 0.0f64);
        for i in 0..candidates.len() {
            for j in (i + 1)..candidates.len() {
                let dist = candidates[i].distance(candidates[j]);
                if dist >= best {
                    best = dist;
                    far_a = candidates[i];
                    far_b = candidates[j];
                }
            }
        }

        let extended = Segment::from_points(far_a, far_b, a.pixel_count + b.pixel_count);
        let (confirmed, sampled) = self.densify(&extended);
        if sampled == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let density = f64::from(confirmed) / sampled as f64;
        if density < self.params.min_pixel_density {
            return None;
        }

        Some(Segment {
            pixel_count: confirmed,
            ..extended
        })
    }

    /// Walk integer x (or y, for near-vertical segments) across `segment`,
    /// checking 3 candidate y's (or x's) per step against the luminance
    /// map's edge flags (spec.md §4.5's post-admission densification).
    /// Returns `(confirmed_edge_samples, total_samples)`.
    fn densify(&self, segment: &Segment) -> (u32, u32) {
        let dims = self.luminance.dimensions();
        let steep = segment.slope.abs() > 1.0;

        let (lo, hi) = if steep {
            (
                segment.point_a.y.min(segment.point_b.y),
                segment.point_a.y.max(segment.point_b.y),
            )
        } else {
            (
                segment.point_a.x.min(segment.point_b.x),
                segment.point_a.x.max(segment.point_b.x),
            )
        };

        let mut confirmed = 0u32;
        let mut sampled = 0u32;
        for primary in lo..=hi {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let predicted = if steep {
                // x = (y - intercept) / slope, guarding the Δx=1 sentinel
                // slope the same way geometry::slope_intercept does.
                let slope = if segment.slope == 0.0 {
                    f64::EPSILON
                } else {
                    segment.slope
                };
                ((f64::from(primary) - segment.y_intercept) / slope).round() as i32
            } else {
                (segment.slope * f64::from(primary) + segment.y_intercept).round() as i32
            };

            for offset in [-1, 0, 1] {
                sampled += 1;
                let candidate = predicted + offset;
                let (x, y) = if steep {
                    (candidate, primary)
                } else {
                    (primary, candidate)
                };
                if x < 0 || y < 0 {
                    continue;
                }
                #[allow(clippy::cast_sign_loss)]
                let (x, y) = (x as u32, y as u32);
                if x >= dims.width || y >= dims.height {
                    continue;
                }
                if self.luminance.is_edge(x, y) {
                    confirmed += 1;
                    break;
                }
            }
        }
        (confirmed, sampled)
    }
}

/// Point-to-point distance via `geo`'s metric-space API, mirroring the
/// reference's use of `geo::Euclidean` for segment-overlap math.
fn endpoint_distance(a: Point, b: Point) -> f64 {
    let ga = GeoPoint::new(f64::from(a.x), f64::from(a.y));
    let gb = GeoPoint::new(f64::from(b.x), f64::from(b.y));
    Euclidean.distance(ga, gb)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pixel_source::PixelSource;
    use crate::types::Dimensions;

    struct VerticalStep {
        dims: Dimensions,
        split: u32,
    }

    impl PixelSource for VerticalStep {
        fn dimensions(&self) -> Dimensions {
            self.dims
        }

        fn pixel(&self, x: u32, _y: u32) -> (u8, u8, u8) {
            if x < self.split {
                (0, 0, 0)
            } else {
                (255, 255, 255)
            }
        }
    }

    fn params() -> SharedParams {
        SharedParams::default()
    }

    /// A source whose every pixel is an edge, so densification always
    /// confirms every sample and no merge is ever rolled back.
    struct AllEdges(Dimensions);

    impl PixelSource for AllEdges {
        fn dimensions(&self) -> Dimensions {
            self.0
        }

        fn pixel(&self, x: u32, _y: u32) -> (u8, u8, u8) {
            // Alternate columns black/white so the Sobel gradient fires
            // (and therefore every column's magnitude clears the default
            // edge_threshold) rather than producing a flat, edge-free field.
            if x % 2 == 0 { (0, 0, 0) } else { (255, 255, 255) }
        }
    }

    #[test]
    fn merges_two_collinear_overlapping_lines() {
        let dims = Dimensions {
            width: 100,
            height: 100,
        };
        let luminance = LuminanceMap::build(&AllEdges(dims), 1).unwrap();
        let merger = Merger::new(&luminance, params());

        // Two near-horizontal dashes along y = 50, a small gap between
        // them, close enough in slope and endpoint distance to merge.
        let lines = vec![
            HarvestedLine {
                point_a: Point::new(0, 50),
                point_b: Point::new(40, 50),
                votes: 100,
            },
            HarvestedLine {
                point_a: Point::new(45, 50),
                point_b: Point::new(99, 50),
                votes: 100,
            },
        ];

        let merged = merger.merge(lines);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].point_a, Point::new(0, 50));
        assert_eq!(merged[0].point_b, Point::new(99, 50));
    }

    #[test]
    fn does_not_merge_lines_with_different_slopes() {
        let dims = Dimensions {
            width: 100,
            height: 100,
        };
        let luminance = LuminanceMap::build(&VerticalStep { dims, split: 50 }, 25).unwrap();
        let merger = Merger::new(&luminance, params());

        let lines = vec![
            HarvestedLine {
                point_a: Point::new(0, 0),
                point_b: Point::new(10, 0),
                votes: 50,
            },
            HarvestedLine {
                point_a: Point::new(0, 0),
                point_b: Point::new(0, 10),
                votes: 50,
            },
        ];

        let merged = merger.merge(lines);
        assert_eq!(merged.len(), 2);
    }

    struct SolidGray(Dimensions, u8);

    impl PixelSource for SolidGray {
        fn dimensions(&self) -> Dimensions {
            self.0
        }

        fn pixel(&self, _x: u32, _y: u32) -> (u8, u8, u8) {
            (self.1, self.1, self.1)
        }
    }

    #[test]
    fn rolls_back_merge_when_density_is_too_low() {
        let dims = Dimensions {
            width: 100,
            height: 100,
        };
        // A flat field has no gradient anywhere, so densification always
        // finds zero confirmed edge pixels and the merge must roll back.
        let luminance = LuminanceMap::build(&SolidGray(dims, 128), 25).unwrap();
        let merger = Merger::new(&luminance, params());

        let lines = vec![
            HarvestedLine {
                point_a: Point::new(0, 50),
                point_b: Point::new(40, 50),
                votes: 50,
            },
            HarvestedLine {
                point_a: Point::new(45, 50),
                point_b: Point::new(99, 50),
                votes: 50,
            },
        ];
        let merged = merger.merge(lines);
        // Rollback admits the candidate on its own rather than extending
        // the accepted segment into it, so both survive unchanged.
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].point_a, Point::new(0, 50));
        assert_eq!(merged[0].point_b, Point::new(40, 50));
        assert_eq!(merged[1].point_a, Point::new(45, 50));
        assert_eq!(merged[1].point_b, Point::new(99, 50));
    }

    #[test]
    fn merges_when_endpoints_overlap_by_x_range_containment_alone() {
        let dims = Dimensions {
            width: 100,
            height: 100,
        };
        let luminance = LuminanceMap::build(&AllEdges(dims), 1).unwrap();
        let mut params = SharedParams::default();
        params.max_gap_between_dashes = 10;
        let merger = Merger::new(&luminance, params);

        // E=(10,50)-(60,50), C=(40,50)-(90,50): every endpoint pair is
        // more than max_gap_between_dashes apart, but E.B.x=60 falls
        // inside C's x-range [40,90], so the containment condition alone
        // must trigger the merge.
        let lines = vec![
            HarvestedLine {
                point_a: Point::new(10, 50),
                point_b: Point::new(60, 50),
                votes: 100,
            },
            HarvestedLine {
                point_a: Point::new(40, 50),
                point_b: Point::new(90, 50),
                votes: 100,
            },
        ];

        let merged = merger.merge(lines);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].point_a, Point::new(10, 50));
        assert_eq!(merged[0].point_b, Point::new(90, 50));
    }
}
