//! Luminance and gradient map (spec.md §4.1).
//!
//! Converts an arbitrary [`PixelSource`] into a dense grid of
//! [`LuminanceEntry`] values: grayscale intensity, Sobel gradient, an
//! edge flag, and a coarse compass direction. Everything downstream
//! (the [`crate::voter::Voter`] and [`crate::accumulator::Accumulator`])
//! reads only from this grid.

use crate::pixel_source::PixelSource;
use crate::types::{Dimensions, DetectorError, GradientDirection};

/// Dead-band, in raw Sobel units, within which the orthogonal gradient
/// component is treated as zero when classifying direction (spec.md §4.1).
const DIRECTION_DEAD_BAND: i32 = 10;

/// One pixel's worth of luminance/gradient data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LuminanceEntry {
    /// Grayscale intensity, `round(0.30R + 0.59G + 0.11B)`.
    pub gray: u8,
    /// Whether the Sobel gradient magnitude exceeds the configured
    /// `edge_threshold`.
    pub is_edge: bool,
    /// Horizontal Sobel response, `Gx`.
    pub gradient_x: i32,
    /// Vertical Sobel response, `Gy`.
    pub gradient_y: i32,
    /// Sobel gradient magnitude, `round(sqrt(Gx^2 + Gy^2))`.
    pub gradient_mag: i32,
    /// Coarse compass classification of `(Gx, Gy)`.
    pub gradient_dir: GradientDirection,
}

/// A dense luminance/gradient grid over an entire image.
///
/// Border pixels use edge-replicated neighbors for the Sobel convolution
/// (the row/column just outside the image is treated as a copy of the
/// nearest real row/column), so every pixel — including the four
/// corners — gets a well-defined gradient with no special-cased `None`.
#[derive(Debug, Clone)]
pub struct LuminanceMap {
    dims: Dimensions,
    entries: Vec<LuminanceEntry>,
}

/// Horizontal Sobel kernel.
const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Vertical Sobel kernel.
///
/// `Gy = (2·above + above_left + above_right) - (2·below + below_left +
/// below_right)` (spec.md §4.1): the row above (`ky=0`) carries positive
/// weight, the row below (`ky=2`) negative.
const SOBEL_Y: [[i32; 3]; 3] = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];

impl LuminanceMap {
    /// Build a luminance map from any [`PixelSource`].
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::InvalidInput`] if the source has zero
    /// width or height.
    pub fn build(source: &dyn PixelSource, edge_threshold: i32) -> Result<Self, DetectorError> {
        let dims = source.dimensions();
        if dims.width == 0 || dims.height == 0 {
            return Err(DetectorError::InvalidInput(
                "image has zero width or height".to_string(),
            ));
        }

        let gray = Self::grayscale_grid(source, dims);
        let mut entries = Vec::with_capacity(gray.len());
        for y in 0..dims.height {
            for x in 0..dims.width {
                let gx = Self::convolve(&gray, dims, x, y, &SOBEL_X);
                let gy = Self::convolve(&gray, dims, x, y, &SOBEL_Y);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let gradient_mag =
                    (f64::from(gx).hypot(f64::from(gy))).round() as i32;
                entries.push(LuminanceEntry {
                    gray: gray[Self::index(dims, x, y)],
                    is_edge: gradient_mag > edge_threshold,
                    gradient_x: gx,
                    gradient_y: gy,
                    gradient_mag,
                    gradient_dir: classify_direction(gx, gy),
                });
            }
        }

        Ok(Self { dims, entries })
    }

    /// The map's dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// The entry at `(x, y)`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<LuminanceEntry> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        Some(self.entries[Self::index(self.dims, x, y)])
    }

    /// Whether `(x, y)` is an edge pixel. `false` if out of bounds.
    #[must_use]
    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(|e| e.is_edge)
    }

    fn grayscale_grid(source: &dyn PixelSource, dims: Dimensions) -> Vec<u8> {
        let mut gray = Vec::with_capacity((dims.width * dims.height) as usize);
        for y in 0..dims.height {
            for x in 0..dims.width {
                let (r, g, b) = source.pixel(x, y);
                gray.push(luminance(r, g, b));
            }
        }
        gray
    }

    const fn index(dims: Dimensions, x: u32, y: u32) -> usize {
        (y * dims.width + x) as usize
    }

    /// Convolve `kernel` at `(x, y)`, replicating the border for samples
    /// that fall outside the image.
    fn convolve(gray: &[u8], dims: Dimensions, x: u32, y: u32, kernel: &[[i32; 3]; 3]) -> i32 {
        let mut acc = 0i32;
        for (ky, row) in kernel.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                if *weight == 0 {
                    continue;
                }
                let sx = clamp_offset(x, kx, dims.width);
                let sy = clamp_offset(y, ky, dims.height);
                acc += weight * i32::from(gray[Self::index(dims, sx, sy)]);
            }
        }
        acc
    }
}

/// Round `round(0.30R + 0.59G + 0.11B)` to a `u8` (spec.md §4.1).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let value = 0.30 * f64::from(r) + 0.59 * f64::from(g) + 0.11 * f64::from(b);
    value.round().clamp(0.0, 255.0) as u8
}

/// Map a kernel offset (`0..=2`, centered on 1) plus a coordinate to a
/// clamped (border-replicated) source coordinate.
fn clamp_offset(coord: u32, kernel_index: usize, extent: u32) -> u32 {
    let signed = i64::from(coord) + kernel_index as i64 - 1;
    signed.clamp(0, i64::from(extent) - 1) as u32
}

/// Classify `(Gx, Gy)` into one of the 8 compass codes (spec.md §4.1),
/// treating the minor axis as zero within [`DIRECTION_DEAD_BAND`].
fn classify_direction(gx: i32, gy: i32) -> GradientDirection {
    if gy.abs() <= DIRECTION_DEAD_BAND {
        return if gx >= 0 {
            GradientDirection::WestToEast
        } else {
            GradientDirection::EastToWest
        };
    }
    if gx.abs() <= DIRECTION_DEAD_BAND {
        return if gy < 0 {
            GradientDirection::NorthToSouth
        } else {
            GradientDirection::SouthToNorth
        };
    }
    match (gx >= 0, gy < 0) {
        (true, true) => GradientDirection::NortheastToSouthwest,
        (false, true) => GradientDirection::NorthwestToSoutheast,
        (false, false) => GradientDirection::SouthwestToNortheast,
        (true, false) => GradientDirection::SoutheastToNorthwest,
    }
}
