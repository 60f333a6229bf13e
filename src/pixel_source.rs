//! Abstract pixel input for the detector (spec.md §6).
//!
//! The detector never reads files itself — bitmap decoding is an external
//! collaborator's job (spec.md §1). `PixelSource` is the seam: anything
//! that can report its dimensions and hand back an RGB triple per pixel
//! can feed [`crate::luminance::LuminanceMap::build`].

use crate::types::Dimensions;
use image::{GenericImageView, Rgb};

/// A source of pixels for detection.
///
/// Implementors only need to support random-access reads; the detector
/// never assumes row-major iteration order.
pub trait PixelSource {
    /// The source's width and height in pixels.
    fn dimensions(&self) -> Dimensions;

    /// The RGB value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Implementors may panic if `(x, y)` is outside `dimensions()`.
    /// Callers within this crate never query out of bounds.
    fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8);
}

/// A [`PixelSource`] backed by any `image` crate view (`RgbImage`,
/// `DynamicImage`, a sub-image view, …).
pub struct ImageSource<I> {
    image: I,
}

impl<I> ImageSource<I>
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    /// Wrap an existing RGB-capable image view.
    pub const fn new(image: I) -> Self {
        Self { image }
    }
}

impl<I> PixelSource for ImageSource<I>
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    fn dimensions(&self) -> Dimensions {
        let (width, height) = self.image.dimensions();
        Dimensions { width, height }
    }

    fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        let Rgb([r, g, b]) = self.image.get_pixel(x, y);
        (r, g, b)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn image_source_reports_dimensions() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let source = ImageSource::new(img);
        let dims = source.dimensions();
        assert_eq!(dims.width, 4);
        assert_eq!(dims.height, 3);
    }

    #[test]
    fn image_source_reads_pixel_channels() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([200, 100, 50]));
        let source = ImageSource::new(img);
        assert_eq!(source.pixel(1, 0), (200, 100, 50));
        assert_eq!(source.pixel(0, 0), (0, 0, 0));
    }
}
