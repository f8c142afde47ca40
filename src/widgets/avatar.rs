//! Profile picture conversion for the 1-bit panel.
//!
//! Pipeline: decode (PNG/JPEG) -> center-crop resize to [`AVATAR_SIZE`] ->
//! circular mask composited over opaque white -> Floyd-Steinberg dither to
//! black and white -> pack into an `ImageRaw`-compatible bitmap.

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use image::imageops::{self, BiLevel, FilterType};
use image::{DynamicImage, GrayImage, Luma, Rgba};

use super::WidgetError;

/// Side length of the square avatar in pixels.
pub const AVATAR_SIZE: u32 = 64;

const ROW_BYTES: usize = AVATAR_SIZE.div_ceil(8) as usize;

/// Dithered avatar, MSB first, set bit = ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Avatar {
    bits: Vec<u8>,
}

impl Avatar {
    /// Decode an encoded image and convert it.
    pub fn from_image_bytes(bytes: &[u8]) -> Result<Self, WidgetError> {
        let image = image::load_from_memory(bytes).map_err(|e| WidgetError::Parse(format!("avatar image: {e}")))?;
        Ok(Self::from_image(&image))
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        let fitted = image.resize_to_fill(AVATAR_SIZE, AVATAR_SIZE, FilterType::Lanczos3).to_rgba8();

        let mut gray = GrayImage::from_fn(AVATAR_SIZE, AVATAR_SIZE, |x, y| {
            if in_circle(x, y) {
                Luma([over_white(*fitted.get_pixel(x, y))])
            } else {
                Luma([u8::MAX])
            }
        });
        imageops::dither(&mut gray, &BiLevel);

        let mut bits = vec![0u8; ROW_BYTES * AVATAR_SIZE as usize];
        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel.0[0] < 128 {
                bits[y as usize * ROW_BYTES + x as usize / 8] |= 0x80 >> (x % 8);
            }
        }
        Self { bits }
    }

    /// Whether the pixel at `(x, y)` is ink.
    pub fn is_ink(
        &self,
        x: u32,
        y: u32,
    ) -> bool {
        if x >= AVATAR_SIZE || y >= AVATAR_SIZE {
            return false;
        }
        self.bits[y as usize * ROW_BYTES + x as usize / 8] & (0x80 >> (x % 8)) != 0
    }

    pub fn draw<D>(
        &self,
        target: &mut D,
        origin: Point,
    ) where
        D: DrawTarget<Color = BinaryColor>,
    {
        let raw: ImageRaw<'_, BinaryColor> = ImageRaw::new(&self.bits, AVATAR_SIZE);
        Image::new(&raw, origin).draw(target).ok();
    }
}

/// Pixel-center test against the inscribed circle.
fn in_circle(
    x: u32,
    y: u32,
) -> bool {
    // Doubled coordinates keep the pixel centers integral
    let r = i64::from(AVATAR_SIZE);
    let dx = 2 * i64::from(x) + 1 - r;
    let dy = 2 * i64::from(y) + 1 - r;
    dx * dx + dy * dy <= r * r
}

/// Luminance of `pixel` alpha-composited over white.
fn over_white(pixel: Rgba<u8>) -> u8 {
    let [r, g, b, a] = pixel.0.map(u32::from);
    let blend = |c: u32| (c * a + 255 * (255 - a)) / 255;
    // ITU-R BT.601 luma weights, scaled by 1000
    ((blend(r) * 299 + blend(g) * 587 + blend(b) * 114) / 1000) as u8
}

// =============================================================================
// Unit Tests
// =============================================================================
