//! 1-bit frame buffer shared by all widgets for one refresh cycle.
//!
//! The pixel storage uses the panel's native layout: rows of packed bits,
//! most significant bit first, a set bit meaning paper (white). The buffer
//! can therefore be streamed to the controller without conversion.
//!
//! Widgets never draw on the [`Canvas`] directly. The composer hands each of
//! them a [`Region`], a bounds-local view whose origin is the widget's
//! top-left corner and which drops any pixel outside the widget's bounds.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::colors::{INK, PAPER};
use crate::config::Bounds;

// =============================================================================
// Canvas
// =============================================================================

/// Panel-sized monochrome raster implementing `DrawTarget<Color = BinaryColor>`.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    size: Size,
    /// Bytes per row.
    stride: usize,
    bits: Vec<u8>,
}

impl core::fmt::Debug for Canvas {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("size", &self.size)
            .field("ink", &self.ink_count(&self.bounding_box()))
            .finish()
    }
}

impl Canvas {
    /// Allocate a canvas filled with paper.
    pub fn new(size: Size) -> Self {
        let stride = size.width.div_ceil(8) as usize;
        Self {
            size,
            stride,
            bits: vec![0xFF; stride * size.height as usize],
        }
    }

    /// Packed frame in panel byte order (bit set = paper).
    #[inline]
    pub fn as_bytes(&self) -> &[u8] { &self.bits }

    /// Color at an absolute coordinate, `None` outside the canvas.
    pub fn pixel(
        &self,
        point: Point,
    ) -> Option<BinaryColor> {
        let (byte, mask) = self.locate(point)?;
        Some(if self.bits[byte] & mask == 0 { INK } else { PAPER })
    }

    /// Number of ink pixels inside `area` (clamped to the canvas).
    pub fn ink_count(
        &self,
        area: &Rectangle,
    ) -> usize {
        area.intersection(&self.bounding_box())
            .points()
            .filter(|p| self.pixel(*p) == Some(INK))
            .count()
    }

    /// Every pixel of the frame, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel<BinaryColor>> + '_ {
        self.bounding_box()
            .points()
            .map(|p| Pixel(p, self.pixel(p).unwrap_or(PAPER)))
    }

    /// Bounds-local drawing handle for one widget.
    pub fn region(
        &mut self,
        bounds: Bounds,
    ) -> Region<'_> {
        Region {
            area: bounds.rectangle().intersection(&self.bounding_box()),
            offset: bounds.top_left(),
            size: bounds.size(),
            canvas: self,
        }
    }

    #[inline]
    fn locate(
        &self,
        point: Point,
    ) -> Option<(usize, u8)> {
        if point.x < 0 || point.y < 0 || point.x as u32 >= self.size.width || point.y as u32 >= self.size.height {
            return None;
        }
        let x = point.x as usize;
        let byte = point.y as usize * self.stride + x / 8;
        Some((byte, 0x80 >> (x % 8)))
    }

    #[inline]
    fn set_pixel(
        &mut self,
        point: Point,
        color: BinaryColor,
    ) {
        if let Some((byte, mask)) = self.locate(point) {
            match color {
                BinaryColor::On => self.bits[byte] &= !mask,
                BinaryColor::Off => self.bits[byte] |= mask,
            }
        }
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size { self.size }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        for point in area.intersection(&self.bounding_box()).points() {
            self.set_pixel(point, color);
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let fill = if color == PAPER { 0xFF } else { 0x00 };
        self.bits.fill(fill);
        Ok(())
    }
}

// =============================================================================
// Region
// =============================================================================

/// Widget view into the canvas: local coordinates, clipped to the bounds.
pub struct Region<'a> {
    canvas: &'a mut Canvas,
    /// Absolute area pixels may land in.
    area: Rectangle,
    offset: Point,
    size: Size,
}

impl Region<'_> {
    /// Reset the whole region to paper.
    pub fn wipe(&mut self) {
        let area = self.area;
        self.canvas.fill_solid(&area, PAPER).ok();
    }
}

impl OriginDimensions for Region<'_> {
    fn size(&self) -> Size { self.size }
}

impl DrawTarget for Region<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let area = self.area;
        let offset = self.offset;
        self.canvas.draw_iter(
            pixels
                .into_iter()
                .map(|Pixel(p, c)| Pixel(p + offset, c))
                .filter(|Pixel(p, _)| area.contains(*p)),
        )
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let absolute = Rectangle::new(area.top_left + self.offset, area.size).intersection(&self.area);
        self.canvas.fill_solid(&absolute, color)
    }
}

// =============================================================================
// Scaled
// =============================================================================

/// Draw target that magnifies every pixel into a `factor` x `factor` block.
///
/// Used for the clock digits, which are larger than any bundled font.
pub struct Scaled<'a, D> {
    parent: &'a mut D,
    factor: u32,
}

impl<'a, D> Scaled<'a, D>
where
    D: DrawTarget,
{
    pub fn new(
        parent: &'a mut D,
        factor: u32,
    ) -> Self {
        Self {
            parent,
            factor: factor.max(1),
        }
    }
}

impl<D> Dimensions for Scaled<'_, D>
where
    D: DrawTarget,
{
    fn bounding_box(&self) -> Rectangle {
        let parent = self.parent.bounding_box();
        Rectangle::new(
            parent.top_left / self.factor as i32,
            Size::new(parent.size.width / self.factor, parent.size.height / self.factor),
        )
    }
}

impl<D> DrawTarget for Scaled<'_, D>
where
    D: DrawTarget,
{
    type Color = D::Color;
    type Error = D::Error;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let factor = self.factor;
        for Pixel(point, color) in pixels {
            let block = Rectangle::new(point * factor as i32, Size::new(factor, factor));
            self.parent.fill_solid(&block, color)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
