//! Panel geometry and the widget layout registry.
//!
//! Every widget gets one rectangle from [`WIDGET_BOUNDS`], indexed by the
//! constants in [`slot`]. The table is the only coupling between widgets'
//! screen placement; the regions are arranged so they do not overlap, but
//! nothing checks that at runtime.
//!
//! ```text
//! ┌──────────────────────┬──────────────────────┐
//! │ CLOCK    380x100     │ SOCIAL   380x460     │
//! ├──────────────────────┤                      │
//! │ NEWS     380x340     │                      │
//! │                      │                      │
//! │                      │                      │
//! └──────────────────────┴──────────────────────┘
//! ```

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;

// =============================================================================
// Display Configuration
// =============================================================================

/// Panel width in pixels (Waveshare 7.5" V2: 800x480).
pub const SCREEN_WIDTH: u32 = 800;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: u32 = 480;

/// Full panel size.
pub const SCREEN_SIZE: Size = Size::new(SCREEN_WIDTH, SCREEN_HEIGHT);

// =============================================================================
// Bounds
// =============================================================================

/// Rectangular screen region permanently assigned to one widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub const fn new(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn top_left(&self) -> Point { Point::new(self.x as i32, self.y as i32) }

    #[inline]
    pub const fn size(&self) -> Size { Size::new(self.width, self.height) }

    #[inline]
    pub const fn rectangle(&self) -> Rectangle { Rectangle::new(self.top_left(), self.size()) }

    /// Whether two regions share at least one pixel.
    pub const fn overlaps(
        &self,
        other: &Self,
    ) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

// =============================================================================
// Widget Slots
// =============================================================================

/// Number of widget slots on the panel.
pub const SLOT_COUNT: usize = 3;

/// Slot indices into [`WIDGET_BOUNDS`].
pub mod slot {
    pub const CLOCK: usize = 0;
    pub const NEWS: usize = 1;
    pub const SOCIAL: usize = 2;
}

/// Outer margin kept free around the edge of the panel.
pub const MARGIN: u32 = 10;

/// Width of one of the two content columns.
pub const COLUMN_WIDTH: u32 = (SCREEN_WIDTH - 4 * MARGIN) / 2;

/// Fixed widget regions, in slot order.
pub const WIDGET_BOUNDS: [Bounds; SLOT_COUNT] = [
    // Clock: top of the left column
    Bounds::new(MARGIN, MARGIN, COLUMN_WIDTH, 100),
    // News: rest of the left column
    Bounds::new(MARGIN, 130, COLUMN_WIDTH, SCREEN_HEIGHT - 130 - MARGIN),
    // Social feed: whole right column
    Bounds::new(3 * MARGIN + COLUMN_WIDTH, MARGIN, COLUMN_WIDTH, SCREEN_HEIGHT - 2 * MARGIN),
];

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_indices() {
        assert_eq!(slot::CLOCK, 0);
        assert_eq!(slot::NEWS, 1);
        assert_eq!(slot::SOCIAL, 2);
    }

    #[test]
    fn test_bounds_fit_on_screen() {
        for bounds in WIDGET_BOUNDS {
            assert!(bounds.x + bounds.width <= SCREEN_WIDTH, "{bounds:?} exceeds width");
            assert!(bounds.y + bounds.height <= SCREEN_HEIGHT, "{bounds:?} exceeds height");
        }
    }

    #[test]
    fn test_layout_regions_are_disjoint() {
        for (i, a) in WIDGET_BOUNDS.iter().enumerate() {
            for b in &WIDGET_BOUNDS[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_bounds_rectangle() {
        let rect = Bounds::new(1, 2, 3, 4).rectangle();
        assert_eq!(rect.top_left, Point::new(1, 2));
        assert_eq!(rect.size, Size::new(3, 4));
    }
}
