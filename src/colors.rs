//! Color constants for the monochrome e-paper panel.
//!
//! The panel has two luminance levels, so drawing uses `BinaryColor`:
//! `On` is ink (black) and `Off` is paper (white). A fresh canvas starts as
//! all paper.

use embedded_graphics::pixelcolor::BinaryColor;

/// Black pixel. Used for text, icons and dividers.
pub const INK: BinaryColor = BinaryColor::On;

/// White pixel. Background of every frame.
pub const PAPER: BinaryColor = BinaryColor::Off;
