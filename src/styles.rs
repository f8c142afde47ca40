//! Pre-computed text styles shared by the widgets.
//!
//! `MonoTextStyle` and `TextStyle` objects are `const`, so drawing code
//! references them directly instead of rebuilding them for every line.
//!
//! # Font Sizes
//!
//! | Constant | Font | Used for |
//! |----------|------|----------|
//! | `HEADLINE_FONT` | `ProFont` 24pt | clock digits (scaled 2x), date, display name |
//! | `BODY_FONT` | `ProFont` 18pt | headlines, post text, handle |
//! | `COMPACT_FONT` | `ProFont` 14pt | long post text, stats row, error label |

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::text::{Alignment, Baseline, TextStyle, TextStyleBuilder};
use profont::{PROFONT_14_POINT, PROFONT_18_POINT, PROFONT_24_POINT};

use crate::colors::{INK, PAPER};

// =============================================================================
// Text Alignment Styles
// =============================================================================

/// Left-aligned text positioned by its top edge. Widgets lay out lines from
/// the top of their bounds, so this is the default for all body text.
pub const TOP_LEFT: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

// =============================================================================
// Font References
// =============================================================================

pub const HEADLINE_FONT: &MonoFont<'static> = &PROFONT_24_POINT;

pub const BODY_FONT: &MonoFont<'static> = &PROFONT_18_POINT;

pub const COMPACT_FONT: &MonoFont<'static> = &PROFONT_14_POINT;

// =============================================================================
// Pre-computed Text Styles
// =============================================================================

pub const HEADLINE_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(HEADLINE_FONT, INK);

pub const BODY_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(BODY_FONT, INK);

pub const COMPACT_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(COMPACT_FONT, INK);

/// Paper-on-ink text for the error label banner.
pub const INVERTED_STYLE: MonoTextStyle<'static, BinaryColor> = MonoTextStyle::new(COMPACT_FONT, PAPER);

/// Horizontal advance of one glyph, including inter-character spacing.
#[inline]
pub const fn char_advance(font: &MonoFont<'_>) -> u32 { font.character_size.width + font.character_spacing }

/// Width in pixels of `chars` glyphs set in `font` (no trailing spacing).
pub const fn text_width(
    font: &MonoFont<'_>,
    chars: usize,
) -> u32 {
    if chars == 0 {
        0
    } else {
        chars as u32 * char_advance(font) - font.character_spacing
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
