//! Low-level drawing primitives shared across widgets.
//!
//! Everything here draws into any `DrawTarget<Color = BinaryColor>` using
//! coordinates local to that target, so the same helpers work on a widget
//! [`Region`](crate::canvas::Region) and on a plain test canvas.
//!
//! # Icons
//!
//! Icons are built from primitives rather than bitmaps. Each takes the
//! top-left corner of its bounding square:
//!
//! | Icon | Size | Used by |
//! |------|------|---------|
//! | news | 40x40 | one per headline row |
//! | heart | 20x18 | likes in the social stats row |
//! | speech | 22x20 | replies in the social stats row |
//! | warning | 40x36 | error placeholder |
//!
//! # Text Helpers
//!
//! Fonts are monospace, so [`wrap_lines`] works in whole glyphs: a line
//! holds `(max_width + spacing) / advance` characters. Words longer than a
//! full line are broken hard.

use core::fmt::Write;

use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle,
    Line,
    PrimitiveStyle,
    PrimitiveStyleBuilder,
    Rectangle,
    RoundedRectangle,
    StrokeAlignment,
    Triangle,
};
use embedded_graphics::text::Text;
use heapless::String;

use super::ErrorKind;
use crate::colors::{INK, PAPER};
use crate::styles::{COMPACT_FONT, INVERTED_STYLE, TOP_LEFT, char_advance, text_width};

// Shared stroke/fill styles
const INK_STROKE: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(INK, 1);
// 2px outlines stay inside the shape so icons never exceed their squares
const INK_STROKE_2: PrimitiveStyle<BinaryColor> = PrimitiveStyleBuilder::new()
    .stroke_color(INK)
    .stroke_width(2)
    .stroke_alignment(StrokeAlignment::Inside)
    .build();
const INK_FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(INK);
const PAPER_FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(PAPER);

/// Side length of the news icon.
pub const NEWS_ICON_SIZE: u32 = 40;

// =============================================================================
// Error Placeholder
// =============================================================================

/// Draw the placeholder shown instead of a widget's content while its error
/// slot is set.
///
/// Layout, relative to the target's bounding box:
/// - 1px outline around the whole area
/// - warning triangle centered horizontally, a third of the way down
/// - inverted label banner (`fetch error`, `bad data`, `draw error`) below it
///
/// Only draws; wiping stale content first is the caller's job.
pub fn draw_error_placeholder<D>(
    target: &mut D,
    kind: ErrorKind,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    let area = target.bounding_box();
    if area.size.width < 4 || area.size.height < 4 {
        return;
    }

    area.into_styled(INK_STROKE).draw(target).ok();

    let center_x = area.top_left.x + area.size.width as i32 / 2;
    let icon_top = area.top_left.y + area.size.height as i32 / 3 - 18;
    draw_warning_icon(target, Point::new(center_x - 20, icon_top.max(area.top_left.y + 2)));

    let label = kind.label();
    let label_width = text_width(COMPACT_FONT, label.len());
    let banner = Rectangle::new(
        Point::new(center_x - label_width as i32 / 2 - 6, icon_top + 44),
        Size::new(label_width + 12, COMPACT_FONT.character_size.height + 6),
    );
    banner.into_styled(INK_FILL).draw(target).ok();
    Text::with_text_style(label, banner.top_left + Point::new(6, 3), INVERTED_STYLE, TOP_LEFT)
        .draw(target)
        .ok();
}

// =============================================================================
// Lines
// =============================================================================

/// Horizontal 1px-thick divider starting at `origin`.
pub fn draw_divider<D>(
    target: &mut D,
    origin: Point,
    width: u32,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    if width == 0 {
        return;
    }
    Line::new(origin, origin + Point::new(width as i32 - 1, 0))
        .into_styled(INK_STROKE)
        .draw(target)
        .ok();
}

// =============================================================================
// Icons
// =============================================================================

/// Folded newspaper: frame, masthead bar and three text lines.
pub fn draw_news_icon<D>(
    target: &mut D,
    origin: Point,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    RoundedRectangle::with_equal_corners(
        Rectangle::new(origin + Point::new(2, 4), Size::new(36, 32)),
        Size::new(4, 4),
    )
    .into_styled(INK_STROKE_2)
    .draw(target)
    .ok();

    Rectangle::new(origin + Point::new(7, 9), Size::new(26, 6))
        .into_styled(INK_FILL)
        .draw(target)
        .ok();

    for row in 0..3 {
        let y = origin.y + 19 + row * 5;
        Line::new(Point::new(origin.x + 7, y), Point::new(origin.x + 32, y))
            .into_styled(INK_STROKE)
            .draw(target)
            .ok();
    }
}

/// Filled heart: two circles over a downward triangle.
pub fn draw_heart_icon<D>(
    target: &mut D,
    origin: Point,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    Circle::new(origin, 11).into_styled(INK_FILL).draw(target).ok();
    Circle::new(origin + Point::new(9, 0), 11)
        .into_styled(INK_FILL)
        .draw(target)
        .ok();
    Triangle::new(
        origin + Point::new(0, 7),
        origin + Point::new(19, 7),
        origin + Point::new(10, 17),
    )
    .into_styled(INK_FILL)
    .draw(target)
    .ok();
}

/// Outlined speech bubble with a tail at the bottom left.
pub fn draw_speech_icon<D>(
    target: &mut D,
    origin: Point,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    RoundedRectangle::with_equal_corners(Rectangle::new(origin, Size::new(22, 15)), Size::new(6, 6))
        .into_styled(INK_STROKE_2)
        .draw(target)
        .ok();
    Triangle::new(
        origin + Point::new(4, 13),
        origin + Point::new(10, 13),
        origin + Point::new(3, 19),
    )
    .into_styled(INK_FILL)
    .draw(target)
    .ok();
}

/// Warning triangle with an exclamation mark.
pub fn draw_warning_icon<D>(
    target: &mut D,
    origin: Point,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    Triangle::new(
        origin + Point::new(20, 0),
        origin + Point::new(0, 35),
        origin + Point::new(39, 35),
    )
    .into_styled(INK_FILL)
    .draw(target)
    .ok();

    // Exclamation mark punched out in paper
    Rectangle::new(origin + Point::new(18, 11), Size::new(4, 13))
        .into_styled(PAPER_FILL)
        .draw(target)
        .ok();
    Rectangle::new(origin + Point::new(18, 27), Size::new(4, 4))
        .into_styled(PAPER_FILL)
        .draw(target)
        .ok();
}

// =============================================================================
// Text Helpers
// =============================================================================

/// Number of glyphs of `font` that fit in `max_width` pixels (at least one).
pub const fn chars_per_line(
    font: &MonoFont<'_>,
    max_width: u32,
) -> usize {
    let per_line = (max_width + font.character_spacing) / char_advance(font);
    if per_line == 0 { 1 } else { per_line as usize }
}

/// Greedy word wrap of `text` to `max_width` pixels in `font`.
///
/// Runs of whitespace (including newlines) collapse to a single break
/// opportunity. Words wider than a line are split across lines.
pub fn wrap_lines(
    text: &str,
    font: &MonoFont<'_>,
    max_width: u32,
) -> Vec<std::string::String> {
    let limit = chars_per_line(font, max_width);
    let mut lines = Vec::new();
    let mut current = std::string::String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();

        // Word fits after a space on the current line
        if current_len > 0 && current_len + 1 + chars.len() <= limit {
            current.push(' ');
            current.extend(chars.iter());
            current_len += 1 + chars.len();
            continue;
        }

        if current_len > 0 {
            lines.push(core::mem::take(&mut current));
        }

        // Hard-break words longer than a full line
        while chars.len() > limit {
            let rest = chars.split_off(limit);
            lines.push(chars.iter().collect());
            chars = rest;
        }
        current.extend(chars.iter());
        current_len = chars.len();
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}

/// Abbreviate a counter for the stats row.
///
/// | Range | Format | Example |
/// |-------|--------|---------|
/// | `< 1 000` | verbatim | `999` |
/// | `< 10 000` | one decimal `K` | `1.2K` |
/// | `< 1 000 000` | integer `K` | `45K` |
/// | `< 10 000 000` | one decimal `M` | `2.5M` |
/// | otherwise | integer `M` | `12M` |
///
/// Digits are truncated, never rounded up, so a value never reads as the
/// next unit. A trailing `.0` is dropped (`1000` reads `1K`).
pub fn format_count(count: u64) -> String<24> {
    let mut s: String<24> = String::new();
    match count {
        0..1_000 => write!(s, "{count}").ok(),
        1_000..10_000 => write_tenths(&mut s, count / 100, 'K'),
        10_000..1_000_000 => write!(s, "{}K", count / 1_000).ok(),
        1_000_000..10_000_000 => write_tenths(&mut s, count / 100_000, 'M'),
        _ => write!(s, "{}M", count / 1_000_000).ok(),
    };
    s
}

fn write_tenths(
    s: &mut String<24>,
    tenths: u64,
    unit: char,
) -> Option<()> {
    let (whole, frac) = (tenths / 10, tenths % 10);
    if frac == 0 {
        write!(s, "{whole}{unit}").ok()
    } else {
        write!(s, "{whole}.{frac}{unit}").ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
