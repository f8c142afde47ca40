//! Clock widget: `HH:MM` in double-size digits with the date underneath.
//!
//! The time source is injected so tests can pin the wall clock.

use chrono::{Local, NaiveDateTime};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use heapless::String;

use super::{Provider, WidgetError};
use crate::canvas::Scaled;
use crate::styles::{HEADLINE_FONT, HEADLINE_STYLE, TOP_LEFT};

/// Magnification applied to the time digits.
pub const TIME_SCALE: u32 = 2;

/// Date line offset below the top of the widget.
const DATE_Y: i32 = (HEADLINE_FONT.character_size.height * TIME_SCALE) as i32 + 6;

type TimeSource = Box<dyn Fn() -> NaiveDateTime + Send>;

pub struct ClockProvider {
    now: TimeSource,
}

impl ClockProvider {
    /// Clock reading the host's local time.
    pub fn local() -> Self { Self::with_source(|| Local::now().naive_local()) }

    pub fn with_source<F>(now: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + 'static,
    {
        Self { now: Box::new(now) }
    }
}

impl Provider for ClockProvider {
    type Data = NaiveDateTime;

    const NAME: &'static str = "clock";

    fn fetch(&mut self) -> Result<NaiveDateTime, WidgetError> { Ok((self.now)()) }

    fn summarize(
        &self,
        data: &NaiveDateTime,
    ) -> std::string::String {
        data.format("%H:%M").to_string()
    }

    fn render<D>(
        &self,
        data: &NaiveDateTime,
        target: &mut D,
    ) -> Result<(), WidgetError>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        // "HH:MM" and "September 30, 2026" both fit in 24 bytes
        let mut time: String<24> = String::new();
        let mut date: String<24> = String::new();
        write_formatted(&mut time, data, "%H:%M")?;
        write_formatted(&mut date, data, "%B %d, %Y")?;

        Text::with_text_style(&time, Point::zero(), HEADLINE_STYLE, TOP_LEFT)
            .draw(&mut Scaled::new(target, TIME_SCALE))
            .ok();
        Text::with_text_style(&date, Point::new(0, DATE_Y), HEADLINE_STYLE, TOP_LEFT)
            .draw(target)
            .ok();
        Ok(())
    }
}

fn write_formatted(
    out: &mut String<24>,
    at: &NaiveDateTime,
    format: &str,
) -> Result<(), WidgetError> {
    use core::fmt::Write;

    write!(out, "{}", at.format(format)).map_err(|_| WidgetError::Draw(format!("'{format}' does not fit the label")))
}
