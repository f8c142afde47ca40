//! Panel backends.
//!
//! - [`epd7in5`]: UC8179 driver for the Waveshare 7.5" V2 over `embedded-hal`
//! - [`png`]: headless panel writing every frame to a PNG file
//! - `linux` (feature `hardware`): wires the driver to spidev and sysfs GPIO
//!
//! The scheduler owns the panel and drives it through [`Panel`]. A panel
//! tracks whether it is awake; pushing a frame to a sleeping panel is an
//! error, not a silent re-init.

pub mod epd7in5;
#[cfg(feature = "hardware")]
pub mod linux;
pub mod png;

use embedded_graphics::prelude::Size;
use thiserror::Error;

use crate::canvas::Canvas;

/// Device-level failure. Fatal to the refresh loop.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("SPI transfer failed: {0}")]
    Spi(String),
    #[error("GPIO access failed: {0}")]
    Pin(String),
    #[error("panel still busy after {0} ms")]
    BusyTimeout(u32),
    #[error("frame is {actual:?}, panel is {expected:?}")]
    FrameSize { expected: Size, actual: Size },
    #[error("display() called while the panel is asleep")]
    Asleep,
    #[error("frame output failed: {0}")]
    Output(String),
}

/// Physical (or emulated) monochrome panel.
pub trait Panel {
    /// Native resolution; frames must match it exactly.
    fn size(&self) -> Size;

    /// Wake the panel and make it ready to accept a frame.
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Push a full frame and trigger a refresh.
    fn display(
        &mut self,
        frame: &Canvas,
    ) -> Result<(), DisplayError>;

    /// Put the panel into its low-power state.
    fn sleep(&mut self) -> Result<(), DisplayError>;
}

/// Reject frames whose size differs from the panel's.
pub(crate) fn check_frame_size(
    expected: Size,
    frame: &Canvas,
) -> Result<(), DisplayError> {
    use embedded_graphics::prelude::OriginDimensions;

    let actual = frame.size();
    if actual == expected {
        Ok(())
    } else {
        Err(DisplayError::FrameSize { expected, actual })
    }
}
