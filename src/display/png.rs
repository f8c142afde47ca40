//! Headless development panel.
//!
//! Renders each frame through `embedded-graphics-simulator`'s output image
//! and saves it as a PNG, so the whole pipeline can run on a machine without
//! the e-paper HAT. The file is overwritten on every refresh.

use std::path::{Path, PathBuf};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{BinaryColorTheme, OutputSettings, OutputSettingsBuilder, SimulatorDisplay};
use tracing::{debug, info};

use super::{DisplayError, Panel, check_frame_size};
use crate::canvas::Canvas;
use crate::config::SCREEN_SIZE;

pub struct PngPanel {
    display: SimulatorDisplay<BinaryColor>,
    settings: OutputSettings,
    output: PathBuf,
    awake: bool,
    frames: u64,
}

impl PngPanel {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            display: SimulatorDisplay::new(SCREEN_SIZE),
            // One PNG pixel per panel pixel; ink renders black, paper white
            settings: OutputSettingsBuilder::new()
                .scale(1)
                .pixel_spacing(0)
                .theme(BinaryColorTheme::Inverted)
                .build(),
            output: output.into(),
            awake: false,
            frames: 0,
        }
    }

    pub fn output(&self) -> &Path { &self.output }

    /// Frames written so far.
    pub const fn frames(&self) -> u64 { self.frames }
}

impl Panel for PngPanel {
    fn size(&self) -> Size { SCREEN_SIZE }

    fn init(&mut self) -> Result<(), DisplayError> {
        debug!(output = %self.output.display(), "png: init");
        self.awake = true;
        Ok(())
    }

    fn display(
        &mut self,
        frame: &Canvas,
    ) -> Result<(), DisplayError> {
        if !self.awake {
            return Err(DisplayError::Asleep);
        }
        check_frame_size(SCREEN_SIZE, frame)?;

        self.display.draw_iter(frame.pixels()).ok();
        self.display
            .to_rgb_output_image(&self.settings)
            .save_png(&self.output)
            .map_err(|e| DisplayError::Output(format!("{}: {e}", self.output.display())))?;

        self.frames += 1;
        info!(output = %self.output.display(), frame = self.frames, "Frame written");
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DisplayError> {
        debug!("png: sleep");
        self.awake = false;
        Ok(())
    }
}
