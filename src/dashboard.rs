//! Frame composition.
//!
//! Each render allocates a fresh all-paper [`Canvas`], lets every widget
//! update and then draw in registration order, and hands the result to the
//! panel. A frame is produced even when every widget is failing; the failing
//! ones just show their placeholders.

use embedded_graphics::prelude::Size;
use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::config::SCREEN_SIZE;
use crate::display::{DisplayError, Panel};
use crate::widgets::{Widget, WidgetState};

pub struct Dashboard {
    widgets: Vec<Box<dyn Widget>>,
    size: Size,
}

impl Dashboard {
    pub fn new(widgets: Vec<Box<dyn Widget>>) -> Self { Self::with_size(widgets, SCREEN_SIZE) }

    pub fn with_size(
        widgets: Vec<Box<dyn Widget>>,
        size: Size,
    ) -> Self {
        Self { widgets, size }
    }

    /// Widgets in draw order.
    pub fn widgets(&self) -> &[Box<dyn Widget>] { &self.widgets }

    /// Update and draw every widget onto a new canvas.
    pub fn compose(&mut self) -> Canvas {
        let mut canvas = Canvas::new(self.size);
        for widget in &mut self.widgets {
            debug!(widget = widget.name(), "Updating");
            widget.update_data();
            widget.draw(&mut canvas);
        }
        canvas
    }

    /// Compose a frame and push it to `panel`.
    pub fn render<P>(
        &mut self,
        panel: &mut P,
    ) -> Result<(), DisplayError>
    where
        P: Panel + ?Sized,
    {
        let frame = self.compose();
        let failing = self.widgets.iter().filter(|w| w.state() == WidgetState::Error).count();
        info!(widgets = self.widgets.len(), failing, "Frame composed");
        panel.display(&frame)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
