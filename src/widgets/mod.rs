//! Widget components for the e-paper dashboard.
//!
//! - [`clock`]: local time and date
//! - [`news`]: BBC RSS headlines
//! - [`social`]: latest post of one social-feed account, with avatar and stats
//! - [`primitives`]: shared icons, placeholder, wrapping and number formatting
//!
//! # Architecture
//!
//! The composer only knows the object-safe [`Widget`] trait. Every concrete
//! widget is a [`Slot`] wrapped around a [`Provider`]:
//!
//! - the provider fetches and parses content into its `Data` type and renders
//!   `Data` into a bounds-local target
//! - the slot owns the bounds, the last good `Data` and the error slot, and
//!   enforces the failure contract shared by all widgets
//!
//! # Failure Contract
//!
//! `update_data` never fails past the slot: a failed fetch sets the error
//! slot and leaves the previous content alone. While the error slot is set
//! `draw` paints the error placeholder and nothing else. The next successful
//! fetch clears the slot.

pub mod avatar;
pub mod clock;
mod error;
pub mod news;
pub mod primitives;
mod slot;
pub mod social;

use std::sync::Arc;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::DrawTarget;
pub use error::{ErrorKind, WidgetError};
pub use slot::Slot;

use crate::canvas::Canvas;
use crate::config::{Bounds, Settings, WIDGET_BOUNDS, slot as layout_slot};
use crate::fetch::Fetch;

/// Lifecycle of a widget's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    /// No fetch has succeeded yet and none has failed.
    Uninitialized,
    /// Content is current; the error slot is empty.
    Healthy,
    /// The last fetch or draw failed; the placeholder is shown.
    Error,
}

/// One self-updating, self-drawing region of the dashboard.
pub trait Widget {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Screen region assigned at construction.
    fn bounds(&self) -> Bounds;

    fn error(&self) -> Option<&WidgetError>;

    fn state(&self) -> WidgetState;

    /// Fetch fresh content. Failures end up in the error slot.
    fn update_data(&mut self);

    /// Render into this widget's bounds on `canvas`.
    fn draw(
        &mut self,
        canvas: &mut Canvas,
    );
}

/// Content source behind a [`Slot`].
pub trait Provider {
    /// Parsed content, replaced only by a complete successful fetch.
    type Data;

    /// Widget name for logs.
    const NAME: &'static str;

    fn fetch(&mut self) -> Result<Self::Data, WidgetError>;

    /// One-line description logged after a successful fetch.
    fn summarize(
        &self,
        data: &Self::Data,
    ) -> String;

    /// Draw `data` with the target's origin at the widget's top-left corner.
    fn render<D>(
        &self,
        data: &Self::Data,
        target: &mut D,
    ) -> Result<(), WidgetError>
    where
        D: DrawTarget<Color = BinaryColor>;
}

/// Build the dashboard's widget set in draw order.
///
/// The social feed is only included when a screen name is configured.
pub fn standard_widgets(
    settings: &Settings,
    fetch: &Arc<dyn Fetch>,
) -> Vec<Box<dyn Widget>> {
    let mut widgets: Vec<Box<dyn Widget>> = vec![
        Box::new(Slot::new(clock::ClockProvider::local(), WIDGET_BOUNDS[layout_slot::CLOCK])),
        Box::new(Slot::new(
            news::NewsProvider::new(Arc::clone(fetch), &settings.news.category),
            WIDGET_BOUNDS[layout_slot::NEWS],
        )),
    ];

    if settings.social.is_enabled() {
        widgets.push(Box::new(Slot::new(
            social::SocialFeedProvider::new(Arc::clone(fetch), &settings.social),
            WIDGET_BOUNDS[layout_slot::SOCIAL],
        )));
    } else {
        tracing::info!("No social screen name configured, social widget disabled");
    }

    widgets
}
