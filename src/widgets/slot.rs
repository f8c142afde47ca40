//! Generic widget holding one provider's content and error slot.

use tracing::{info, warn};

use super::primitives::draw_error_placeholder;
use super::{Provider, Widget, WidgetError, WidgetState};
use crate::canvas::Canvas;
use crate::config::Bounds;

pub struct Slot<P: Provider> {
    provider: P,
    bounds: Bounds,
    data: Option<P::Data>,
    error: Option<WidgetError>,
}

impl<P: Provider> Slot<P> {
    pub const fn new(
        provider: P,
        bounds: Bounds,
    ) -> Self {
        Self {
            provider,
            bounds,
            data: None,
            error: None,
        }
    }

    /// Last successfully fetched content.
    pub const fn data(&self) -> Option<&P::Data> { self.data.as_ref() }

    pub const fn provider(&self) -> &P { &self.provider }
}

impl<P: Provider> Widget for Slot<P> {
    fn name(&self) -> &'static str { P::NAME }

    fn bounds(&self) -> Bounds { self.bounds }

    fn error(&self) -> Option<&WidgetError> { self.error.as_ref() }

    fn state(&self) -> WidgetState {
        match (&self.error, &self.data) {
            (Some(_), _) => WidgetState::Error,
            (None, Some(_)) => WidgetState::Healthy,
            (None, None) => WidgetState::Uninitialized,
        }
    }

    fn update_data(&mut self) {
        match self.provider.fetch() {
            Ok(data) => {
                info!("{}: {}", P::NAME, self.provider.summarize(&data));
                self.data = Some(data);
                self.error = None;
            }
            Err(error) => {
                warn!(widget = P::NAME, %error, "Update failed, keeping previous content");
                self.error = Some(error);
            }
        }
    }

    fn draw(
        &mut self,
        canvas: &mut Canvas,
    ) {
        let mut region = canvas.region(self.bounds);

        if let Some(error) = &self.error {
            region.wipe();
            draw_error_placeholder(&mut region, error.kind());
            return;
        }

        let Some(data) = &self.data else {
            return;
        };

        if let Err(error) = self.provider.render(data, &mut region) {
            warn!(widget = P::NAME, %error, "Draw failed");
            region.wipe();
            draw_error_placeholder(&mut region, error.kind());
            self.error = Some(error);
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
